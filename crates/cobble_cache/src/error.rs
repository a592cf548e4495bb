//! Error types for dependency-record operations.

use std::path::PathBuf;

use cobble_toolchain::ToolError;

/// Errors that can occur while resolving a unit's dependencies.
///
/// Unlike a content cache, a dependency record cannot silently fall back to
/// a miss: without it the build cannot know what to compile. Every variant
/// aborts the build.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing a record.
    #[error("dependency record I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The compiler failed to extract dependencies.
    #[error(transparent)]
    Extract(#[from] ToolError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use cobble_toolchain::ToolAction;

    #[test]
    fn io_error_display() {
        let err = CacheError::Io {
            path: PathBuf::from("obj/main.dep"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("dependency record I/O error"));
        assert!(msg.contains("main.dep"));
    }

    #[test]
    fn extract_error_is_transparent() {
        let err: CacheError = ToolError::Failed {
            action: ToolAction::ExtractDeps,
            command: "g++ -MM src/a.cpp".to_string(),
            exit_code: Some(1),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "dependency extraction failed (exit code 1): g++ -MM src/a.cpp"
        );
    }
}
