//! Error types for a build session.

use std::path::PathBuf;

use cobble_cache::CacheError;
use cobble_common::UnitPath;
use cobble_toolchain::ToolError;

/// Errors that abort a build session.
///
/// Unknown unit kinds are not errors; they are skipped with a warning.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The entry unit does not exist.
    #[error("entry '{0}' does not exist")]
    EntryNotFound(UnitPath),

    /// The entry unit is not a source file.
    #[error("entry '{0}' is not a source file")]
    EntryNotSource(UnitPath),

    /// Two distinct source units map onto the same object and record.
    #[error("'{second}' and '{first}' would both build '{artifact}'")]
    ArtifactCollision {
        /// The shared object path.
        artifact: UnitPath,
        /// The unit that claimed the object first.
        first: UnitPath,
        /// The unit that collided with it.
        second: UnitPath,
    },

    /// Resolving a unit's dependencies failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Compiling or linking failed.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Creating an output directory failed.
    #[error("failed to create {path}: {source}")]
    Io {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Creates `dir` and its parents.
pub(crate) fn create_dir_all(dir: &std::path::Path) -> Result<(), BuildError> {
    std::fs::create_dir_all(dir).map_err(|e| BuildError::Io {
        path: dir.to_path_buf(),
        source: e,
    })
}
