//! Error types for external tool invocations.

use std::fmt;

/// Which external action was being performed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToolAction {
    /// Dependency-rule extraction (`-MM`).
    ExtractDeps,
    /// Compiling one source unit to an object file.
    Compile,
    /// Linking the final binary.
    Link,
}

impl fmt::Display for ToolAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ToolAction::ExtractDeps => "dependency extraction",
            ToolAction::Compile => "compilation",
            ToolAction::Link => "linking",
        })
    }
}

/// Errors from running an external tool. All of them are fatal to the build.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The tool executable could not be found.
    #[error("{action} failed: '{program}' not found")]
    NotFound {
        /// The action being attempted.
        action: ToolAction,
        /// The executable name.
        program: String,
    },

    /// The tool ran and exited unsuccessfully.
    #[error("{action} failed{}: {command}", exit_code_suffix(.exit_code))]
    Failed {
        /// The action being attempted.
        action: ToolAction,
        /// The rendered command line.
        command: String,
        /// The exit code, or `None` if killed by a signal.
        exit_code: Option<i32>,
    },

    /// Spawning the tool or handling its output failed.
    #[error("{action} failed: {source}")]
    Io {
        /// The action being attempted.
        action: ToolAction,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

fn exit_code_suffix(code: &Option<i32>) -> String {
    code.map(|c| format!(" (exit code {c})")).unwrap_or_default()
}
