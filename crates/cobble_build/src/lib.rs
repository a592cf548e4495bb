//! Dependency discovery and staleness propagation for incremental builds.
//!
//! Starting from one entry source file, the [`Traversal`] walks the include
//! graph: headers are expanded into the source units they imply by the
//! [`ModuleExpander`], source units have their direct dependencies resolved
//! through the dependency-record cache, and every source unit whose object is
//! missing or older than one of its dependencies is recompiled. The
//! [`BuildPlanner`] runs one traversal per [`Session`] and relinks the final
//! binary when anything observed is at least as new as it.

#![warn(missing_docs)]

pub mod error;
pub mod expander;
pub mod planner;
pub mod session;
pub mod traversal;

pub use error::BuildError;
pub use expander::ModuleExpander;
pub use planner::{BuildPlanner, BuildReport};
pub use session::Session;
pub use traversal::Traversal;
