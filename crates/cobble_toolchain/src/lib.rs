//! External compiler collaborators for the cobble build driver.
//!
//! The build engine never spawns processes itself. It talks to a
//! [`Toolchain`], which extracts dependency rules, compiles one source unit,
//! and links the final binary. [`GccToolchain`] drives a GCC-compatible
//! compiler (`g++`, `clang++`); tests substitute a scripted implementation.

#![warn(missing_docs)]

pub mod error;
pub mod gcc;

pub use error::{ToolAction, ToolError};
pub use gcc::GccToolchain;

use cobble_common::{MTime, UnitPath};

/// The three external actions the build engine needs.
///
/// All paths are relative to the project root. Every action either
/// succeeds completely or fails; there is no partial result.
pub trait Toolchain {
    /// Returns the raw Makefile-style dependency rule text for `source`
    /// (`target: dep1 dep2 \` continuation-line format).
    fn extract_deps(&self, source: &UnitPath) -> Result<String, ToolError>;

    /// Compiles `source` into `object`, returning the completion timestamp.
    ///
    /// The caller creates the object's directory beforehand.
    fn compile(&self, source: &UnitPath, object: &UnitPath) -> Result<MTime, ToolError>;

    /// Links `objects`, in order, into the binary at `output`.
    fn link(&self, objects: &[UnitPath], output: &UnitPath) -> Result<(), ToolError>;
}

impl<T: Toolchain + ?Sized> Toolchain for &T {
    fn extract_deps(&self, source: &UnitPath) -> Result<String, ToolError> {
        (**self).extract_deps(source)
    }

    fn compile(&self, source: &UnitPath, object: &UnitPath) -> Result<MTime, ToolError> {
        (**self).compile(source, object)
    }

    fn link(&self, objects: &[UnitPath], output: &UnitPath) -> Result<(), ToolError> {
        (**self).link(objects, output)
    }
}
