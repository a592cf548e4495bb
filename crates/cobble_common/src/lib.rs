//! Shared foundational types used across the cobble build driver.
//!
//! This crate provides the two value types every other crate speaks in:
//! [`UnitPath`], a cleaned project-relative path naming a header or source
//! unit, and [`MTime`], a filesystem modification timestamp with an
//! epoch-zero sentinel for files that do not exist.

#![warn(missing_docs)]

pub mod mtime;
pub mod unit_path;

pub use mtime::MTime;
pub use unit_path::{clean_path, UnitPath};
