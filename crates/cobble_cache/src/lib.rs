//! Timestamp-validated cache of per-unit dependency records.
//!
//! Each source unit's direct dependencies are extracted once by the
//! compiler and persisted as a Makefile-style rule in a record file that
//! mirrors the source tree. The record is reused until the source becomes
//! at least as new as the record, at which point it is regenerated.

#![warn(missing_docs)]

pub mod error;
pub mod record;
pub mod resolver;

pub use error::CacheError;
pub use record::parse_rules;
pub use resolver::{DependencyResolver, Resolved};
