//! Parsing and validation of `cobble.toml` project configuration files.
//!
//! This crate reads the optional project configuration file and produces a
//! strongly-typed [`ProjectConfig`], classifies units by extension, and maps
//! units onto the persisted on-disk [`Layout`] (dependency records, object
//! files, and the final binary).

#![warn(missing_docs)]

pub mod error;
pub mod kind;
pub mod layout;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use kind::UnitKind;
pub use layout::Layout;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use types::*;
