//! Configuration types deserialized from `cobble.toml`.
//!
//! Every section is optional. Missing sections and fields take the defaults
//! below, so a project without any `cobble.toml` builds with a plain `g++`
//! and the `src/`, `obj/`, `bin/` layout.

use serde::Deserialize;

/// The top-level project configuration parsed from `cobble.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Informational project metadata.
    pub project: ProjectMeta,
    /// Directory layout for sources and build outputs.
    pub paths: PathsConfig,
    /// Compiler invocation settings.
    pub toolchain: ToolchainConfig,
    /// Unit classification and module conventions.
    pub units: UnitsConfig,
}

/// Project metadata.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProjectMeta {
    /// The project name, used only in status output.
    pub name: Option<String>,
}

/// Directory layout, relative to the project root.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Source root. Stripped from unit paths when mapping them into `obj`/`deps`.
    pub src: String,
    /// Directory for compiled object files.
    pub obj: String,
    /// Directory for cached dependency records.
    pub deps: String,
    /// Directory for the final linked binary.
    pub bin: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            src: "src".to_string(),
            obj: "obj".to_string(),
            deps: "obj".to_string(),
            bin: "bin".to_string(),
        }
    }
}

/// Settings for the external compiler driver.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Compiler driver executable (used for extraction, compile, and link).
    pub compiler: String,
    /// Flags passed to every compiler invocation.
    pub flags: Vec<String>,
    /// Include directories, passed as `-I<dir>`.
    pub include: Vec<String>,
    /// Flags appended after the object files when linking.
    pub link_flags: Vec<String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            compiler: "g++".to_string(),
            flags: [
                "-std=c++14",
                "-pthread",
                "-g",
                "-Wall",
                "-Wextra",
                "-Wno-sign-compare",
                "-Wno-deprecated",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            include: vec!["src".to_string()],
            link_flags: Vec::new(),
        }
    }
}

/// Extension lists and the package marker used to classify and expand units.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UnitsConfig {
    /// Extensions (without the dot) of header units.
    pub headers: Vec<String>,
    /// Extensions (without the dot) of source units, in companion lookup order.
    pub sources: Vec<String>,
    /// File name of the header that pulls in every source in its directory.
    pub package_marker: String,
}

impl Default for UnitsConfig {
    fn default() -> Self {
        Self {
            headers: vec!["h".to_string(), "hh".to_string(), "hpp".to_string()],
            sources: vec!["cpp".to_string(), "cc".to_string(), "cxx".to_string()],
            package_marker: "PKG.h".to_string(),
        }
    }
}
