//! Mapping from units to their persisted build state on disk.
//!
//! Dependency records and object files live in directory trees mirroring
//! the source tree: a source path has the source root stripped, its
//! extension stripped, and a fixed suffix appended, under the respective
//! output directory. The final binary sits in the binary directory, named
//! after the entry unit's stem.

use std::path::{Component, Path, PathBuf};

use cobble_common::{MTime, UnitPath};

use crate::types::PathsConfig;

/// Suffix of cached dependency records.
pub const RECORD_SUFFIX: &str = ".dep";

/// Suffix of compiled object files.
pub const ARTIFACT_SUFFIX: &str = ".o";

/// Resolved directory layout for one project.
///
/// Every `UnitPath` produced here is relative to the project root; use
/// [`Layout::resolve`] to get a path usable with the filesystem.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
    src: UnitPath,
    obj: UnitPath,
    deps: UnitPath,
    bin: UnitPath,
}

impl Layout {
    /// Creates a layout rooted at `root` with the configured directories.
    pub fn new(root: &Path, paths: &PathsConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            src: UnitPath::new(&paths.src),
            obj: UnitPath::new(&paths.obj),
            deps: UnitPath::new(&paths.deps),
            bin: UnitPath::new(&paths.bin),
        }
    }

    /// Resolves a root-relative unit path to a filesystem path.
    pub fn resolve(&self, unit: &UnitPath) -> PathBuf {
        self.root.join(unit)
    }

    /// Returns the current modification time of `unit`, or [`MTime::ZERO`].
    pub fn mtime(&self, unit: &UnitPath) -> MTime {
        MTime::of(self.resolve(unit))
    }

    /// Returns `true` if `unit` exists as a regular file.
    pub fn is_file(&self, unit: &UnitPath) -> bool {
        self.resolve(unit).is_file()
    }

    /// Returns `true` if `unit` exists as a directory.
    pub fn is_dir(&self, unit: &UnitPath) -> bool {
        self.resolve(unit).is_dir()
    }

    /// Path of the dependency record for `source`.
    pub fn record_path(&self, source: &UnitPath) -> UnitPath {
        self.deps.join(self.mirrored(source)).with_suffix(RECORD_SUFFIX)
    }

    /// Path of the object file for `source`.
    pub fn artifact_path(&self, source: &UnitPath) -> UnitPath {
        self.obj.join(self.mirrored(source)).with_suffix(ARTIFACT_SUFFIX)
    }

    /// Path of the final binary for the `entry` unit.
    pub fn target_path(&self, entry: &UnitPath) -> UnitPath {
        self.bin.join(entry.file_stem().unwrap_or("a.out"))
    }

    /// Source path with the source root and extension stripped.
    ///
    /// Units outside the source root keep only their normal components, so
    /// an absolute or `..`-relative unit still lands inside the output tree.
    fn mirrored(&self, source: &UnitPath) -> PathBuf {
        source
            .strip_root(&self.src)
            .strip_extension()
            .as_path()
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect()
    }
}
