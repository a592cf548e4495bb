//! Expansion of header units into the source units they imply.
//!
//! Three conventions apply, all of them unconditionally:
//!
//! - companion: `foo.h` implies `foo.cpp` next to it;
//! - directory: `foo.h` implies every source directly inside `foo/`;
//! - package marker: `PKG.h` implies every source in its own directory.

use cobble_common::UnitPath;
use cobble_config::{Layout, UnitsConfig};

/// Maps a header to the source units it implies. Read-only.
pub struct ModuleExpander<'a> {
    layout: &'a Layout,
    units: &'a UnitsConfig,
}

impl<'a> ModuleExpander<'a> {
    /// Creates an expander over the project at `layout`.
    pub fn new(layout: &'a Layout, units: &'a UnitsConfig) -> Self {
        Self { layout, units }
    }

    /// Returns the source units implied by `header`, without duplicates.
    ///
    /// Companion sources come first (in configured extension order), then
    /// the directory rule, then the package-marker rule; directory listings
    /// are sorted. Missing files and directories contribute nothing.
    pub fn expand(&self, header: &UnitPath) -> Vec<UnitPath> {
        let mut implied = Vec::new();
        let stem = header.strip_extension();

        for ext in &self.units.sources {
            let companion = stem.with_extension(ext);
            if self.layout.is_file(&companion) {
                implied.push(companion);
            }
        }

        if self.layout.is_dir(&stem) {
            implied.extend(self.sources_in(&stem));
        }

        if header.file_name() == Some(self.units.package_marker.as_str()) {
            implied.extend(self.sources_in(&header.parent()));
        }

        let mut seen = std::collections::HashSet::new();
        implied.retain(|unit| seen.insert(unit.clone()));
        implied
    }

    /// Lists the source files directly inside `dir`, sorted.
    fn sources_in(&self, dir: &UnitPath) -> Vec<UnitPath> {
        let Ok(entries) = std::fs::read_dir(self.layout.resolve(dir)) else {
            return Vec::new();
        };
        let mut sources: Vec<UnitPath> = entries
            .flatten()
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file() || t.is_symlink()))
            .map(|entry| dir.join(entry.file_name()))
            .filter(|unit| self.units.is_source(unit) && self.layout.is_file(unit))
            .collect();
        sources.sort();
        sources
    }
}
