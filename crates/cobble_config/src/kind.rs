//! Classification of units by file extension.

use cobble_common::UnitPath;

use crate::types::UnitsConfig;

/// The kind of a unit, decided purely by its extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitKind {
    /// A header, expanded into the source units it implies.
    Header,
    /// A source file, compiled into one object.
    Source,
    /// Anything else. Skipped with a diagnostic during traversal.
    Unknown,
}

impl UnitKind {
    /// Classifies `path` using the configured extension lists.
    ///
    /// Matching is case-sensitive, so `Foo.C` is not a `c` source.
    pub fn classify(path: &UnitPath, units: &UnitsConfig) -> UnitKind {
        let Some(ext) = path.extension() else {
            return UnitKind::Unknown;
        };
        if units.headers.iter().any(|h| h == ext) {
            UnitKind::Header
        } else if units.sources.iter().any(|s| s == ext) {
            UnitKind::Source
        } else {
            UnitKind::Unknown
        }
    }
}

impl UnitsConfig {
    /// Returns `true` if `path` has a source extension.
    pub fn is_source(&self, path: &UnitPath) -> bool {
        UnitKind::classify(path, self) == UnitKind::Source
    }
}
