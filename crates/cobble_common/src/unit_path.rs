//! Normalized paths identifying units in the dependency graph.

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A lexically cleaned path naming a header or source unit.
///
/// Two `UnitPath`s compare equal iff their cleaned forms are identical, so
/// `src/./a/../foo.h` and `src/foo.h` are the same unit. Paths are usually
/// relative to the project root; nothing here touches the filesystem.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitPath(PathBuf);

impl UnitPath {
    /// Creates a unit path, cleaning `.` and `..` components.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self(clean_path(path.as_ref()))
    }

    /// Returns the underlying path.
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Returns the extension of the final component, if it is valid UTF-8.
    pub fn extension(&self) -> Option<&str> {
        self.0.extension()?.to_str()
    }

    /// Returns the final component (e.g. `foo.h`).
    pub fn file_name(&self) -> Option<&str> {
        self.0.file_name()?.to_str()
    }

    /// Returns the final component without its extension (e.g. `foo`).
    pub fn file_stem(&self) -> Option<&str> {
        self.0.file_stem()?.to_str()
    }

    /// Returns the containing directory, or `.` for a bare file name.
    pub fn parent(&self) -> UnitPath {
        match self.0.parent() {
            Some(p) if !p.as_os_str().is_empty() => Self(p.to_path_buf()),
            _ => Self(PathBuf::from(".")),
        }
    }

    /// Removes the extension of the final component, if any.
    ///
    /// `src/foo.h` becomes `src/foo`; `src/foo` is returned unchanged.
    pub fn strip_extension(&self) -> UnitPath {
        Self(self.0.with_extension(""))
    }

    /// Replaces (or adds) the extension of the final component.
    pub fn with_extension(&self, ext: &str) -> UnitPath {
        Self(self.0.with_extension(ext))
    }

    /// Appends `suffix` verbatim to the final component.
    ///
    /// Unlike [`with_extension`](Self::with_extension) this never eats an
    /// existing dot, so `obj/foo.tar` + `.o` is `obj/foo.tar.o`.
    pub fn with_suffix(&self, suffix: &str) -> UnitPath {
        let mut s = self.0.clone().into_os_string();
        s.push(suffix);
        Self(PathBuf::from(s))
    }

    /// Removes a leading `root` prefix.
    ///
    /// Paths outside `root` are returned unchanged, so the operation is total.
    pub fn strip_root(&self, root: impl AsRef<Path>) -> UnitPath {
        let root = clean_path(root.as_ref());
        match self.0.strip_prefix(&root) {
            Ok(rest) if !rest.as_os_str().is_empty() => Self(rest.to_path_buf()),
            _ => self.clone(),
        }
    }

    /// Appends `rel` and cleans the result.
    pub fn join(&self, rel: impl AsRef<Path>) -> UnitPath {
        Self::new(self.0.join(rel))
    }
}

impl fmt::Display for UnitPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl fmt::Debug for UnitPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitPath({})", self.0.display())
    }
}

impl AsRef<Path> for UnitPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl From<&str> for UnitPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for UnitPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for UnitPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

/// Lexically cleans a path without consulting the filesystem.
///
/// `.` components are dropped and `..` cancels the preceding normal
/// component. A `..` directly under the root of an absolute path is dropped;
/// leading `..` of a relative path are kept. The empty path cleans to `.`.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(comp),
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleans_dot_and_dotdot() {
        let p = UnitPath::new("src/./net/../foo.h");
        assert_eq!(p.as_path(), Path::new("src/foo.h"));
    }

    #[test]
    fn equal_after_cleaning() {
        assert_eq!(UnitPath::new("src/a/../foo.cpp"), UnitPath::new("src/foo.cpp"));
    }

    #[test]
    fn leading_parent_dirs_kept() {
        assert_eq!(clean_path(Path::new("../../x.h")), PathBuf::from("../../x.h"));
        assert_eq!(clean_path(Path::new("a/../../x.h")), PathBuf::from("../x.h"));
    }

    #[test]
    fn parent_above_root_dropped() {
        assert_eq!(clean_path(Path::new("/../usr/x.h")), PathBuf::from("/usr/x.h"));
    }

    #[test]
    fn empty_cleans_to_dot() {
        assert_eq!(clean_path(Path::new("")), PathBuf::from("."));
        assert_eq!(clean_path(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn strip_extension() {
        assert_eq!(UnitPath::new("src/foo.h").strip_extension(), UnitPath::new("src/foo"));
        assert_eq!(UnitPath::new("src/foo").strip_extension(), UnitPath::new("src/foo"));
        assert_eq!(
            UnitPath::new("src/v1.2/foo.tar.gz").strip_extension(),
            UnitPath::new("src/v1.2/foo.tar")
        );
    }

    #[test]
    fn with_extension_replaces() {
        assert_eq!(
            UnitPath::new("src/foo.h").with_extension("cpp"),
            UnitPath::new("src/foo.cpp")
        );
    }

    #[test]
    fn with_suffix_keeps_inner_dots() {
        let p = UnitPath::new("obj/foo.tar").with_suffix(".o");
        assert_eq!(p, UnitPath::new("obj/foo.tar.o"));
    }

    #[test]
    fn strip_root_inside_and_outside() {
        let p = UnitPath::new("src/net/socket.cpp");
        assert_eq!(p.strip_root("src"), UnitPath::new("net/socket.cpp"));
        assert_eq!(p.strip_root("./src/"), UnitPath::new("net/socket.cpp"));
        // Component-wise, not textual.
        assert_eq!(p.strip_root("sr"), p);
        assert_eq!(UnitPath::new("lib/x.cpp").strip_root("src"), UnitPath::new("lib/x.cpp"));
    }

    #[test]
    fn parent_of_bare_name_is_dot() {
        assert_eq!(UnitPath::new("main.cpp").parent(), UnitPath::new("."));
        assert_eq!(UnitPath::new("src/a/b.h").parent(), UnitPath::new("src/a"));
    }

    #[test]
    fn name_accessors() {
        let p = UnitPath::new("src/util/PKG.h");
        assert_eq!(p.file_name(), Some("PKG.h"));
        assert_eq!(p.file_stem(), Some("PKG"));
        assert_eq!(p.extension(), Some("h"));
    }

    #[test]
    fn display_and_debug() {
        let p = UnitPath::new("src/foo.h");
        assert_eq!(p.to_string(), "src/foo.h");
        assert_eq!(format!("{p:?}"), "UnitPath(src/foo.h)");
    }
}
