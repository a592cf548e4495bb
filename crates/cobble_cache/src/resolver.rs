//! Dependency resolution backed by persisted dependency records.

use cobble_common::UnitPath;
use cobble_config::Layout;
use cobble_toolchain::Toolchain;

use crate::error::CacheError;
use crate::record::parse_rules;

/// The outcome of resolving one source unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Direct dependencies in rule order. Includes the source itself and
    /// may contain repetitions.
    pub deps: Vec<UnitPath>,
    /// Whether the record was (re)extracted during this call.
    pub regenerated: bool,
}

/// Produces the direct dependency list of a source unit.
///
/// Records live at [`Layout::record_path`]. A record is regenerated when it
/// is missing or when the source's modification time is not older than the
/// record's; otherwise the stored text is reused as-is.
pub struct DependencyResolver<'a> {
    layout: &'a Layout,
    toolchain: &'a dyn Toolchain,
}

impl<'a> DependencyResolver<'a> {
    /// Creates a resolver over `layout`, extracting through `toolchain`.
    pub fn new(layout: &'a Layout, toolchain: &'a dyn Toolchain) -> Self {
        Self { layout, toolchain }
    }

    /// Returns `true` if the record for `source` must be regenerated.
    pub fn is_stale(&self, source: &UnitPath) -> bool {
        let record = self.layout.record_path(source);
        !self.layout.is_file(&record) || self.layout.mtime(source) >= self.layout.mtime(&record)
    }

    /// Resolves the direct dependencies of `source`.
    ///
    /// Any extraction or record I/O failure is returned as an error; there
    /// is no fallback.
    pub fn resolve(&self, source: &UnitPath) -> Result<Resolved, CacheError> {
        let record = self.layout.record_path(source);
        let record_file = self.layout.resolve(&record);

        let regenerated = self.is_stale(source);
        if regenerated {
            tracing::debug!("dependency record for {source} is stale, extracting");
            let text = self.toolchain.extract_deps(source)?;
            if let Some(dir) = record_file.parent() {
                std::fs::create_dir_all(dir).map_err(|e| CacheError::Io {
                    path: dir.to_path_buf(),
                    source: e,
                })?;
            }
            std::fs::write(&record_file, text).map_err(|e| CacheError::Io {
                path: record_file.clone(),
                source: e,
            })?;
        } else {
            tracing::debug!("dependency record for {source} is fresh");
        }

        let text = std::fs::read_to_string(&record_file).map_err(|e| CacheError::Io {
            path: record_file.clone(),
            source: e,
        })?;
        Ok(Resolved {
            deps: parse_rules(&text),
            regenerated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::Path;

    use cobble_common::MTime;
    use cobble_config::PathsConfig;
    use cobble_toolchain::{ToolAction, ToolError};

    /// Returns canned rule text and counts extractions.
    struct CannedRules {
        text: String,
        fail: bool,
        calls: RefCell<Vec<UnitPath>>,
    }

    impl CannedRules {
        fn new(text: &str) -> Self {
            Self {
                text: text.to_string(),
                fail: false,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Toolchain for CannedRules {
        fn extract_deps(&self, source: &UnitPath) -> Result<String, ToolError> {
            self.calls.borrow_mut().push(source.clone());
            if self.fail {
                return Err(ToolError::Failed {
                    action: ToolAction::ExtractDeps,
                    command: format!("cc -MM {source}"),
                    exit_code: Some(1),
                });
            }
            Ok(self.text.clone())
        }

        fn compile(&self, _: &UnitPath, _: &UnitPath) -> Result<MTime, ToolError> {
            unreachable!("resolver never compiles")
        }

        fn link(&self, _: &[UnitPath], _: &UnitPath) -> Result<(), ToolError> {
            unreachable!("resolver never links")
        }
    }

    fn touch(root: &Path, rel: &str, secs: u64) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        if !path.exists() {
            std::fs::write(&path, "").unwrap();
        }
        let file = std::fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(MTime::from_secs(secs).to_system()).unwrap();
    }

    const RULE: &str = "src/main.cpp: src/main.cpp src/foo.h \\\n src/foo.h\n";

    #[test]
    fn missing_record_is_extracted_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "src/main.cpp", 1_000);
        let layout = Layout::new(dir.path(), &PathsConfig::default());
        let tc = CannedRules::new(RULE);
        let resolver = DependencyResolver::new(&layout, &tc);

        let src = UnitPath::new("src/main.cpp");
        let resolved = resolver.resolve(&src).unwrap();
        assert!(resolved.regenerated);
        assert_eq!(
            resolved.deps,
            vec![
                UnitPath::new("src/main.cpp"),
                UnitPath::new("src/foo.h"),
                UnitPath::new("src/foo.h"),
            ]
        );
        let stored = std::fs::read_to_string(dir.path().join("obj/main.dep")).unwrap();
        assert_eq!(stored, RULE);
        assert_eq!(tc.calls.borrow().len(), 1);
    }

    #[test]
    fn record_newer_than_source_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "src/main.cpp", 1_000);
        std::fs::create_dir_all(dir.path().join("obj")).unwrap();
        std::fs::write(dir.path().join("obj/main.dep"), "src/main.cpp: src/main.cpp src/old.h\n")
            .unwrap();
        touch(dir.path(), "obj/main.dep", 2_000);

        let layout = Layout::new(dir.path(), &PathsConfig::default());
        let tc = CannedRules::new(RULE);
        let resolver = DependencyResolver::new(&layout, &tc);

        let resolved = resolver.resolve(&"src/main.cpp".into()).unwrap();
        assert!(!resolved.regenerated);
        assert_eq!(resolved.deps[1], UnitPath::new("src/old.h"));
        assert!(tc.calls.borrow().is_empty());
        assert_eq!(MTime::of(dir.path().join("obj/main.dep")), MTime::from_secs(2_000));
    }

    #[test]
    fn record_with_equal_timestamp_is_regenerated() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "src/main.cpp", 2_000);
        touch(dir.path(), "obj/main.dep", 2_000);

        let layout = Layout::new(dir.path(), &PathsConfig::default());
        let tc = CannedRules::new(RULE);
        let resolver = DependencyResolver::new(&layout, &tc);

        assert!(resolver.is_stale(&"src/main.cpp".into()));
        let resolved = resolver.resolve(&"src/main.cpp".into()).unwrap();
        assert!(resolved.regenerated);
        assert_eq!(resolved.deps.len(), 3);
    }

    #[test]
    fn source_newer_than_record_is_regenerated() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "obj/main.dep", 1_000);
        touch(dir.path(), "src/main.cpp", 3_000);

        let layout = Layout::new(dir.path(), &PathsConfig::default());
        let tc = CannedRules::new(RULE);
        let resolver = DependencyResolver::new(&layout, &tc);

        assert!(resolver.resolve(&"src/main.cpp".into()).unwrap().regenerated);
        assert_eq!(tc.calls.borrow().len(), 1);
    }

    #[test]
    fn nested_record_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "src/net/tcp/socket.cpp", 1_000);
        let layout = Layout::new(dir.path(), &PathsConfig::default());
        let tc = CannedRules::new("x: src/net/tcp/socket.cpp\n");
        let resolver = DependencyResolver::new(&layout, &tc);

        resolver.resolve(&"src/net/tcp/socket.cpp".into()).unwrap();
        assert!(dir.path().join("obj/net/tcp/socket.dep").is_file());
    }

    #[test]
    fn extraction_failure_propagates_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "src/main.cpp", 1_000);
        let layout = Layout::new(dir.path(), &PathsConfig::default());
        let mut tc = CannedRules::new(RULE);
        tc.fail = true;
        let resolver = DependencyResolver::new(&layout, &tc);

        let err = resolver.resolve(&"src/main.cpp".into()).unwrap_err();
        assert!(matches!(err, CacheError::Extract(ToolError::Failed { .. })));
        assert!(!dir.path().join("obj/main.dep").exists());
    }
}
