//! Conformance test helpers for the cobble build driver.
//!
//! Provides an on-disk [`Project`] fixture and a scripted [`FakeToolchain`]
//! that behaves like `g++ -MM` / `-c` / link without a real compiler. Every
//! file the fixture or the fake toolchain writes is stamped from one shared
//! logical clock, so timestamp comparisons in tests are exact and never
//! depend on filesystem timestamp granularity.
//!
//! The clock runs well in the past. Dependency records written by the
//! resolver carry real wall-clock times and are therefore always newer than
//! fixture files; [`Project::write`] and [`Project::touch`] age a source's
//! record to model an edit made after the last extraction.

#![warn(missing_docs)]

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use cobble_common::{MTime, UnitPath};
use cobble_config::{Layout, PathsConfig, UnitsConfig};
use cobble_toolchain::{ToolAction, ToolError, Toolchain};
use tempfile::TempDir;

/// First logical timestamp handed out, in seconds after the epoch.
const CLOCK_START: u64 = 1_000_000_000;

/// Timestamp given to aged dependency records. Older than any clock tick.
const AGED_RECORD: u64 = 1;

/// Monotonic logical clock shared by a fixture and its toolchains.
#[derive(Debug, Clone)]
pub struct LogicalClock(Rc<Cell<u64>>);

impl LogicalClock {
    fn new() -> Self {
        Self(Rc::new(Cell::new(CLOCK_START)))
    }

    /// Advances the clock by one second and returns the new time.
    pub fn tick(&self) -> MTime {
        let next = self.0.get() + 1;
        self.0.set(next);
        MTime::from_secs(next)
    }
}

/// A temporary project directory with the default `src/`, `obj/`, `bin/` layout.
pub struct Project {
    dir: TempDir,
    clock: LogicalClock,
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl Project {
    /// Creates an empty project in a fresh temporary directory.
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
            clock: LogicalClock::new(),
        }
    }

    /// Returns the project root.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Returns the default layout rooted at this project.
    pub fn layout(&self) -> Layout {
        Layout::new(self.root(), &PathsConfig::default())
    }

    /// Returns a fake toolchain sharing this project's clock.
    pub fn toolchain(&self) -> FakeToolchain {
        FakeToolchain::new(self.root(), self.clock.clone())
    }

    /// Writes (or rewrites) a file and stamps it with the next clock tick.
    pub fn write(&self, rel: &str, content: &str) {
        let path = self.root().join(rel);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).expect("failed to create directory");
        }
        std::fs::write(&path, content).expect("failed to write file");
        self.stamp(rel);
    }

    /// Bumps a file's timestamp without changing its content, creating it if needed.
    pub fn touch(&self, rel: &str) {
        if !self.exists(rel) {
            self.write(rel, "");
        } else {
            self.stamp(rel);
        }
    }

    /// Sets a file's modification time explicitly.
    pub fn set_mtime(&self, rel: impl AsRef<Path>, time: MTime) {
        set_mtime(&self.root().join(rel), time);
    }

    /// Returns a file's modification time, or [`MTime::ZERO`].
    pub fn mtime(&self, rel: impl AsRef<Path>) -> MTime {
        MTime::of(self.root().join(rel))
    }

    /// Returns `true` if the file exists.
    pub fn exists(&self, rel: impl AsRef<Path>) -> bool {
        self.root().join(rel).exists()
    }

    /// Reads a file to a string.
    pub fn read(&self, rel: impl AsRef<Path>) -> String {
        std::fs::read_to_string(self.root().join(rel)).expect("failed to read file")
    }

    /// Deletes a file.
    pub fn remove(&self, rel: impl AsRef<Path>) {
        std::fs::remove_file(self.root().join(rel)).expect("failed to remove file");
    }

    fn stamp(&self, rel: &str) {
        let time = self.clock.tick();
        self.set_mtime(rel, time);

        let unit = UnitPath::new(rel);
        if UnitsConfig::default().is_source(&unit) {
            let record = self.layout().record_path(&unit);
            if self.exists(&record) {
                self.set_mtime(&record, MTime::from_secs(AGED_RECORD));
            }
        }
    }
}

/// One call made against a [`FakeToolchain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// `extract_deps(source)`
    Extract(UnitPath),
    /// `compile(source, object)`
    Compile(UnitPath, UnitPath),
    /// `link(objects, output)`
    Link(Vec<UnitPath>, UnitPath),
}

/// A toolchain that emulates a GCC-style compiler on a [`Project`].
///
/// Dependency extraction scans `#include "..."` lines transitively, looking
/// next to the including file and then in `src/`, like `g++ -MM -Isrc`.
/// Compiling and linking write small placeholder files stamped from the
/// logical clock. Every call is logged.
pub struct FakeToolchain {
    root: PathBuf,
    include: Vec<UnitPath>,
    clock: LogicalClock,
    log: RefCell<Vec<Invocation>>,
    failing: RefCell<HashSet<(ToolAction, UnitPath)>>,
    side_effects: RefCell<Vec<(UnitPath, UnitPath)>>,
}

impl FakeToolchain {
    /// Creates a fake toolchain for the project at `root`.
    pub fn new(root: &Path, clock: LogicalClock) -> Self {
        Self {
            root: root.to_path_buf(),
            include: vec![UnitPath::new("src")],
            clock,
            log: RefCell::new(Vec::new()),
            failing: RefCell::new(HashSet::new()),
            side_effects: RefCell::new(Vec::new()),
        }
    }

    /// Makes compiling `source` fail.
    pub fn fail_compile(&self, source: &str) {
        self.failing
            .borrow_mut()
            .insert((ToolAction::Compile, UnitPath::new(source)));
    }

    /// Makes dependency extraction for `source` fail.
    pub fn fail_extract(&self, source: &str) {
        self.failing
            .borrow_mut()
            .insert((ToolAction::ExtractDeps, UnitPath::new(source)));
    }

    /// Makes linking the binary at `output` fail.
    pub fn fail_link(&self, output: &str) {
        self.failing
            .borrow_mut()
            .insert((ToolAction::Link, UnitPath::new(output)));
    }

    /// Makes compiling `source` also restamp `file`, like a code generator
    /// that rewrites a header as part of a build step.
    pub fn touch_on_compile(&self, source: &str, file: &str) {
        self.side_effects
            .borrow_mut()
            .push((UnitPath::new(source), UnitPath::new(file)));
    }

    /// Returns every logged invocation.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.log.borrow().clone()
    }

    /// Returns the sources compiled, in order.
    pub fn compiled(&self) -> Vec<UnitPath> {
        self.log
            .borrow()
            .iter()
            .filter_map(|inv| match inv {
                Invocation::Compile(src, _) => Some(src.clone()),
                _ => None,
            })
            .collect()
    }

    /// Returns the sources whose dependencies were extracted, in order.
    pub fn extracted(&self) -> Vec<UnitPath> {
        self.log
            .borrow()
            .iter()
            .filter_map(|inv| match inv {
                Invocation::Extract(src) => Some(src.clone()),
                _ => None,
            })
            .collect()
    }

    /// Returns every link call as `(objects, output)`.
    pub fn links(&self) -> Vec<(Vec<UnitPath>, UnitPath)> {
        self.log
            .borrow()
            .iter()
            .filter_map(|inv| match inv {
                Invocation::Link(objs, out) => Some((objs.clone(), out.clone())),
                _ => None,
            })
            .collect()
    }

    /// Forgets all logged invocations.
    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }

    fn failure(&self, action: ToolAction, unit: &UnitPath) -> Result<(), ToolError> {
        if self.failing.borrow().contains(&(action, unit.clone())) {
            return Err(ToolError::Failed {
                action,
                command: format!("fake-cc {unit}"),
                exit_code: Some(1),
            });
        }
        Ok(())
    }

    /// Resolves a quoted include the way `-I` lookup does.
    fn find_include(&self, from: &UnitPath, name: &str) -> Option<UnitPath> {
        std::iter::once(from.parent())
            .chain(self.include.iter().cloned())
            .map(|dir| dir.join(name))
            .find(|candidate| self.root.join(candidate).is_file())
    }

    /// Lists `source` and every header it transitively includes, in
    /// first-inclusion order.
    fn scan(&self, source: &UnitPath) -> Result<Vec<UnitPath>, ToolError> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![source.clone()];
        while let Some(file) = stack.pop() {
            if !seen.insert(file.clone()) {
                continue;
            }
            let text = std::fs::read_to_string(self.root.join(&file)).map_err(|e| {
                ToolError::Io {
                    action: ToolAction::ExtractDeps,
                    source: e,
                }
            })?;
            order.push(file.clone());
            let mut includes = Vec::new();
            for name in quoted_includes(&text) {
                let found = self.find_include(&file, name).ok_or_else(|| ToolError::Failed {
                    action: ToolAction::ExtractDeps,
                    command: format!("fake-cc -MM {source}: {name}: No such file or directory"),
                    exit_code: Some(1),
                })?;
                includes.push(found);
            }
            stack.extend(includes.into_iter().rev());
        }
        Ok(order)
    }

    fn emit(&self, action: ToolAction, output: &UnitPath, content: &str) -> Result<MTime, ToolError> {
        let path = self.root.join(output);
        let io = |e| ToolError::Io { action, source: e };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(io)?;
        }
        std::fs::write(&path, content).map_err(io)?;
        let time = self.clock.tick();
        set_mtime(&path, time);
        Ok(time)
    }
}

impl Toolchain for FakeToolchain {
    fn extract_deps(&self, source: &UnitPath) -> Result<String, ToolError> {
        self.log.borrow_mut().push(Invocation::Extract(source.clone()));
        self.failure(ToolAction::ExtractDeps, source)?;
        let files = self.scan(source)?;

        // Three paths per line, continued with a backslash, like gcc.
        let mut text = format!("{source}:");
        for (i, file) in files.iter().enumerate() {
            if i > 0 && i % 3 == 0 {
                text.push_str(" \\\n ");
            }
            text.push(' ');
            text.push_str(&file.to_string());
        }
        text.push('\n');
        Ok(text)
    }

    fn compile(&self, source: &UnitPath, object: &UnitPath) -> Result<MTime, ToolError> {
        self.log
            .borrow_mut()
            .push(Invocation::Compile(source.clone(), object.clone()));
        self.failure(ToolAction::Compile, source)?;
        let done = self.emit(ToolAction::Compile, object, &format!("object for {source}\n"))?;
        for (_, file) in self.side_effects.borrow().iter().filter(|(s, _)| s == source) {
            set_mtime(&self.root.join(file), self.clock.tick());
        }
        Ok(done)
    }

    fn link(&self, objects: &[UnitPath], output: &UnitPath) -> Result<(), ToolError> {
        self.log
            .borrow_mut()
            .push(Invocation::Link(objects.to_vec(), output.clone()));
        self.failure(ToolAction::Link, output)?;
        let listing: Vec<String> = objects.iter().map(ToString::to_string).collect();
        self.emit(ToolAction::Link, output, &listing.join("\n"))?;
        Ok(())
    }
}

/// Extracts the names from `#include "name"` lines.
fn quoted_includes(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter_map(|line| {
        let rest = line.trim_start().strip_prefix('#')?.trim_start();
        let rest = rest.strip_prefix("include")?.trim_start();
        let rest = rest.strip_prefix('"')?;
        rest.split_once('"').map(|(name, _)| name)
    })
}

/// Sets the modification time of an existing file.
pub fn set_mtime(path: &Path, time: MTime) {
    let file = std::fs::File::options()
        .write(true)
        .open(path)
        .expect("failed to open file for stamping");
    file.set_modified(time.to_system())
        .expect("failed to set modification time");
}
