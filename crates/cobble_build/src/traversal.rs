//! Depth-first walk of the dependency graph with per-unit staleness.
//!
//! The walk is iterative over an explicit frame stack so that deep include
//! chains cannot overflow the call stack. It behaves exactly like the
//! recursive formulation:
//!
//! - a unit is entered at most once per session;
//! - a source unit's object joins the link set when the unit is entered,
//!   so the link order is first-visit order;
//! - each dependency is fully explored before the consumer compares the
//!   dependency's current timestamp against its own object;
//! - a source unit is compiled after all of its dependencies, i.e. in
//!   post-order.

use std::vec;

use cobble_cache::DependencyResolver;
use cobble_common::{MTime, UnitPath};
use cobble_config::{Layout, UnitKind, UnitsConfig};
use cobble_toolchain::Toolchain;

use crate::error::{create_dir_all, BuildError};
use crate::expander::ModuleExpander;
use crate::session::Session;

/// Walks the graph from one unit, compiling stale source units.
pub struct Traversal<'a> {
    layout: &'a Layout,
    units: &'a UnitsConfig,
    expander: ModuleExpander<'a>,
    resolver: DependencyResolver<'a>,
    toolchain: &'a dyn Toolchain,
}

/// A unit whose exploration is in progress.
enum Frame {
    /// A header iterating over the sources it implies.
    Header { implied: vec::IntoIter<UnitPath> },
    /// A source unit iterating over its direct dependencies.
    Source(SourceFrame),
}

struct SourceFrame {
    unit: UnitPath,
    artifact: UnitPath,
    artifact_time: MTime,
    artifact_exists: bool,
    deps: vec::IntoIter<UnitPath>,
    /// Dependency being explored; compared once its exploration finishes.
    pending: Option<UnitPath>,
    dirty: bool,
}

/// What to do after inspecting the top frame.
enum Step {
    Enter(UnitPath, UnitKind),
    Finish,
    Continue,
}

impl<'a> Traversal<'a> {
    /// Creates a traversal over the project at `layout`.
    pub fn new(layout: &'a Layout, units: &'a UnitsConfig, toolchain: &'a dyn Toolchain) -> Self {
        Self {
            layout,
            units,
            expander: ModuleExpander::new(layout, units),
            resolver: DependencyResolver::new(layout, toolchain),
            toolchain,
        }
    }

    /// Visits `unit` and everything reachable from it, dispatching on its kind.
    ///
    /// Already-visited units are a no-op. Stops at the first failing
    /// dependency extraction or compile.
    pub fn visit(&self, session: &mut Session, unit: &UnitPath) -> Result<(), BuildError> {
        let mut stack = Vec::new();
        let kind = UnitKind::classify(unit, self.units);
        self.enter(session, unit.clone(), kind, &mut stack)?;

        while !stack.is_empty() {
            match self.step(&mut stack) {
                Step::Enter(next, kind) => self.enter(session, next, kind, &mut stack)?,
                Step::Continue => {}
                Step::Finish => {
                    if let Some(Frame::Source(frame)) = stack.pop() {
                        self.finish_source(session, frame)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Advances the top frame by one dependency.
    fn step(&self, stack: &mut [Frame]) -> Step {
        let Some(top) = stack.last_mut() else {
            return Step::Finish;
        };
        match top {
            Frame::Header { implied } => match implied.next() {
                Some(source) => Step::Enter(source, UnitKind::Source),
                None => Step::Finish,
            },
            Frame::Source(frame) => {
                if let Some(dep) = frame.pending.take() {
                    self.compare(frame, &dep);
                }
                match frame.deps.next() {
                    // The source itself is compared but never re-entered.
                    Some(dep) if dep == frame.unit => {
                        self.compare(frame, &dep);
                        Step::Continue
                    }
                    Some(dep) => {
                        frame.pending = Some(dep.clone());
                        let kind = UnitKind::classify(&dep, self.units);
                        Step::Enter(dep, kind)
                    }
                    None => Step::Finish,
                }
            }
        }
    }

    /// Starts exploring `unit` unless it was already visited.
    fn enter(
        &self,
        session: &mut Session,
        unit: UnitPath,
        kind: UnitKind,
        stack: &mut Vec<Frame>,
    ) -> Result<(), BuildError> {
        if !session.mark_visited(&unit) {
            return Ok(());
        }
        match kind {
            UnitKind::Header => {
                let implied = self.expander.expand(&unit);
                tracing::debug!("{unit} implies {} source unit(s)", implied.len());
                stack.push(Frame::Header {
                    implied: implied.into_iter(),
                });
            }
            UnitKind::Source => {
                // Claimed before resolving: the record path collides too.
                let artifact = self.layout.artifact_path(&unit);
                session
                    .claim_artifact(&unit, artifact.clone())
                    .map_err(|first| BuildError::ArtifactCollision {
                        artifact: artifact.clone(),
                        first,
                        second: unit.clone(),
                    })?;
                let resolved = self.resolver.resolve(&unit)?;
                let artifact_time = self.layout.mtime(&artifact);
                session.observe(artifact_time);
                stack.push(Frame::Source(SourceFrame {
                    artifact_exists: self.layout.is_file(&artifact),
                    unit,
                    artifact,
                    artifact_time,
                    deps: resolved.deps.into_iter(),
                    pending: None,
                    dirty: false,
                }));
            }
            UnitKind::Unknown => {
                tracing::warn!("skipping {unit}: unknown file type");
            }
        }
        Ok(())
    }

    /// Marks `frame` dirty if `dep` is currently newer than its object.
    fn compare(&self, frame: &mut SourceFrame, dep: &UnitPath) {
        if self.layout.mtime(dep) > frame.artifact_time {
            if !frame.dirty {
                tracing::debug!("{} is stale: {dep} is newer than {}", frame.unit, frame.artifact);
            }
            frame.dirty = true;
        }
    }

    /// Compiles a fully explored source unit if it is stale.
    fn finish_source(&self, session: &mut Session, frame: SourceFrame) -> Result<(), BuildError> {
        if !frame.dirty && frame.artifact_exists {
            tracing::debug!("{} is up to date", frame.unit);
            return Ok(());
        }
        if let Some(dir) = self.layout.resolve(&frame.artifact).parent() {
            create_dir_all(dir)?;
        }
        let done = self.toolchain.compile(&frame.unit, &frame.artifact)?;
        session.observe(done);
        session.record_compile(frame.unit);
        Ok(())
    }
}
