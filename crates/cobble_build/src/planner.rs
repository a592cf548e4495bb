//! One full build: traverse from the entry unit, then decide on the link.

use cobble_common::{MTime, UnitPath};
use cobble_config::{Layout, UnitKind, UnitsConfig};
use cobble_toolchain::Toolchain;

use crate::error::{create_dir_all, BuildError};
use crate::session::Session;
use crate::traversal::Traversal;

/// Summary of a finished build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Source units compiled, in compile order.
    pub compiled: Vec<UnitPath>,
    /// Every object in the link set, in first-visit order.
    pub artifacts: Vec<UnitPath>,
    /// The final binary.
    pub target: UnitPath,
    /// Whether the binary was relinked.
    pub linked: bool,
    /// Newest artifact or compile timestamp observed.
    pub latest: MTime,
}

impl BuildReport {
    /// Returns `true` if the build did no work at all.
    pub fn is_noop(&self) -> bool {
        self.compiled.is_empty() && !self.linked
    }
}

/// Drives build sessions for one project.
pub struct BuildPlanner<T> {
    layout: Layout,
    units: UnitsConfig,
    toolchain: T,
}

impl<T: Toolchain> BuildPlanner<T> {
    /// Creates a planner for the project at `layout`.
    pub fn new(layout: Layout, units: UnitsConfig, toolchain: T) -> Self {
        Self {
            layout,
            units,
            toolchain,
        }
    }

    /// Returns the toolchain.
    pub fn toolchain(&self) -> &T {
        &self.toolchain
    }

    /// Builds the binary for `entry`.
    ///
    /// Runs a fresh [`Session`], compiling every stale unit reachable from
    /// `entry`, then relinks when the newest observed timestamp is not older
    /// than the binary (a missing binary is always relinked).
    pub fn build(&self, entry: &UnitPath) -> Result<BuildReport, BuildError> {
        if !self.layout.is_file(entry) {
            return Err(BuildError::EntryNotFound(entry.clone()));
        }
        if UnitKind::classify(entry, &self.units) != UnitKind::Source {
            return Err(BuildError::EntryNotSource(entry.clone()));
        }

        let mut session = Session::new();
        Traversal::new(&self.layout, &self.units, &self.toolchain).visit(&mut session, entry)?;

        let target = self.layout.target_path(entry);
        let target_time = self.layout.mtime(&target);
        let linked = session.latest() >= target_time;
        if linked {
            if let Some(dir) = self.layout.resolve(&target).parent() {
                create_dir_all(dir)?;
            }
            self.toolchain.link(session.artifacts(), &target)?;
        } else {
            tracing::debug!("{target} is up to date");
        }

        Ok(BuildReport {
            compiled: session.compiled().to_vec(),
            artifacts: session.artifacts().to_vec(),
            target,
            linked,
            latest: session.latest(),
        })
    }
}
