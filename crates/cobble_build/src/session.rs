//! Mutable bookkeeping for one build invocation.

use std::collections::{HashMap, HashSet};

use cobble_common::{MTime, UnitPath};

/// State owned by a single build: what has been visited, which objects
/// make up the link, and the newest build-relevant timestamp seen.
///
/// A fresh session is created for every build; nothing carries over
/// between builds except what is on disk.
#[derive(Debug, Default)]
pub struct Session {
    visited: HashSet<UnitPath>,
    artifacts: Vec<UnitPath>,
    owners: HashMap<UnitPath, UnitPath>,
    compiled: Vec<UnitPath>,
    latest: MTime,
}

impl Session {
    /// Creates an empty session whose running maximum is [`MTime::ZERO`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `unit` as visited. Returns `false` if it already was.
    pub fn mark_visited(&mut self, unit: &UnitPath) -> bool {
        if self.visited.contains(unit) {
            return false;
        }
        self.visited.insert(unit.clone())
    }

    /// Appends `unit`'s object to the link set.
    ///
    /// Fails with the unit that already owns `artifact` when two distinct
    /// sources map onto the same object path.
    pub fn claim_artifact(&mut self, unit: &UnitPath, artifact: UnitPath) -> Result<(), UnitPath> {
        if let Some(owner) = self.owners.get(&artifact) {
            return Err(owner.clone());
        }
        self.owners.insert(artifact.clone(), unit.clone());
        self.artifacts.push(artifact);
        Ok(())
    }

    /// Records that `unit` was compiled.
    pub fn record_compile(&mut self, unit: UnitPath) {
        self.compiled.push(unit);
    }

    /// Folds `time` into the running maximum.
    pub fn observe(&mut self, time: MTime) {
        self.latest = self.latest.max(time);
    }

    /// Objects in the order their source units were first visited.
    pub fn artifacts(&self) -> &[UnitPath] {
        &self.artifacts
    }

    /// Source units compiled so far, in compile order.
    pub fn compiled(&self) -> &[UnitPath] {
        &self.compiled
    }

    /// The newest artifact or compile timestamp observed.
    pub fn latest(&self) -> MTime {
        self.latest
    }
}
