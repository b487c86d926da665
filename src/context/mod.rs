//! Run-scoped state shared by every frame of a resolution.

use crate::config::{InclusionTracker, VariableStore};

/// Mutable state owned by a single resolution run.
///
/// One context is created per run and passed by reference into every
/// recursive call; nothing survives between runs.
#[derive(Debug, Default)]
pub struct ResolveContext {
    pub(crate) tracker: InclusionTracker,
    pub(crate) store: VariableStore,
    pub(crate) failures: usize,
}

impl ResolveContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracker(&self) -> &InclusionTracker {
        &self.tracker
    }

    pub fn store(&self) -> &VariableStore {
        &self.store
    }

    /// Number of failures handled in this run, whether aborted on or skipped.
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Ends the run, keeping the merged variables.
    pub fn into_store(self) -> VariableStore {
        self.store
    }
}
