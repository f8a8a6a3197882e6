use crate::stats::SessionStatistics;
use rtlab_core::TrialResult;
use serde::Serialize;

/// Append-only record of completed trials, in completion order.
///
/// Only the trial controller appends or clears; everyone else gets `&self`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultLog {
    entries: Vec<TrialResult>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, result: TrialResult) {
        self.entries.push(result);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TrialResult> {
        self.entries.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrialResult> {
        self.entries.iter()
    }

    /// Owned copy for export.
    pub fn snapshot(&self) -> Vec<TrialResult> {
        self.entries.clone()
    }

    pub fn statistics(&self) -> SessionStatistics {
        SessionStatistics::compute(&self.entries)
    }
}
