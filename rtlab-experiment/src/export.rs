use crate::results::ResultLog;
use chrono::{DateTime, Utc};
use rtlab_core::{TrialPlan, TrialResult};
use serde::{Deserialize, Serialize};

/// Structured session record for download/persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExport {
    pub timestamp: DateTime<Utc>,
    pub total_trials: usize,
    pub results: Vec<TrialResult>,
}

impl SessionExport {
    pub fn new(timestamp: DateTime<Utc>, plan: &TrialPlan, log: &ResultLog) -> Self {
        Self {
            timestamp,
            total_trials: plan.len(),
            results: log.snapshot(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// e.g. `reaction-time-lab-2024-05-01.json`
    pub fn file_name(&self) -> String {
        format!(
            "reaction-time-lab-{}.json",
            self.timestamp.format("%Y-%m-%d")
        )
    }
}
