use crate::stimulus::Modality;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const TRIAL_COUNT: usize = 8;

/// One slot of the trial plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialDescriptor {
    pub modality: Modality,
    pub is_practice: bool,
}

impl TrialDescriptor {
    pub const fn practice(modality: Modality) -> Self {
        Self {
            modality,
            is_practice: true,
        }
    }

    pub const fn test(modality: Modality) -> Self {
        Self {
            modality,
            is_practice: false,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        if self.is_practice { "Practice" } else { "Test" }
    }
}

/// Fixed, ordered sequence of trials run by a session.
///
/// Two practice rounds (visual, auditory) followed by three alternating
/// visual/auditory test pairs. Order never changes at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialPlan {
    trials: [TrialDescriptor; TRIAL_COUNT],
}

impl TrialPlan {
    pub const fn standard() -> Self {
        use Modality::*;
        Self {
            trials: [
                TrialDescriptor::practice(Visual),
                TrialDescriptor::practice(Auditory),
                TrialDescriptor::test(Visual),
                TrialDescriptor::test(Auditory),
                TrialDescriptor::test(Visual),
                TrialDescriptor::test(Auditory),
                TrialDescriptor::test(Visual),
                TrialDescriptor::test(Auditory),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TrialDescriptor> {
        self.trials.get(index)
    }

    pub fn last_index(&self) -> usize {
        self.trials.len().saturating_sub(1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrialDescriptor> {
        self.trials.iter()
    }
}

impl Default for TrialPlan {
    fn default() -> Self {
        Self::standard()
    }
}

/// Recorded outcome of a completed (non-disqualified) trial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialResult {
    pub trial_index: usize,
    pub modality: Modality,
    pub is_practice: bool,
    pub reaction_time_ms: u64,
    pub captured_at: DateTime<Utc>,
}

/// Trial controller states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrialState {
    #[default]
    Idle,
    PreTrial,
    GracePeriod,
    AwaitingResponse,
    Completed,
    Disqualified,
    Summary,
}

impl TrialState {
    /// States in which the response key means something.
    pub fn accepts_response(&self) -> bool {
        matches!(self, Self::GracePeriod | Self::AwaitingResponse)
    }
}

impl fmt::Display for TrialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::PreTrial => "pre-trial",
            Self::GracePeriod => "grace-period",
            Self::AwaitingResponse => "waiting-for-response",
            Self::Completed => "completed",
            Self::Disqualified => "disqualified",
            Self::Summary => "summary",
        };
        f.write_str(name)
    }
}
