use rtlab_core::TrialDescriptor;
use rtlab_timing::TimerHandle;

/// Bookkeeping for the attempt currently running. Dropped when the attempt
/// completes or is disqualified; a retry starts a fresh one.
#[derive(Debug, Clone)]
pub struct TrialAttempt {
    pub index: usize,
    pub descriptor: TrialDescriptor,
    pub delay_ms: u64,
    pub timestamps: AttemptTimestamps,
    pub(crate) pending: Option<TimerHandle>,
}

/// Monotonic timestamps in nanoseconds
#[derive(Debug, Clone, Default)]
pub struct AttemptTimestamps {
    pub scheduled: u64,
    pub onset: Option<u64>,
    pub response: Option<u64>,
}

impl TrialAttempt {
    pub fn pending_handle(&self) -> Option<TimerHandle> {
        self.pending
    }

    /// Reaction time in whole milliseconds, half rounding up.
    pub fn reaction_time_ms(&self) -> Option<u64> {
        let onset = self.timestamps.onset?;
        let response = self.timestamps.response?;
        Some(round_ns_to_ms(response.saturating_sub(onset)))
    }
}

pub(crate) fn round_ns_to_ms(ns: u64) -> u64 {
    ns.saturating_add(500_000) / 1_000_000
}
