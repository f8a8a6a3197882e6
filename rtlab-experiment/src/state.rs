use super::config::ExperimentConfig;
use super::export::SessionExport;
use super::results::ResultLog;
use super::stats::SessionStatistics;
use super::trial::{AttemptTimestamps, TrialAttempt};
use chrono::{DateTime, Utc};
use rand::Rng;
use rtlab_core::{StimulusEmitter, TrialDescriptor, TrialPlan, TrialResult, TrialState};
use rtlab_timing::{Scheduler, TimerHandle};
use std::ops::RangeInclusive;
use std::time::Duration;
use tracing::{debug, info, warn};

/// User-level actions, one per controller operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Start,
    BeginTrial,
    Respond,
    Advance,
    Retry,
    ViewSummary,
    Restart,
}

/// Owns one reaction-time session: the cursor into the trial plan, the
/// pending grace-period timer, and the result log.
///
/// Every operation returns `true` if it caused a transition. Operations
/// invoked outside their valid state are ignored and return `false`.
pub struct TrialController<T, E, R>
where
    T: Scheduler,
    E: StimulusEmitter,
    R: Rng,
{
    timer: T,
    emitter: E,
    rng: R,
    grace_range_ms: RangeInclusive<u64>,
    plan: TrialPlan,
    state: TrialState,
    cursor: usize,
    current: Option<TrialAttempt>,
    results: ResultLog,
}

impl<T, E, R> TrialController<T, E, R>
where
    T: Scheduler,
    E: StimulusEmitter,
    R: Rng,
{
    pub fn new(config: &ExperimentConfig, timer: T, emitter: E, rng: R) -> Self {
        Self {
            timer,
            emitter,
            rng,
            grace_range_ms: config.grace_range(),
            plan: TrialPlan::standard(),
            state: TrialState::Idle,
            cursor: 0,
            current: None,
            results: ResultLog::new(),
        }
    }

    pub fn handle_command(&mut self, command: SessionCommand) -> bool {
        let handled = match command {
            SessionCommand::Start => self.start_session(),
            SessionCommand::BeginTrial => self.begin_trial(),
            SessionCommand::Respond => self.respond(),
            SessionCommand::Advance => self.advance(),
            SessionCommand::Retry => self.retry_trial(),
            SessionCommand::ViewSummary => self.view_summary(),
            SessionCommand::Restart => self.restart(),
        };
        if !handled {
            debug!(?command, state = %self.state, "command ignored");
        }
        handled
    }

    pub fn start_session(&mut self) -> bool {
        if self.state != TrialState::Idle {
            return false;
        }
        self.cursor = 0;
        self.results.clear();
        self.current = None;
        self.state = TrialState::PreTrial;
        info!(trials = self.plan.len(), "session started");
        true
    }

    /// Draws the grace delay and arms the onset timer.
    pub fn begin_trial(&mut self) -> bool {
        if self.state != TrialState::PreTrial {
            return false;
        }
        let Some(descriptor) = self.plan.get(self.cursor).copied() else {
            return false;
        };

        let delay_ms = self.rng.random_range(self.grace_range_ms.clone());
        let handle = self.timer.schedule_once(Duration::from_millis(delay_ms));
        let now = self.timer.now();

        self.current = Some(TrialAttempt {
            index: self.cursor,
            descriptor,
            delay_ms,
            timestamps: AttemptTimestamps {
                scheduled: now,
                onset: None,
                response: None,
            },
            pending: Some(handle),
        });
        self.state = TrialState::GracePeriod;
        info!(
            trial = self.cursor + 1,
            modality = %descriptor.modality,
            practice = descriptor.is_practice,
            delay_ms,
            "trial armed"
        );
        true
    }

    /// Response before onset: cancel the timer and disqualify the attempt.
    pub fn on_early_input(&mut self) -> bool {
        if self.state != TrialState::GracePeriod {
            return false;
        }
        self.cancel_pending();
        self.current = None;
        self.state = TrialState::Disqualified;
        self.emitter.clear_stimulus();
        info!(trial = self.cursor + 1, "early response, attempt disqualified");
        true
    }

    /// Stimulus onset. Only the handle armed by the current attempt counts.
    pub fn on_timer_fire(&mut self, handle: TimerHandle) -> bool {
        if self.state != TrialState::GracePeriod {
            debug!(handle = handle.id(), state = %self.state, "timer fired outside grace period");
            return false;
        }
        let Some(attempt) = self.current.as_mut() else {
            return false;
        };
        if attempt.pending != Some(handle) {
            warn!(handle = handle.id(), "stale timer handle ignored");
            return false;
        }
        attempt.pending = None;

        let modality = attempt.descriptor.modality;
        self.emitter.render_stimulus(modality);
        let onset = self.timer.now();
        attempt.timestamps.onset = Some(onset);
        self.state = TrialState::AwaitingResponse;
        debug!(onset_ns = onset, %modality, "stimulus onset");
        true
    }

    /// Legitimate response: record the reaction time.
    pub fn on_input(&mut self) -> bool {
        if self.state != TrialState::AwaitingResponse {
            return false;
        }
        let now = self.timer.now();
        let Some(mut attempt) = self.current.take() else {
            return false;
        };
        attempt.timestamps.response = Some(now);
        let Some(reaction_time_ms) = attempt.reaction_time_ms() else {
            return false;
        };

        self.results.append(TrialResult {
            trial_index: attempt.index,
            modality: attempt.descriptor.modality,
            is_practice: attempt.descriptor.is_practice,
            reaction_time_ms,
            captured_at: Utc::now(),
        });
        self.state = TrialState::Completed;
        self.emitter.clear_stimulus();
        info!(
            trial = attempt.index + 1,
            modality = %attempt.descriptor.modality,
            reaction_time_ms,
            "response recorded"
        );
        true
    }

    /// The single response key, classified by the current state.
    pub fn respond(&mut self) -> bool {
        match self.state {
            TrialState::GracePeriod => self.on_early_input(),
            TrialState::AwaitingResponse => self.on_input(),
            _ => false,
        }
    }

    pub fn retry_trial(&mut self) -> bool {
        if self.state != TrialState::Disqualified {
            return false;
        }
        self.state = TrialState::PreTrial;
        info!(trial = self.cursor + 1, "retrying trial");
        true
    }

    pub fn advance(&mut self) -> bool {
        if self.state != TrialState::Completed {
            return false;
        }
        self.cursor += 1;
        if self.cursor >= self.plan.len() {
            self.state = TrialState::Summary;
            info!(results = self.results.len(), "session complete");
        } else {
            self.state = TrialState::PreTrial;
        }
        true
    }

    /// Leaves the final completed trial for the summary.
    pub fn view_summary(&mut self) -> bool {
        if self.state != TrialState::Completed || self.cursor != self.plan.last_index() {
            return false;
        }
        self.advance()
    }

    /// Abandons whatever is running and returns to `Idle` with an empty log.
    pub fn restart(&mut self) -> bool {
        self.cancel_pending();
        self.emitter.clear_stimulus();
        self.current = None;
        self.cursor = 0;
        self.results.clear();
        self.state = TrialState::Idle;
        info!("session reset");
        true
    }

    /// Delivers every expired timer to `on_timer_fire`. Returns true if the
    /// stimulus was presented.
    pub fn poll(&mut self) -> bool {
        let mut fired = false;
        while let Some(handle) = self.timer.take_expired() {
            fired |= self.on_timer_fire(handle);
        }
        fired
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.current.as_mut().and_then(|a| a.pending.take()) {
            self.timer.cancel(handle);
        }
    }

    pub fn state(&self) -> TrialState {
        self.state
    }

    pub fn current_trial_index(&self) -> usize {
        self.cursor
    }

    /// Descriptor at the cursor; `None` once the cursor has passed the plan.
    pub fn current_trial(&self) -> Option<&TrialDescriptor> {
        self.plan.get(self.cursor)
    }

    pub fn current_attempt(&self) -> Option<&TrialAttempt> {
        self.current.as_ref()
    }

    pub fn is_last_trial(&self) -> bool {
        self.cursor == self.plan.last_index()
    }

    pub fn plan(&self) -> &TrialPlan {
        &self.plan
    }

    pub fn results(&self) -> &ResultLog {
        &self.results
    }

    pub fn last_result(&self) -> Option<&TrialResult> {
        self.results.last()
    }

    pub fn statistics(&self) -> SessionStatistics {
        self.results.statistics()
    }

    pub fn export(&self, timestamp: DateTime<Utc>) -> SessionExport {
        SessionExport::new(timestamp, &self.plan, &self.results)
    }

    /// Monotonic deadline of the armed onset timer, if any.
    pub fn pending_deadline(&self) -> Option<u64> {
        self.current
            .as_ref()
            .and_then(|a| a.pending)
            .and(self.timer.next_deadline())
    }

    /// (1-based trial number, total) while a trial is current
    pub fn trial_progress(&self) -> Option<(usize, usize)> {
        match self.state {
            TrialState::Idle | TrialState::Summary => None,
            _ => Some((self.cursor + 1, self.plan.len())),
        }
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    pub fn emitter(&self) -> &E {
        &self.emitter
    }

    pub fn emitter_mut(&mut self) -> &mut E {
        &mut self.emitter
    }
}
