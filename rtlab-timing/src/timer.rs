use std::time::{Duration, Instant};
use tracing::debug;

/// Monotonic timestamp source.
///
/// Timestamps are nanoseconds since the timer was created.
pub trait Timer {
    fn now(&self) -> u64;

    fn elapsed(&self, since: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(since))
    }
}

/// Identifies one scheduled one-shot timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Cancellable one-shot timers on top of a monotonic clock.
///
/// Nothing runs on its own: the owner of the event loop asks for
/// `next_deadline`, sleeps until then, and drains `take_expired`.
pub trait Scheduler: Timer {
    fn schedule_once(&mut self, delay: Duration) -> TimerHandle;

    /// Returns false if the handle already fired or was cancelled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    fn next_deadline(&self) -> Option<u64>;

    /// Removes and returns the earliest timer whose deadline has passed.
    fn take_expired(&mut self) -> Option<TimerHandle>;

    fn pending_count(&self) -> usize;
}

#[derive(Debug, Clone, Default)]
struct PendingTimers {
    next_id: u64,
    entries: Vec<(TimerHandle, u64)>,
}

impl PendingTimers {
    fn schedule(&mut self, now: u64, delay: Duration) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        let deadline = now.saturating_add(delay.as_nanos() as u64);
        self.entries.push((handle, deadline));
        debug!(handle = handle.0, deadline_ns = deadline, "timer scheduled");
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(h, _)| *h != handle);
        let removed = self.entries.len() != before;
        if removed {
            debug!(handle = handle.0, "timer cancelled");
        }
        removed
    }

    fn next_deadline(&self) -> Option<u64> {
        self.entries.iter().map(|(_, deadline)| *deadline).min()
    }

    fn take_expired(&mut self, now: u64) -> Option<TimerHandle> {
        let (pos, _) = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, (_, deadline))| *deadline <= now)
            .min_by_key(|(_, (_, deadline))| *deadline)?;
        let (handle, _) = self.entries.remove(pos);
        Some(handle)
    }
}

/// Wall-time timer backed by `Instant`
#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    start: Instant,
    pending: PendingTimers,
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            pending: PendingTimers::default(),
        }
    }

    /// Earliest pending deadline as an `Instant`, for event-loop sleeps.
    pub fn next_wakeup(&self) -> Option<Instant> {
        self.pending
            .next_deadline()
            .map(|ns| self.start + Duration::from_nanos(ns))
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for HighPrecisionTimer {
    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }
}

impl Scheduler for HighPrecisionTimer {
    fn schedule_once(&mut self, delay: Duration) -> TimerHandle {
        let now = self.now();
        self.pending.schedule(now, delay)
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.pending.cancel(handle)
    }

    fn next_deadline(&self) -> Option<u64> {
        self.pending.next_deadline()
    }

    fn take_expired(&mut self) -> Option<TimerHandle> {
        let now = self.now();
        self.pending.take_expired(now)
    }

    fn pending_count(&self) -> usize {
        self.pending.entries.len()
    }
}

/// Deterministic timer whose clock only moves when told to.
///
/// now() starts at 0 and advances through `advance`; scheduled
/// timers expire once the clock reaches their deadline.
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    now_ns: u64,
    pending: PendingTimers,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, d: Duration) {
        self.now_ns = self.now_ns.saturating_add(d.as_nanos() as u64);
    }

    pub fn advance_ms(&mut self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Moves the clock to the earliest pending deadline, if any.
    pub fn advance_to_next_deadline(&mut self) -> bool {
        match self.pending.next_deadline() {
            Some(deadline) => {
                self.now_ns = self.now_ns.max(deadline);
                true
            }
            None => false,
        }
    }
}

impl Timer for ManualTimer {
    fn now(&self) -> u64 {
        self.now_ns
    }
}

impl Scheduler for ManualTimer {
    fn schedule_once(&mut self, delay: Duration) -> TimerHandle {
        self.pending.schedule(self.now_ns, delay)
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.pending.cancel(handle)
    }

    fn next_deadline(&self) -> Option<u64> {
        self.pending.next_deadline()
    }

    fn take_expired(&mut self) -> Option<TimerHandle> {
        self.pending.take_expired(self.now_ns)
    }

    fn pending_count(&self) -> usize {
        self.pending.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_timer_fires_only_at_deadline() {
        let mut timer = ManualTimer::new();
        let handle = timer.schedule_once(Duration::from_millis(100));
        assert_eq!(timer.next_deadline(), Some(100_000_000));

        timer.advance_ms(99);
        assert_eq!(timer.take_expired(), None);

        timer.advance_ms(1);
        assert_eq!(timer.take_expired(), Some(handle));
        assert_eq!(timer.take_expired(), None);
        assert_eq!(timer.pending_count(), 0);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timer = ManualTimer::new();
        let handle = timer.schedule_once(Duration::from_millis(10));
        assert!(timer.cancel(handle));
        assert!(!timer.cancel(handle));

        timer.advance_ms(1_000);
        assert_eq!(timer.take_expired(), None);
        assert_eq!(timer.next_deadline(), None);
    }

    #[test]
    fn expired_timers_drain_in_deadline_order() {
        let mut timer = ManualTimer::new();
        let late = timer.schedule_once(Duration::from_millis(30));
        let early = timer.schedule_once(Duration::from_millis(10));
        assert_ne!(late, early);

        timer.advance_ms(50);
        assert_eq!(timer.take_expired(), Some(early));
        assert_eq!(timer.take_expired(), Some(late));
    }

    #[test]
    fn advance_to_next_deadline_jumps_clock() {
        let mut timer = ManualTimer::new();
        assert!(!timer.advance_to_next_deadline());
        timer.schedule_once(Duration::from_millis(7_500));
        assert!(timer.advance_to_next_deadline());
        assert_eq!(timer.now(), 7_500_000_000);
        assert_eq!(timer.elapsed(7_000_000_000), Duration::from_millis(500));
    }

    #[test]
    fn high_precision_timer_is_monotonic() {
        let timer = HighPrecisionTimer::new();
        let a = timer.now();
        let b = timer.now();
        assert!(b >= a);
    }

    #[test]
    fn high_precision_wakeup_tracks_pending_deadline() {
        let mut timer = HighPrecisionTimer::new();
        assert!(timer.next_wakeup().is_none());
        let handle = timer.schedule_once(Duration::from_secs(60));
        let wakeup = timer.next_wakeup().unwrap();
        assert!(wakeup > Instant::now());
        assert_eq!(timer.take_expired(), None);
        assert!(timer.cancel(handle));
        assert!(timer.next_wakeup().is_none());
    }
}
