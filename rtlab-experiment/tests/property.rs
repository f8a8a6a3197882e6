use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rtlab_core::{RecordingEmitter, TrialState};
use rtlab_experiment::{ExperimentConfig, TrialController};
use rtlab_timing::ManualTimer;
use std::time::Duration;

type Controller = TrialController<ManualTimer, RecordingEmitter, StdRng>;

fn controller(seed: u64) -> Controller {
    TrialController::new(
        &ExperimentConfig::default(),
        ManualTimer::new(),
        RecordingEmitter::new(),
        StdRng::seed_from_u64(seed),
    )
}

#[test]
fn grace_delay_is_bounded_and_roughly_uniform() {
    let mut c = controller(42);
    c.start_session();

    let mut buckets = [0usize; 5];
    let (mut min, mut max) = (u64::MAX, 0);
    for _ in 0..10_000 {
        assert!(c.begin_trial());
        let delay = c.current_attempt().unwrap().delay_ms;
        assert!((7_000..=12_000).contains(&delay), "delay {delay}");
        min = min.min(delay);
        max = max.max(delay);
        buckets[(((delay - 7_000) / 1_000) as usize).min(4)] += 1;

        c.respond();
        c.retry_trial();
    }

    assert!(min < 7_050, "min {min}");
    assert!(max > 11_950, "max {max}");
    for (i, count) in buckets.iter().enumerate() {
        assert!((1_800..=2_200).contains(count), "bucket {i}: {count}");
    }
    assert!(c.results().is_empty());
}

proptest! {
    #[test]
    fn reaction_time_is_rounded_delta(seed in any::<u64>(), wait_ns in 0u64..5_000_000_000) {
        let mut c = controller(seed);
        c.start_session();
        c.begin_trial();
        prop_assert!(c.timer_mut().advance_to_next_deadline());
        prop_assert!(c.poll());

        let onset = c.current_attempt().unwrap().timestamps.onset.unwrap();
        c.timer_mut().advance(Duration::from_nanos(wait_ns));
        prop_assert!(c.respond());

        let rt = c.last_result().unwrap().reaction_time_ms;
        let expected = ((wait_ns as f64) / 1_000_000.0).round() as u64;
        prop_assert_eq!(rt, expected);
        prop_assert!(onset > 0);
    }

    #[test]
    fn early_press_never_shows_stimulus(seed in any::<u64>(), press_ms in 0u64..7_000) {
        let mut c = controller(seed);
        c.start_session();
        c.begin_trial();
        c.timer_mut().advance_ms(press_ms);
        prop_assert!(!c.poll());
        prop_assert!(c.respond());
        prop_assert_eq!(c.state(), TrialState::Disqualified);

        c.timer_mut().advance_ms(60_000);
        prop_assert!(!c.poll());
        prop_assert_eq!(c.emitter().render_count(), 0);
        prop_assert!(c.results().is_empty());
    }

    #[test]
    fn custom_range_is_respected(lo in 1u64..5_000, span in 0u64..5_000, seed in any::<u64>()) {
        let config = ExperimentConfig {
            grace_range_ms: (lo, lo + span),
            ..ExperimentConfig::default()
        };
        let mut c = TrialController::new(
            &config,
            ManualTimer::new(),
            RecordingEmitter::new(),
            StdRng::seed_from_u64(seed),
        );
        c.start_session();
        c.begin_trial();
        let delay = c.current_attempt().unwrap().delay_ms;
        prop_assert!(delay >= lo && delay <= lo + span);
    }
}
