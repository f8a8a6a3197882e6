use rand::SeedableRng;
use rand::rngs::StdRng;
use rtlab_core::{Modality, RecordingEmitter, TrialState};
use rtlab_experiment::{Comparison, ExperimentConfig, SessionCommand, TrialController};
use rtlab_timing::{ManualTimer, Scheduler};

type Controller = TrialController<ManualTimer, RecordingEmitter, StdRng>;

fn controller(seed: u64) -> Controller {
    TrialController::new(
        &ExperimentConfig::default(),
        ManualTimer::new(),
        RecordingEmitter::new(),
        StdRng::seed_from_u64(seed),
    )
}

/// Runs the current trial to completion with the given reaction time.
fn complete_trial(c: &mut Controller, reaction_ms: u64) {
    assert!(c.handle_command(SessionCommand::BeginTrial));
    assert!(c.timer_mut().advance_to_next_deadline());
    assert!(c.poll());
    assert_eq!(c.state(), TrialState::AwaitingResponse);
    c.timer_mut().advance_ms(reaction_ms);
    assert!(c.handle_command(SessionCommand::Respond));
    assert_eq!(c.state(), TrialState::Completed);
}

#[test]
fn full_session_reaches_summary_in_order() {
    let times = [190, 210, 230, 250, 270, 290, 310, 330];
    let mut c = controller(1);
    assert!(c.handle_command(SessionCommand::Start));

    for (i, &ms) in times.iter().enumerate() {
        assert_eq!(c.current_trial_index(), i);
        assert_eq!(c.state(), TrialState::PreTrial);
        complete_trial(&mut c, ms);

        if i + 1 < times.len() {
            assert!(!c.handle_command(SessionCommand::ViewSummary));
            assert!(c.handle_command(SessionCommand::Advance));
            assert_eq!(c.current_trial_index(), i + 1);
        } else {
            assert!(c.is_last_trial());
            assert!(c.handle_command(SessionCommand::ViewSummary));
        }
    }

    assert_eq!(c.state(), TrialState::Summary);
    assert!(c.current_trial().is_none());
    assert_eq!(c.results().len(), 8);
    for (i, result) in c.results().iter().enumerate() {
        assert_eq!(result.trial_index, i);
        assert_eq!(result.reaction_time_ms, times[i]);
        assert_eq!(result.is_practice, i < 2);
        let expected = if i % 2 == 0 {
            Modality::Visual
        } else {
            Modality::Auditory
        };
        assert_eq!(result.modality, expected);
    }
    assert_eq!(c.emitter().render_count(), 8);

    let first = c.statistics();
    for _ in 0..5 {
        assert_eq!(c.statistics(), first);
    }
    assert_eq!(first.visual.practice_ms, Some(190));
    assert_eq!(first.visual.test_times_ms, vec![230, 270, 310]);
    assert_eq!(first.visual.mean_ms, Some(270));
    assert_eq!(first.auditory.test_times_ms, vec![250, 290, 330]);
    assert_eq!(first.auditory.mean_ms, Some(290));
    assert_eq!(
        first.comparison,
        Some(Comparison::Faster {
            modality: Modality::Visual,
            difference_ms: 20
        })
    );

    // summary is terminal for everything but restart
    for command in [
        SessionCommand::Start,
        SessionCommand::BeginTrial,
        SessionCommand::Respond,
        SessionCommand::Advance,
        SessionCommand::Retry,
        SessionCommand::ViewSummary,
    ] {
        assert!(!c.handle_command(command), "{command:?}");
    }
    assert_eq!(c.state(), TrialState::Summary);
    assert_eq!(c.results().len(), 8);
}

#[test]
fn disqualifications_do_not_leave_gaps() {
    let mut c = controller(2);
    c.start_session();

    for i in 0..8 {
        // one anticipatory press on every trial before the real attempt
        c.begin_trial();
        c.timer_mut().advance_ms(1_000);
        assert!(c.respond());
        assert_eq!(c.state(), TrialState::Disqualified);
        assert_eq!(c.results().len(), i);
        assert_eq!(c.current_trial_index(), i);
        assert_eq!(c.timer().pending_count(), 0);
        assert!(c.retry_trial());

        complete_trial(&mut c, 250);
        c.advance();
    }

    assert_eq!(c.state(), TrialState::Summary);
    let indices: Vec<_> = c.results().iter().map(|r| r.trial_index).collect();
    assert_eq!(indices, (0..8).collect::<Vec<_>>());
}

#[test]
fn at_most_one_timer_pending() {
    let mut c = controller(3);
    c.start_session();
    for _ in 0..20 {
        c.begin_trial();
        assert!(c.timer().pending_count() <= 1);
        c.respond();
        c.retry_trial();
    }
    assert_eq!(c.timer().pending_count(), 0);
}

#[test]
fn restart_then_start_clears_previous_session() {
    let mut c = controller(4);
    c.start_session();
    complete_trial(&mut c, 300);
    c.advance();
    assert_eq!(c.results().len(), 1);

    assert!(c.handle_command(SessionCommand::Restart));
    assert!(c.results().is_empty());
    assert!(c.handle_command(SessionCommand::Start));
    assert_eq!(c.current_trial_index(), 0);
    assert_eq!(c.state(), TrialState::PreTrial);
}

#[test]
fn export_reflects_log() {
    let mut c = controller(5);
    c.start_session();
    complete_trial(&mut c, 205);

    let export = c.export(chrono::Utc::now());
    assert_eq!(export.total_trials, 8);
    assert_eq!(export.results, c.results().snapshot());
    assert_eq!(export.results[0].reaction_time_ms, 205);
}
