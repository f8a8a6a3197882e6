//! Console text for each screen of the lab.

use rtlab_core::{Modality, TrialDescriptor, TrialResult, rate};
use rtlab_experiment::{Comparison, ModalityStats, SessionStatistics};
use std::fmt::Write;

const RULE: &str = "----------------------------------------";

pub fn welcome() -> String {
    let mut s = String::new();
    let _ = writeln!(s, "=== REACTION TIME LAB ===");
    let _ = writeln!(s, "2 practice rounds, then 6 alternating visual/auditory tests.");
    let _ = writeln!(s, "Press SPACE as soon as you see or hear the stimulus.");
    let _ = writeln!(s, "Pressing before the stimulus disqualifies the round.");
    let _ = writeln!(s);
    let _ = write!(s, "ENTER: begin   R: restart   E: export   ESC: quit");
    s
}

pub fn pre_trial(index: usize, trial: &TrialDescriptor, grace_range_ms: (u64, u64)) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "{RULE}");
    let _ = writeln!(
        s,
        "{} Round {} - {} Test",
        trial.kind_label(),
        index + 1,
        trial.modality
    );
    let _ = writeln!(s, "Test type: {}", trial.modality);
    let _ = writeln!(
        s,
        "Grace period: {}-{} seconds",
        seconds(grace_range_ms.0),
        seconds(grace_range_ms.1)
    );
    match trial.modality {
        Modality::Visual => {
            let _ = writeln!(s, "Watch the screen. It will change from black to red.");
            let _ = writeln!(s, "Press SPACE immediately when you see the color change.");
            let _ = writeln!(s, "Keep your eyes on the center of the screen.");
            let _ = writeln!(s, "Do NOT press SPACE until you see the color change.");
        }
        Modality::Auditory => {
            let _ = writeln!(s, "Listen for a bell while the screen stays black.");
            let _ = writeln!(s, "Press SPACE immediately when you hear the sound.");
            let _ = writeln!(s, "Closing your eyes helps you focus on listening.");
            let _ = writeln!(s, "Do NOT press SPACE until you hear the bell.");
        }
    }
    let _ = write!(s, "Press ENTER to start the round.");
    s
}

pub fn grace_period() -> &'static str {
    "Waiting for the stimulus..."
}

pub fn round_result(result: &TrialResult, total: usize, is_last: bool) -> String {
    let rating = rate(result.reaction_time_ms);
    let kind = if result.is_practice { "Practice" } else { "Test" };
    let mut s = String::new();
    let _ = writeln!(s, "Round {} of {} - {}", result.trial_index + 1, total, kind);
    let _ = writeln!(s, "Stimulus: {}", result.modality.description());
    let _ = writeln!(s, "Reaction time: {}ms", result.reaction_time_ms);
    let _ = writeln!(s, "{} {}", rating.emoji(), rating);
    if is_last {
        let _ = write!(s, "Press ENTER to view statistics.");
    } else {
        let _ = write!(s, "Press ENTER to continue.");
    }
    s
}

pub fn disqualified(index: usize) -> String {
    format!(
        "Round {} disqualified: you pressed SPACE before the stimulus.\nPress ENTER to retry.",
        index + 1
    )
}

pub fn statistics(stats: &SessionStatistics) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "{RULE}");
    let _ = writeln!(s, "=== RESULTS ===");
    modality_block(&mut s, &stats.visual);
    modality_block(&mut s, &stats.auditory);
    match stats.comparison {
        Some(Comparison::Faster {
            modality,
            difference_ms,
        }) => {
            let _ = writeln!(s, "{modality} stimulus was faster on average");
            let _ = writeln!(s, "Difference: {difference_ms}ms faster");
        }
        Some(Comparison::Tie) => {
            let _ = writeln!(s, "Visual and auditory averages were identical");
        }
        None => {
            let _ = writeln!(s, "Not enough test rounds to compare modalities");
        }
    }
    let _ = write!(s, "E: export results   R: restart   ESC: quit");
    s
}

fn modality_block(s: &mut String, stats: &ModalityStats) {
    let tests = if stats.test_times_ms.is_empty() {
        "-".to_string()
    } else {
        stats
            .test_times_ms
            .iter()
            .map(|t| format!("{t}ms"))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let _ = writeln!(s, "{}:", stats.modality);
    let _ = writeln!(s, "  Practice: {}", format_ms(stats.practice_ms));
    let _ = writeln!(s, "  Tests:    {tests}");
    let _ = writeln!(s, "  Average:  {}", format_ms(stats.mean_ms));
    let _ = writeln!(s, "  Best:     {}", format_ms(stats.best_ms));
}

pub fn format_ms(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |ms| format!("{ms}ms"))
}

fn seconds(ms: u64) -> String {
    if ms % 1_000 == 0 {
        (ms / 1_000).to_string()
    } else {
        format!("{:.1}", ms as f64 / 1_000.0)
    }
}
