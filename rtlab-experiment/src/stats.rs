use rtlab_core::{Modality, TrialResult};
use std::cmp::Ordering;

/// Aggregates for one modality. `None` means "unavailable".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalityStats {
    pub modality: Modality,
    pub practice_ms: Option<u64>,
    pub test_times_ms: Vec<u64>,
    pub mean_ms: Option<u64>,
    pub best_ms: Option<u64>,
}

/// Which modality was faster on average across test trials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Faster { modality: Modality, difference_ms: u64 },
    Tie,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatistics {
    pub visual: ModalityStats,
    pub auditory: ModalityStats,
    /// Present only when both modalities have at least one test result.
    pub comparison: Option<Comparison>,
}

impl ModalityStats {
    pub fn compute(results: &[TrialResult], modality: Modality) -> Self {
        let practice_ms = results
            .iter()
            .find(|r| r.is_practice && r.modality == modality)
            .map(|r| r.reaction_time_ms);
        let test_times_ms: Vec<u64> = results
            .iter()
            .filter(|r| !r.is_practice && r.modality == modality)
            .map(|r| r.reaction_time_ms)
            .collect();
        let mean_ms = mean(&test_times_ms).map(round_ms);
        let best_ms = test_times_ms.iter().copied().min();

        Self {
            modality,
            practice_ms,
            test_times_ms,
            mean_ms,
            best_ms,
        }
    }

    /// Unrounded mean of the test times.
    pub fn exact_mean_ms(&self) -> Option<f64> {
        mean(&self.test_times_ms)
    }
}

impl SessionStatistics {
    /// Pure over the log; recomputing yields the same value.
    pub fn compute(results: &[TrialResult]) -> Self {
        let visual = ModalityStats::compute(results, Modality::Visual);
        let auditory = ModalityStats::compute(results, Modality::Auditory);
        let comparison = compare(&visual, &auditory);
        Self {
            visual,
            auditory,
            comparison,
        }
    }

    pub fn for_modality(&self, modality: Modality) -> &ModalityStats {
        match modality {
            Modality::Visual => &self.visual,
            Modality::Auditory => &self.auditory,
        }
    }
}

fn compare(visual: &ModalityStats, auditory: &ModalityStats) -> Option<Comparison> {
    let (v_sum, v_n) = sum_and_count(&visual.test_times_ms)?;
    let (a_sum, a_n) = sum_and_count(&auditory.test_times_ms)?;

    // Cross-multiplied so an exact tie is detected without float error.
    let ordering = (v_sum * a_n).cmp(&(a_sum * v_n));
    let faster = match ordering {
        Ordering::Less => Modality::Visual,
        Ordering::Greater => Modality::Auditory,
        Ordering::Equal => return Some(Comparison::Tie),
    };
    let difference = (v_sum as f64 / v_n as f64 - a_sum as f64 / a_n as f64).abs();
    Some(Comparison::Faster {
        modality: faster,
        difference_ms: round_ms(difference),
    })
}

fn sum_and_count(times: &[u64]) -> Option<(u128, u128)> {
    if times.is_empty() {
        return None;
    }
    let sum = times.iter().map(|&t| t as u128).sum();
    Some((sum, times.len() as u128))
}

fn mean(times: &[u64]) -> Option<f64> {
    let (sum, n) = sum_and_count(times)?;
    Some(sum as f64 / n as f64)
}

// Half rounds up; inputs are never negative.
fn round_ms(value: f64) -> u64 {
    value.round() as u64
}
