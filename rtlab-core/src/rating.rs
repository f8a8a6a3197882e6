use std::fmt;

/// Coarse performance label for a single reaction time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PerformanceRating {
    Exceptional,
    Excellent,
    VeryGood,
    Good,
    Average,
    NeedsImprovement,
}

// Exclusive upper bounds in ms, checked in ascending order.
const THRESHOLDS: [(u64, PerformanceRating); 5] = [
    (200, PerformanceRating::Exceptional),
    (250, PerformanceRating::Excellent),
    (300, PerformanceRating::VeryGood),
    (400, PerformanceRating::Good),
    (500, PerformanceRating::Average),
];

pub fn rate(reaction_time_ms: u64) -> PerformanceRating {
    THRESHOLDS
        .iter()
        .find(|(bound, _)| reaction_time_ms < *bound)
        .map_or(PerformanceRating::NeedsImprovement, |(_, rating)| *rating)
}

impl PerformanceRating {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Exceptional => "Exceptional",
            Self::Excellent => "Excellent",
            Self::VeryGood => "Very Good",
            Self::Good => "Good",
            Self::Average => "Average",
            Self::NeedsImprovement => "Needs improvement",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Exceptional => "🚀",
            Self::Excellent => "⚡",
            Self::VeryGood => "👍",
            Self::Good => "👌",
            Self::Average => "📊",
            Self::NeedsImprovement => "🐌",
        }
    }
}

impl fmt::Display for PerformanceRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
