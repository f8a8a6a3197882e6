pub mod config;
pub mod export;
pub mod results;
pub mod state;
pub mod stats;
pub mod trial;

pub use config::{ConfigError, ExperimentConfig};
pub use export::SessionExport;
pub use results::ResultLog;
pub use state::{SessionCommand, TrialController};
pub use stats::{Comparison, ModalityStats, SessionStatistics};
pub use trial::{AttemptTimestamps, TrialAttempt};
