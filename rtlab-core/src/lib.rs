pub mod rating;
pub mod stimulus;
pub mod trial;

pub use rating::{PerformanceRating, rate};
pub use stimulus::{EmitterCall, Modality, RecordingEmitter, StimulusEmitter};
pub use trial::{TRIAL_COUNT, TrialDescriptor, TrialPlan, TrialResult, TrialState};
