use serde::{Deserialize, Serialize};
use std::fmt;

/// Stimulus channel of a trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Visual,
    Auditory,
}

impl Modality {
    pub const ALL: [Modality; 2] = [Modality::Visual, Modality::Auditory];

    pub fn label(&self) -> &'static str {
        match self {
            Modality::Visual => "Visual",
            Modality::Auditory => "Auditory",
        }
    }

    /// What the participant perceives when the stimulus fires.
    pub fn description(&self) -> &'static str {
        match self {
            Modality::Visual => "Visual (Red Screen)",
            Modality::Auditory => "Auditory (Bell Sound)",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Presents stimuli on command from the trial controller.
///
/// Both calls are fire-and-forget and treated as synchronous: the controller
/// reads the onset timestamp immediately after `render_stimulus` returns.
pub trait StimulusEmitter {
    fn render_stimulus(&mut self, modality: Modality);
    fn clear_stimulus(&mut self);
}

impl<E: StimulusEmitter + ?Sized> StimulusEmitter for &mut E {
    fn render_stimulus(&mut self, modality: Modality) {
        (**self).render_stimulus(modality)
    }

    fn clear_stimulus(&mut self) {
        (**self).clear_stimulus()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterCall {
    Render(Modality),
    Clear,
}

/// Emitter that only remembers what it was asked to do. Used for headless
/// runs and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingEmitter {
    pub calls: Vec<EmitterCall>,
    pub showing: Option<Modality>,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, EmitterCall::Render(_)))
            .count()
    }
}

impl StimulusEmitter for RecordingEmitter {
    fn render_stimulus(&mut self, modality: Modality) {
        self.calls.push(EmitterCall::Render(modality));
        self.showing = Some(modality);
    }

    fn clear_stimulus(&mut self) {
        self.calls.push(EmitterCall::Clear);
        self.showing = None;
    }
}
