use crate::audio::{AudioCue, CpalCue};
use pixels::Pixels;
use rtlab_core::{Modality, StimulusEmitter};
use std::sync::Arc;
use tracing::warn;
use winit::window::Window;

const BACKGROUND: [u8; 4] = [0, 0, 0, 255];
const VISUAL_STIMULUS: [u8; 4] = [255, 0, 0, 255];

/// Presents stimuli on the experiment window.
///
/// Visual: the whole surface switches from black to red. Auditory: the
/// surface stays black and the bell cue plays. Frames are pushed to the
/// surface before `render_stimulus` returns.
pub struct ScreenEmitter {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    audio: Box<dyn AudioCue>,
    showing: Option<Modality>,
}

impl ScreenEmitter {
    pub fn new() -> Self {
        Self::with_audio(Box::new(CpalCue::open_default()))
    }

    pub fn with_audio(audio: Box<dyn AudioCue>) -> Self {
        Self {
            window: None,
            pixels: None,
            audio,
            showing: None,
        }
    }

    pub fn attach(&mut self, window: Arc<Window>, pixels: Pixels<'static>) {
        self.window = Some(window);
        self.pixels = Some(pixels);
    }

    pub fn showing(&self) -> Option<Modality> {
        self.showing
    }

    pub fn fill_color(&self) -> [u8; 4] {
        match self.showing {
            Some(Modality::Visual) => VISUAL_STIMULUS,
            _ => BACKGROUND,
        }
    }

    pub fn present(&mut self) -> Result<(), pixels::Error> {
        let color = self.fill_color();
        if let Some(pixels) = &mut self.pixels {
            fill(pixels.frame_mut(), color);
            pixels.render()?;
        }
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(width, height) {
                warn!(error = %e, "failed to resize surface");
            }
            if let Err(e) = pixels.resize_buffer(width, height) {
                warn!(error = %e, "failed to resize buffer");
            }
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn present_now(&mut self) {
        if let Err(e) = self.present() {
            warn!(error = %e, "failed to present frame");
        }
    }
}

impl StimulusEmitter for ScreenEmitter {
    fn render_stimulus(&mut self, modality: Modality) {
        self.showing = Some(modality);
        if modality == Modality::Auditory {
            self.audio.play();
        }
        self.present_now();
    }

    fn clear_stimulus(&mut self) {
        self.showing = None;
        self.audio.stop();
        self.present_now();
    }
}

fn fill(frame: &mut [u8], color: [u8; 4]) {
    for pixel in frame.chunks_exact_mut(4) {
        pixel.copy_from_slice(&color);
    }
}
