use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use std::f32::consts::TAU;
use std::io::Write;
use tracing::{debug, warn};

/// Audible cue for auditory trials
pub trait AudioCue {
    fn play(&mut self);
    fn stop(&mut self);
}

const BELL_FREQS_HZ: [f32; 2] = [800.0, 1_000.0];
const BELL_PEAK: f32 = 0.3;
const BELL_FLOOR: f32 = 0.01;
const BELL_ATTACK_S: f32 = 0.01;
const BELL_DURATION_S: f32 = 0.5;

/// Two-tone bell: 800 Hz and 1000 Hz mixed, 10 ms linear attack to the peak
/// gain, then exponential decay to the floor gain at 0.5 s.
#[derive(Debug, Clone)]
pub struct BellSynth {
    sample_rate: f32,
    position: usize,
}

impl BellSynth {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate as f32,
            position: 0,
        }
    }

    pub fn total_samples(&self) -> usize {
        (BELL_DURATION_S * self.sample_rate) as usize
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.total_samples()
    }

    /// Gain at `t` seconds after onset.
    pub fn envelope(t: f32) -> f32 {
        if !(0.0..BELL_DURATION_S).contains(&t) {
            0.0
        } else if t < BELL_ATTACK_S {
            BELL_PEAK * t / BELL_ATTACK_S
        } else {
            let progress = (t - BELL_ATTACK_S) / (BELL_DURATION_S - BELL_ATTACK_S);
            BELL_PEAK * (BELL_FLOOR / BELL_PEAK).powf(progress)
        }
    }

    pub fn next_sample(&mut self) -> f32 {
        let t = self.position as f32 / self.sample_rate;
        self.position = self.position.saturating_add(1);
        let gain = Self::envelope(t);
        if gain == 0.0 {
            return 0.0;
        }
        let mix: f32 = BELL_FREQS_HZ.iter().map(|f| (TAU * f * t).sin()).sum();
        mix / BELL_FREQS_HZ.len() as f32 * gain
    }
}

/// Plays the bell on the default output device. Falls back to the terminal
/// bell when no device or stream is available.
pub struct CpalCue {
    output: Option<(cpal::Device, cpal::SupportedStreamConfig)>,
    stream: Option<cpal::Stream>,
}

impl CpalCue {
    pub fn open_default() -> Self {
        let host = cpal::default_host();
        let output = match host.default_output_device() {
            Some(device) => match device.default_output_config() {
                Ok(config) => {
                    debug!(
                        device = %device.name().unwrap_or_default(),
                        sample_rate = config.sample_rate().0,
                        channels = config.channels(),
                        "audio output ready"
                    );
                    Some((device, config))
                }
                Err(e) => {
                    warn!(error = %e, "no usable audio output config, using terminal bell");
                    None
                }
            },
            None => {
                warn!("no audio output device, using terminal bell");
                None
            }
        };
        Self {
            output,
            stream: None,
        }
    }

    fn start_stream(&self) -> Option<cpal::Stream> {
        let (device, supported) = self.output.as_ref()?;
        let config = supported.config();
        let synth = BellSynth::new(config.sample_rate.0);
        let built = match supported.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(device, &config, synth),
            cpal::SampleFormat::I16 => build_stream::<i16>(device, &config, synth),
            cpal::SampleFormat::U16 => build_stream::<u16>(device, &config, synth),
            other => {
                warn!(format = ?other, "unsupported sample format");
                return None;
            }
        };
        let stream = match built {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "failed to build audio stream");
                return None;
            }
        };
        if let Err(e) = stream.play() {
            warn!(error = %e, "failed to start audio stream");
            return None;
        }
        Some(stream)
    }
}

impl AudioCue for CpalCue {
    fn play(&mut self) {
        self.stop();
        self.stream = self.start_stream();
        if self.stream.is_none() {
            ring_terminal_bell();
        }
    }

    fn stop(&mut self) {
        self.stream = None;
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut synth: BellSynth,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            for frame in data.chunks_mut(channels) {
                let value = T::from_sample(synth.next_sample());
                for sample in frame {
                    *sample = value;
                }
            }
        },
        |e| warn!(error = %e, "audio stream error"),
        None,
    )
}

fn ring_terminal_bell() {
    let mut out = std::io::stdout().lock();
    if let Err(e) = out.write_all(b"\x07").and_then(|_| out.flush()) {
        warn!(error = %e, "failed to ring terminal bell");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_attack_and_decay() {
        assert_eq!(BellSynth::envelope(0.0), 0.0);
        assert!((BellSynth::envelope(0.005) - 0.15).abs() < 1e-4);
        assert!((BellSynth::envelope(BELL_ATTACK_S) - BELL_PEAK).abs() < 1e-4);
        assert!(BellSynth::envelope(0.2) < BELL_PEAK);
        assert!(BellSynth::envelope(0.4) < BellSynth::envelope(0.2));
        assert!((BellSynth::envelope(0.499_999) - BELL_FLOOR).abs() < 1e-3);
        assert_eq!(BellSynth::envelope(BELL_DURATION_S), 0.0);
        assert_eq!(BellSynth::envelope(-0.1), 0.0);
    }

    #[test]
    fn bell_is_bounded_and_ends_silent() {
        let mut synth = BellSynth::new(48_000);
        assert_eq!(synth.total_samples(), 24_000);

        let samples: Vec<f32> = (0..synth.total_samples())
            .map(|_| synth.next_sample())
            .collect();
        assert!(samples.iter().all(|s| s.abs() <= BELL_PEAK + 1e-6));
        assert!(samples.iter().any(|s| s.abs() > 0.1));
        assert!(synth.is_finished());
        assert_eq!(synth.next_sample(), 0.0);
    }
}
