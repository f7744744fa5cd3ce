//! Sound cues, synthesised with fundsp and played through rodio.

use fundsp::prelude32::*;
use log::{info, warn};
use rodio::{OutputStream, OutputStreamHandle, Sink, buffer::SamplesBuffer};
use thiserror::Error;

use crate::platform::CueSink;
use crate::sim::Cue;

const SAMPLE_RATE: u32 = 44_100;
/// Every cue decays exponentially to this gain by its end.
const TAIL_GAIN: f32 = 0.01;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output: {0}")]
    Stream(#[from] rodio::StreamError),
    #[error("could not start playback: {0}")]
    Play(#[from] rodio::PlayError),
}

/// Waveform of one oscillator segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wave {
    Sine,
    Saw,
    Square,
}

/// A cue as a list of (wave, frequency, seconds) segments plus a gain ramp.
struct Voice {
    segments: &'static [(Wave, f32, f32)],
    gain: f32,
}

fn voice(cue: Cue) -> Voice {
    match cue {
        Cue::Flap => Voice {
            segments: &[(Wave::Sine, 400.0, 0.1)],
            gain: 0.1,
        },
        Cue::Score => Voice {
            segments: &[(Wave::Sine, 800.0, 0.15)],
            gain: 0.15,
        },
        Cue::Hit => Voice {
            segments: &[(Wave::Saw, 150.0, 0.3)],
            gain: 0.2,
        },
        Cue::GameOver => Voice {
            segments: &[
                (Wave::Square, 300.0, 0.1),
                (Wave::Square, 250.0, 0.1),
                (Wave::Square, 200.0, 0.2),
            ],
            gain: 0.1,
        },
    }
}

fn oscillator(wave: Wave, hz: f32) -> Box<dyn AudioUnit> {
    match wave {
        Wave::Sine => Box::new(sine_hz(hz)),
        Wave::Saw => Box::new(saw_hz(hz)),
        Wave::Square => Box::new(square_hz(hz)),
    }
}

/// Render a cue to mono samples at `SAMPLE_RATE`.
pub fn synthesize(cue: Cue) -> Vec<f32> {
    let v = voice(cue);
    let total: f32 = v.segments.iter().map(|s| s.2).sum();
    let total_samples = (total * SAMPLE_RATE as f32) as usize;
    // Per-sample factor so the gain reaches TAIL_GAIN at the last sample
    let decay = (TAIL_GAIN / v.gain).powf(1.0 / Ord::max(total_samples, 1) as f32);

    let mut out = Vec::with_capacity(total_samples);
    let mut gain = v.gain;
    for &(wave, hz, secs) in v.segments {
        let mut osc = oscillator(wave, hz);
        osc.set_sample_rate(SAMPLE_RATE as f64);
        for _ in 0..(secs * SAMPLE_RATE as f32) as usize {
            out.push(osc.get_mono() * gain);
            gain *= decay;
        }
    }
    out
}

/// Plays cues on the default output device.
pub struct Audio {
    // Dropping the stream silences every sink
    _stream: OutputStream,
    handle: OutputStreamHandle,
    enabled: bool,
    volume: f32,
}

impl Audio {
    pub fn open(enabled: bool, volume: f32) -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()?;
        info!("Audio output opened");
        Ok(Self {
            _stream: stream,
            handle,
            enabled,
            volume,
        })
    }

    /// Flip mute. Returns the new enabled state.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        info!("Sound {}", if self.enabled { "on" } else { "muted" });
        self.enabled
    }

    fn try_play(&self, cue: Cue) -> Result<(), AudioError> {
        let sink = Sink::try_new(&self.handle)?;
        sink.set_volume(self.volume);
        sink.append(SamplesBuffer::new(1, SAMPLE_RATE, synthesize(cue)));
        sink.detach();
        Ok(())
    }
}

impl CueSink for Audio {
    fn play(&mut self, cue: Cue) {
        if !self.enabled {
            return;
        }
        if let Err(e) = self.try_play(cue) {
            warn!("Dropped {} cue: {}", cue.as_str(), e);
        }
    }
}

/// Either a live device or nothing, so the game runs on machines without
/// sound hardware.
pub enum Speaker {
    Device(Audio),
    Silent { enabled: bool },
}

impl Speaker {
    pub fn open(enabled: bool, volume: f32) -> Self {
        match Audio::open(enabled, volume) {
            Ok(audio) => Speaker::Device(audio),
            Err(e) => {
                warn!("Running without sound: {}", e);
                Speaker::Silent { enabled }
            }
        }
    }

    pub fn toggle(&mut self) -> bool {
        match self {
            Speaker::Device(audio) => audio.toggle(),
            Speaker::Silent { enabled } => {
                *enabled = !*enabled;
                *enabled
            }
        }
    }
}

impl CueSink for Speaker {
    fn play(&mut self, cue: Cue) {
        if let Speaker::Device(audio) = self {
            audio.play(cue);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_lengths() {
        assert_eq!(synthesize(Cue::Flap).len(), 4410);
        assert_eq!(synthesize(Cue::Hit).len(), 13230);
        let game_over = synthesize(Cue::GameOver).len();
        assert!((17630..=17640).contains(&game_over));
    }

    #[test]
    fn test_cues_decay() {
        for cue in [Cue::Flap, Cue::Score, Cue::Hit, Cue::GameOver] {
            let samples = synthesize(cue);
            let peak = voice(cue).gain;
            assert!(samples.iter().all(|s| s.is_finite() && s.abs() <= peak * 1.2));
            let tail = &samples[samples.len() - 100..];
            assert!(tail.iter().all(|s| s.abs() <= TAIL_GAIN * 1.5));
        }
    }
}
