use std::time::Duration;

use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use tracing::{debug, warn};

use crate::error::RuntimeError;

pub const BEEP_SAMPLE_RATE: u32 = 22_050;
/// Level the envelope decays to by the end of a tone.
const ENVELOPE_FLOOR: f32 = 0.0001;

/// A short square-wave cue with an exponential decay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration: Duration,
    pub gain: f32,
}

impl Tone {
    /// The cue played when a tap schedules an advance.
    pub const ADVANCE_CUE: Tone = Tone {
        frequency_hz: 660.0,
        duration: Duration::from_millis(120),
        gain: 0.2,
    };
}

/// Audio trait for runtime playback backends.
pub trait Audio {
    fn play_tone(&mut self, tone: Tone);
}

impl<T: Audio + ?Sized> Audio for Box<T> {
    fn play_tone(&mut self, tone: Tone) {
        (**self).play_tone(tone);
    }
}

/// Synthesized mono samples of a [`Tone`].
#[derive(Clone, Debug)]
pub struct SquareBeep {
    tone: Tone,
    index: u32,
    total: u32,
}

impl SquareBeep {
    pub fn new(tone: Tone) -> Self {
        let total = (tone.duration.as_secs_f32() * BEEP_SAMPLE_RATE as f32).round() as u32;
        Self {
            tone,
            index: 0,
            total,
        }
    }

    pub fn len(&self) -> usize {
        (self.total - self.index) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.index >= self.total
    }

    fn envelope(&self, t: f32) -> f32 {
        let span = self.tone.duration.as_secs_f32();
        if self.tone.gain <= 0.0 || span <= 0.0 {
            return 0.0;
        }
        let ratio = (ENVELOPE_FLOOR / self.tone.gain).min(1.0);
        self.tone.gain * ratio.powf(t / span)
    }
}

impl Iterator for SquareBeep {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.is_empty() {
            return None;
        }
        let t = self.index as f32 / BEEP_SAMPLE_RATE as f32;
        let phase = (t * self.tone.frequency_hz).fract();
        let level = if phase < 0.5 { 1.0 } else { -1.0 };
        self.index += 1;
        Some(level * self.envelope(t))
    }
}

impl Source for SquareBeep {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.len())
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        BEEP_SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(self.tone.duration)
    }
}

/// Audio backend implementation using `rodio`.
///
/// Playback runs on rodio's output thread; each tone gets a detached sink.
pub struct RodioBackend {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
}

impl RodioBackend {
    pub fn new() -> Result<Self, RuntimeError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| RuntimeError::Audio(e.to_string()))?;
        Ok(Self {
            _stream: stream,
            stream_handle,
        })
    }
}

impl Audio for RodioBackend {
    fn play_tone(&mut self, tone: Tone) {
        let sink = match Sink::try_new(&self.stream_handle) {
            Ok(sink) => sink,
            Err(e) => {
                warn!("failed to create tone sink: {e}");
                return;
            }
        };
        sink.append(SquareBeep::new(tone));
        sink.detach();
    }
}

/// No-op audio backend for environments where sound output is disabled/unavailable.
#[derive(Default)]
pub struct SilentAudio;

impl Audio for SilentAudio {
    fn play_tone(&mut self, tone: Tone) {
        debug!(frequency = tone.frequency_hz, "tone skipped (silent audio)");
    }
}

/// Rodio when an output device exists, silence otherwise.
pub fn default_audio(mute: bool) -> Box<dyn Audio> {
    if mute {
        return Box::new(SilentAudio);
    }
    match RodioBackend::new() {
        Ok(backend) => {
            debug!("audio: using rodio backend");
            Box::new(backend)
        }
        Err(e) => {
            warn!("{e}; continuing without sound");
            Box::new(SilentAudio)
        }
    }
}
