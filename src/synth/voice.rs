//! One-shot voices
//!
//! A `Voice` describes a single scheduled sound: its source, filter,
//! gain curve and start/stop times. The renderer turns it into an
//! `ActiveVoice` which carries the per-sample state.

use super::{Envelope, Filter, FilterSettings, NoiseBuffer, Oscillator, Waveform};
use crate::error::{Result, SfxError};

/// Longest a single voice may sound, in seconds
pub const MAX_VOICE_DURATION: f64 = 60.0;

/// What a voice plays before filtering
#[derive(Debug, Clone)]
pub enum Source {
    /// A pre-generated noise buffer, played once from the start
    Noise(NoiseBuffer),
    /// A periodic oscillator at a fixed frequency
    Tone { frequency: f64, waveform: Waveform },
}

/// A transient, self-terminating sound event
#[derive(Debug, Clone)]
pub struct Voice {
    source: Source,
    filter: FilterSettings,
    envelope: Envelope,
    start: f64,
    stop: f64,
}

impl Voice {
    /// Create a voice playing from `start` for `duration` seconds
    pub fn new(
        source: Source,
        filter: FilterSettings,
        envelope: Envelope,
        start: f64,
        duration: f64,
    ) -> Result<Self> {
        Self::check_timing(start, duration)?;

        Ok(Self {
            source,
            filter,
            envelope,
            start,
            stop: start + duration,
        })
    }

    /// Validate a start time and duration before building a voice
    ///
    /// Sources that allocate per voice (noise buffers) call this first so a
    /// bad duration never reaches the allocator.
    pub fn check_timing(start: f64, duration: f64) -> Result<()> {
        if !start.is_finite() || start < 0.0 {
            return Err(SfxError::InvalidVoice(format!("start time {}", start)));
        }
        if !duration.is_finite() || duration <= 0.0 || duration > MAX_VOICE_DURATION {
            return Err(SfxError::InvalidVoice(format!("duration {}", duration)));
        }
        Ok(())
    }

    /// The same voice moved `offset` seconds later
    ///
    /// Fails if the offset is not finite or would move the start before zero.
    pub fn shifted(self, offset: f64) -> Result<Self> {
        if !offset.is_finite() || self.start + offset < 0.0 {
            return Err(SfxError::InvalidVoice(format!("shift by {}", offset)));
        }
        Ok(self.anchored(offset))
    }

    /// Move the voice onto a context clock reading
    pub(crate) fn anchored(mut self, origin: f64) -> Self {
        debug_assert!(origin.is_finite() && origin >= 0.0, "bad clock origin {}", origin);
        self.start += origin;
        self.stop += origin;
        self
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn filter(&self) -> &FilterSettings {
        &self.filter
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Scheduled start time in seconds
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Scheduled stop time in seconds
    pub fn stop(&self) -> f64 {
        self.stop
    }

    pub fn duration(&self) -> f64 {
        self.stop - self.start
    }

    /// Oscillator frequency for tone voices
    pub fn frequency(&self) -> Option<f64> {
        match self.source {
            Source::Tone { frequency, .. } => Some(frequency),
            Source::Noise(_) => None,
        }
    }

    pub fn is_tone(&self) -> bool {
        matches!(self.source, Source::Tone { .. })
    }

    /// Envelope gain at absolute time `t`
    pub fn gain_at(&self, t: f64) -> f64 {
        if t < self.start || t >= self.stop {
            0.0
        } else {
            self.envelope.gain_at(t - self.start)
        }
    }

    /// Prepare the voice for rendering at `sample_rate`
    ///
    /// Start and stop are snapped to whole frames of the renderer's clock.
    pub fn activate(self, sample_rate: f64) -> ActiveVoice {
        let generator = match self.source {
            Source::Noise(buffer) => Generator::Noise(buffer),
            Source::Tone {
                frequency,
                waveform,
            } => Generator::Tone(Oscillator::new(waveform, frequency, sample_rate)),
        };

        ActiveVoice {
            generator,
            filter: Filter::from_settings(&self.filter, sample_rate),
            envelope: self.envelope,
            sample_rate,
            start_frame: to_frame(self.start, sample_rate),
            stop_frame: to_frame(self.stop, sample_rate),
        }
    }
}

fn to_frame(seconds: f64, sample_rate: f64) -> u64 {
    (seconds * sample_rate).round() as u64
}

enum Generator {
    Noise(NoiseBuffer),
    Tone(Oscillator),
}

/// A voice being rendered
pub struct ActiveVoice {
    generator: Generator,
    filter: Option<Filter>,
    envelope: Envelope,
    sample_rate: f64,
    start_frame: u64,
    stop_frame: u64,
}

impl ActiveVoice {
    /// Render the sample at absolute clock position `frame`
    ///
    /// Must be called once per output frame while the voice is sounding
    /// so the oscillator and filter state advance in step with the clock.
    pub fn render(&mut self, frame: u64) -> f64 {
        if frame < self.start_frame || frame >= self.stop_frame {
            return 0.0;
        }
        let elapsed = (frame - self.start_frame) as f64 / self.sample_rate;

        let raw = match &mut self.generator {
            Generator::Noise(buffer) => {
                let index = (elapsed * buffer.sample_rate()).round() as usize;
                buffer.sample(index)
            }
            Generator::Tone(osc) => osc.generate(),
        };

        let filtered = match &mut self.filter {
            Some(filter) => filter.process(raw),
            None => raw,
        };

        filtered * self.envelope.gain_at(elapsed)
    }

    /// Check if the clock has reached the voice's stop frame
    pub fn is_finished(&self, frame: u64) -> bool {
        frame >= self.stop_frame
    }

    /// First frame at which the voice is silent for good
    pub fn stop_frame(&self) -> u64 {
        self.stop_frame
    }

    pub fn stop_time(&self) -> f64 {
        self.stop_frame as f64 / self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::EXP_FLOOR;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn chime_envelope() -> Envelope {
        Envelope::starting_at(0.1)
            .exponential_to(EXP_FLOOR, 0.4)
            .build()
            .unwrap()
    }

    #[test]
    fn test_voice_rejects_bad_timing() {
        let tone = || Source::Tone {
            frequency: 440.0,
            waveform: Waveform::Sine,
        };

        let err = Voice::new(tone(), FilterSettings::None, chime_envelope(), 0.0, 0.0).unwrap_err();
        assert!(matches!(err, SfxError::InvalidVoice(_)));

        assert!(Voice::new(tone(), FilterSettings::None, chime_envelope(), -1.0, 0.5).is_err());
        assert!(Voice::new(tone(), FilterSettings::None, chime_envelope(), f64::NAN, 0.5).is_err());
    }

    #[test]
    fn test_shifted() {
        let voice = Voice::new(
            Source::Tone {
                frequency: 523.25,
                waveform: Waveform::Triangle,
            },
            FilterSettings::None,
            chime_envelope(),
            0.1,
            0.5,
        )
        .unwrap()
        .shifted(2.0)
        .unwrap();

        assert!((voice.start() - 2.1).abs() < 1e-12);
        assert!((voice.stop() - 2.6).abs() < 1e-12);
        assert_eq!(voice.frequency(), Some(523.25));
        assert!(voice.is_tone());
    }

    #[test]
    fn test_tone_renders_only_inside_window() {
        let voice = Voice::new(
            Source::Tone {
                frequency: 1000.0,
                waveform: Waveform::Triangle,
            },
            FilterSettings::None,
            chime_envelope(),
            0.01,
            0.05,
        )
        .unwrap();
        let mut active = voice.activate(1000.0);

        // 0.01 + 0.05 is not exactly 0.06 in floating point
        assert_eq!(active.stop_frame(), 60);
        assert_eq!(active.render(0), 0.0);
        assert!(!active.is_finished(30));
        assert!(!active.is_finished(59));
        assert_eq!(active.render(60), 0.0);
        assert!(active.is_finished(60));
        assert!((active.stop_time() - 0.06).abs() < 1e-12);
    }

    #[test]
    fn test_shift_rejects_bad_offsets() {
        let voice = || {
            Voice::new(
                Source::Tone {
                    frequency: 440.0,
                    waveform: Waveform::Sine,
                },
                FilterSettings::None,
                chime_envelope(),
                0.5,
                0.5,
            )
            .unwrap()
        };

        assert!(matches!(voice().shifted(-1.0), Err(SfxError::InvalidVoice(_))));
        assert!(voice().shifted(f64::NAN).is_err());
        assert!(voice().shifted(f64::INFINITY).is_err());

        // Moving earlier is fine as long as the start stays at or after zero
        let moved = voice().shifted(-0.5).unwrap();
        assert_eq!(moved.start(), 0.0);
    }

    #[test]
    fn test_check_timing_rejects_huge_durations() {
        assert!(Voice::check_timing(0.0, 0.25).is_ok());
        assert!(Voice::check_timing(0.0, MAX_VOICE_DURATION + 1.0).is_err());
        assert!(Voice::check_timing(0.0, 1e300).is_err());
        assert!(Voice::check_timing(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_noise_voice_output_is_filtered_and_shaped() {
        let mut rng = StdRng::seed_from_u64(11);
        let buffer = NoiseBuffer::generate(&mut rng, 44100.0, 0.1);
        let envelope = Envelope::starting_at(0.5).build().unwrap();
        let voice = Voice::new(
            Source::Noise(buffer),
            FilterSettings::BandPass {
                frequency: 2000.0,
                q: 25.0,
            },
            envelope,
            0.0,
            0.1,
        )
        .unwrap();
        let mut active = voice.activate(44100.0);

        let mut peak = 0.0f64;
        for frame in 0..4410 {
            let sample = active.render(frame);
            peak = peak.max(sample.abs());
        }
        assert!(peak > 0.0);
        assert!(peak <= 0.5 + 1e-9, "Envelope gain exceeded: {}", peak);
    }

    #[test]
    fn test_gain_at_absolute_time() {
        let voice = Voice::new(
            Source::Tone {
                frequency: 440.0,
                waveform: Waveform::Sine,
            },
            FilterSettings::None,
            chime_envelope(),
            1.0,
            0.5,
        )
        .unwrap();

        assert_eq!(voice.gain_at(0.5), 0.0);
        assert_eq!(voice.gain_at(1.0), 0.1);
        assert!((voice.gain_at(1.4) - EXP_FLOOR).abs() < 1e-12);
        assert_eq!(voice.gain_at(1.5), 0.0);
    }
}
