//! Short tonal cues

use crate::engine::{stagger, Schedule};
use crate::error::Result;
use crate::synth::{schedule_tone, Sustain, Waveform};

/// G5 then C6
pub const REVEAL_NOTES: [f64; 2] = [783.99, 1046.50];
const REVEAL_STEP: f64 = 0.15;
const REVEAL_GAIN: f64 = 0.15;
const REVEAL_ATTACK: f64 = 0.05;
const REVEAL_DECAY: f64 = 0.3;
const REVEAL_LENGTH: f64 = 0.4;

/// C5 E5 G5 C6 arpeggio
pub const SUCCESS_NOTES: [f64; 4] = [523.25, 659.25, 783.99, 1046.50];
const SUCCESS_STEP: f64 = 0.1;
const SUCCESS_GAIN: f64 = 0.1;
const SUCCESS_DECAY: f64 = 0.4;
const SUCCESS_LENGTH: f64 = 0.5;

/// Bright two-note sine jingle
pub fn reveal() -> Result<Schedule> {
    stagger(REVEAL_STEP, REVEAL_NOTES.len())
        .zip(REVEAL_NOTES)
        .map(|(start, frequency)| {
            schedule_tone(
                start,
                REVEAL_LENGTH,
                frequency,
                Waveform::Sine,
                REVEAL_GAIN,
                Sustain::Swell {
                    attack: REVEAL_ATTACK,
                    decay: REVEAL_DECAY,
                },
            )
        })
        .collect()
}

/// Rising triangle arpeggio, each note struck then decaying
pub fn success() -> Result<Schedule> {
    stagger(SUCCESS_STEP, SUCCESS_NOTES.len())
        .zip(SUCCESS_NOTES)
        .map(|(start, frequency)| {
            schedule_tone(
                start,
                SUCCESS_LENGTH,
                frequency,
                Waveform::Triangle,
                SUCCESS_GAIN,
                Sustain::Struck {
                    decay: SUCCESS_DECAY,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::Voice;

    fn assert_close(got: &[f64], want: &[f64]) {
        assert_eq!(got.len(), want.len());
        for (g, w) in got.iter().zip(want) {
            assert!((g - w).abs() < 1e-9, "got {:?} want {:?}", got, want);
        }
    }

    #[test]
    fn test_reveal() {
        let schedule = reveal().unwrap();
        let voices = schedule.voices();

        let frequencies: Vec<f64> = voices.iter().filter_map(Voice::frequency).collect();
        let starts: Vec<f64> = voices.iter().map(Voice::start).collect();
        assert_close(&frequencies, &[783.99, 1046.50]);
        assert_close(&starts, &[0.0, 0.15]);

        for voice in voices {
            assert!((voice.duration() - 0.4).abs() < 1e-9);
            assert_eq!(voice.gain_at(voice.start()), 0.0);
            assert!((voice.envelope().peak() - 0.15).abs() < 1e-12);
        }
    }

    #[test]
    fn test_success() {
        let schedule = success().unwrap();
        let voices = schedule.voices();

        let frequencies: Vec<f64> = voices.iter().filter_map(Voice::frequency).collect();
        let starts: Vec<f64> = voices.iter().map(Voice::start).collect();
        assert_close(&frequencies, &[523.25, 659.25, 783.99, 1046.50]);
        assert_close(&starts, &[0.0, 0.1, 0.2, 0.3]);

        for voice in voices {
            // Struck: full gain from the first instant
            assert_eq!(voice.gain_at(voice.start()), 0.1);
            assert!((voice.duration() - 0.5).abs() < 1e-9);
        }
    }
}
