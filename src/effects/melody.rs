//! Celebration tune

use crate::engine::{sequential, Schedule};
use crate::error::Result;
use crate::synth::{schedule_tone, Sustain, Waveform};

/// (frequency Hz, duration seconds) in playing order
pub const CELEBRATION: [(f64, f64); 7] = [
    (523.25, 0.3),
    (587.33, 0.3),
    (659.25, 0.3),
    (783.99, 0.6),
    (880.00, 0.3),
    (783.99, 0.3),
    (659.25, 0.6),
];

const NOTE_GAIN: f64 = 0.08;
const NOTE_ATTACK: f64 = 0.05;

/// The celebration tune as back-to-back triangle notes
pub fn celebration() -> Result<Schedule> {
    tune(&CELEBRATION)
}

/// Play `notes` back to back, each swelling in and decaying over its length
pub fn tune(notes: &[(f64, f64)]) -> Result<Schedule> {
    let durations: Vec<f64> = notes.iter().map(|&(_, d)| d).collect();

    sequential(&durations)
        .into_iter()
        .zip(notes)
        .map(|(start, &(frequency, duration))| {
            schedule_tone(
                start,
                duration,
                frequency,
                Waveform::Triangle,
                NOTE_GAIN,
                Sustain::Swell {
                    attack: NOTE_ATTACK,
                    decay: duration,
                },
            )
        })
        .collect()
}
