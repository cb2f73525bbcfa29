//! Voice builders
//!
//! Assemble noise, filter and envelope primitives into single voices.
//! Times are relative to whatever origin the caller schedules against.

use rand::Rng;

use super::{Envelope, FilterSettings, NoiseBuffer, Source, Voice, Waveform, EXP_FLOOR};
use crate::error::Result;

/// Attack time of a percussive noise burst
pub const BURST_ATTACK: f64 = 0.001;

/// Envelope style for tonal voices
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sustain {
    /// Instant-on at the peak, then exponential decay until `decay`
    Struck { decay: f64 },
    /// Linear rise over `attack`, then exponential decay until `decay`
    Swell { attack: f64, decay: f64 },
}

/// A bandpassed noise burst with a randomized center frequency
///
/// The center is drawn uniformly from `band`; the envelope rises to
/// `peak_gain` in 1 ms and decays exponentially to the floor at the
/// stop time.
pub fn schedule_burst<R: Rng + ?Sized>(
    rng: &mut R,
    sample_rate: f64,
    start: f64,
    duration: f64,
    band: (f64, f64),
    q: f64,
    peak_gain: f64,
) -> Result<Voice> {
    let (low, high) = band;
    let frequency = if high > low {
        rng.gen_range(low..high)
    } else {
        low
    };

    noise_voice(
        rng,
        sample_rate,
        start,
        duration,
        FilterSettings::BandPass { frequency, q },
        peak_gain,
        BURST_ATTACK,
    )
}

/// A noise voice with an explicit filter and attack time
pub fn noise_voice<R: Rng + ?Sized>(
    rng: &mut R,
    sample_rate: f64,
    start: f64,
    duration: f64,
    filter: FilterSettings,
    peak_gain: f64,
    attack: f64,
) -> Result<Voice> {
    Voice::check_timing(start, duration)?;
    let envelope = Envelope::starting_at(0.0)
        .linear_to(peak_gain, attack)
        .exponential_to(EXP_FLOOR, duration)
        .build()?;
    let buffer = NoiseBuffer::generate(rng, sample_rate, duration);

    Voice::new(Source::Noise(buffer), filter, envelope, start, duration)
}

/// An oscillator voice at a fixed frequency
pub fn schedule_tone(
    start: f64,
    duration: f64,
    frequency: f64,
    waveform: Waveform,
    peak_gain: f64,
    sustain: Sustain,
) -> Result<Voice> {
    let envelope = match sustain {
        Sustain::Struck { decay } => Envelope::starting_at(peak_gain)
            .exponential_to(EXP_FLOOR, decay)
            .build()?,
        Sustain::Swell { attack, decay } => Envelope::starting_at(0.0)
            .linear_to(peak_gain, attack)
            .exponential_to(EXP_FLOOR, decay)
            .build()?,
    };

    Voice::new(
        Source::Tone {
            frequency,
            waveform,
        },
        FilterSettings::None,
        envelope,
        start,
        duration,
    )
}
