//! Shaker rattle
//!
//! Models wooden sticks rattling in a cylinder: each shake layer is a
//! cloud of tiny resonant clicks over a low body thump and a hiss of
//! friction. Three layers of falling intensity make one shake.

use rand::Rng;

use crate::engine::Schedule;
use crate::error::Result;
use crate::synth::{noise_voice, schedule_burst, FilterSettings};

/// (offset seconds, intensity) of each shake layer
pub const LAYERS: [(f64, f64); 3] = [(0.0, 1.0), (0.22, 0.75), (0.45, 0.5)];

/// Stick clicks per layer
pub const STICK_COUNT: usize = 45;

const STICK_SPREAD: f64 = 0.15;
const STICK_MIN_DURATION: f64 = 0.003;
const STICK_DURATION_JITTER: f64 = 0.012;
const STICK_BAND: (f64, f64) = (1200.0, 3700.0);
const STICK_Q: f64 = 25.0;
const STICK_GAIN: f64 = 0.18;

const BODY_FREQUENCY: f64 = 180.0;
const BODY_Q: f64 = 1.5;
const BODY_GAIN: f64 = 0.12;
const BODY_ATTACK: f64 = 0.04;
/// Length of the body thump
pub const BODY_DURATION: f64 = 0.25;

const FRICTION_CUTOFF: f64 = 4500.0;
const FRICTION_GAIN: f64 = 0.03;
const FRICTION_ATTACK: f64 = 0.05;
/// Length of the friction hiss
pub const FRICTION_DURATION: f64 = 0.2;

/// A full shake: three layered rattles
pub fn shake<R: Rng + ?Sized>(rng: &mut R, sample_rate: f64) -> Result<Schedule> {
    let mut schedule = Schedule::new();
    for &(offset, intensity) in &LAYERS {
        schedule.layer(offset, rattle(rng, sample_rate, intensity)?)?;
    }
    Ok(schedule)
}

/// One rattle layer starting at time zero
pub fn rattle<R: Rng + ?Sized>(rng: &mut R, sample_rate: f64, intensity: f64) -> Result<Schedule> {
    let mut schedule = Schedule::new();

    for _ in 0..STICK_COUNT {
        let start = rng.gen_range(0.0..STICK_SPREAD);
        let duration = STICK_MIN_DURATION + rng.gen_range(0.0..STICK_DURATION_JITTER);
        schedule.push(schedule_burst(
            rng,
            sample_rate,
            start,
            duration,
            STICK_BAND,
            STICK_Q,
            STICK_GAIN * intensity,
        )?);
    }

    schedule.push(noise_voice(
        rng,
        sample_rate,
        0.0,
        BODY_DURATION,
        FilterSettings::BandPass {
            frequency: BODY_FREQUENCY,
            q: BODY_Q,
        },
        BODY_GAIN * intensity,
        BODY_ATTACK,
    )?);

    schedule.push(noise_voice(
        rng,
        sample_rate,
        0.0,
        FRICTION_DURATION,
        FilterSettings::HighPass {
            frequency: FRICTION_CUTOFF,
        },
        FRICTION_GAIN * intensity,
        FRICTION_ATTACK,
    )?);

    Ok(schedule)
}
