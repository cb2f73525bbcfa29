//! Gain automation envelopes
//!
//! An envelope is an ordered list of breakpoints relative to the voice
//! start. A `Set` breakpoint jumps to its gain and holds it; `Linear` and
//! `Exponential` breakpoints ramp from the previous breakpoint to their own
//! target. The last gain is held after the final breakpoint.

use crate::error::{Result, SfxError};

/// Smallest target an exponential ramp may approach
pub const EXP_FLOOR: f64 = 0.001;

/// How a breakpoint reaches its target gain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ramp {
    /// Jump to the target at the breakpoint time
    Set,
    /// Straight-line interpolation from the previous breakpoint
    Linear,
    /// Exponential approach from the previous breakpoint
    Exponential,
}

/// A single point on a gain curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    /// Seconds after the voice start
    pub time: f64,
    /// Gain reached at `time`
    pub gain: f64,
    pub ramp: Ramp,
}

impl Breakpoint {
    pub fn new(time: f64, gain: f64, ramp: Ramp) -> Self {
        Self { time, gain, ramp }
    }
}

/// A validated gain curve
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    points: Vec<Breakpoint>,
}

impl Envelope {
    /// Validate and wrap a list of breakpoints
    ///
    /// Rejects empty curves, curves that do not open with an explicit
    /// `Set`, non-increasing times, and exponential ramps touching zero.
    pub fn new(points: Vec<Breakpoint>) -> Result<Self> {
        let first = points
            .first()
            .ok_or_else(|| SfxError::InvalidEnvelope("no breakpoints".into()))?;

        if first.ramp != Ramp::Set {
            return Err(SfxError::InvalidEnvelope(
                "first breakpoint must set the gain explicitly".into(),
            ));
        }
        if !first.time.is_finite() || first.time < 0.0 {
            return Err(SfxError::InvalidEnvelope(format!(
                "first breakpoint at invalid time {}",
                first.time
            )));
        }

        for point in &points {
            if !point.gain.is_finite() {
                return Err(SfxError::InvalidEnvelope(format!(
                    "non-finite gain at {}s",
                    point.time
                )));
            }
        }

        for pair in points.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if !next.time.is_finite() || next.time <= prev.time {
                return Err(SfxError::InvalidEnvelope(format!(
                    "breakpoint times must strictly increase ({} then {})",
                    prev.time, next.time
                )));
            }
            if next.ramp == Ramp::Exponential && (prev.gain <= 0.0 || next.gain <= 0.0) {
                return Err(SfxError::InvalidEnvelope(format!(
                    "exponential ramp from {} to {} must stay above zero",
                    prev.gain, next.gain
                )));
            }
        }

        Ok(Self { points })
    }

    /// Start building a curve that sets `gain` at time zero
    pub fn starting_at(gain: f64) -> EnvelopeBuilder {
        EnvelopeBuilder {
            points: vec![Breakpoint::new(0.0, gain, Ramp::Set)],
        }
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.points
    }

    /// Time of the final breakpoint
    pub fn end_time(&self) -> f64 {
        self.points.last().map(|p| p.time).unwrap_or(0.0)
    }

    /// Highest gain anywhere on the curve
    pub fn peak(&self) -> f64 {
        self.points.iter().map(|p| p.gain).fold(0.0, f64::max)
    }

    /// Gain at `t` seconds after the voice start
    pub fn gain_at(&self, t: f64) -> f64 {
        // Index of the first breakpoint strictly after t
        let next = self.points.partition_point(|p| p.time <= t);
        if next == 0 {
            return 0.0;
        }

        let prev = self.points[next - 1];
        match self.points.get(next) {
            Some(target) if target.ramp != Ramp::Set => interpolate(&prev, target, t),
            _ => prev.gain,
        }
    }
}

fn interpolate(from: &Breakpoint, to: &Breakpoint, t: f64) -> f64 {
    let progress = (t - from.time) / (to.time - from.time);
    match to.ramp {
        Ramp::Linear => from.gain + (to.gain - from.gain) * progress,
        Ramp::Exponential => from.gain * (to.gain / from.gain).powf(progress),
        Ramp::Set => from.gain,
    }
}

/// Fluent construction of an `Envelope`
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    points: Vec<Breakpoint>,
}

impl EnvelopeBuilder {
    /// Jump to `gain` at `time`
    pub fn set(mut self, gain: f64, time: f64) -> Self {
        self.points.push(Breakpoint::new(time, gain, Ramp::Set));
        self
    }

    /// Ramp linearly to `gain`, arriving at `time`
    pub fn linear_to(mut self, gain: f64, time: f64) -> Self {
        self.points.push(Breakpoint::new(time, gain, Ramp::Linear));
        self
    }

    /// Ramp exponentially to `gain`, arriving at `time`
    pub fn exponential_to(mut self, gain: f64, time: f64) -> Self {
        self.points.push(Breakpoint::new(time, gain, Ramp::Exponential));
        self
    }

    pub fn build(self) -> Result<Envelope> {
        Envelope::new(self.points)
    }
}

/// Scale a rendered signal in place by the envelope's gain curve
pub fn apply_envelope(signal: &mut [f64], envelope: &Envelope, sample_rate: f64) {
    for (i, sample) in signal.iter_mut().enumerate() {
        *sample *= envelope.gain_at(i as f64 / sample_rate);
    }
}
