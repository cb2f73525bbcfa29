//! Noise buffer generation
//!
//! Every burst gets its own freshly generated buffer so overlapping
//! bursts stay decorrelated.

use rand::Rng;
use std::sync::Arc;

/// An immutable block of uniform white noise in [-1, 1]
#[derive(Debug, Clone)]
pub struct NoiseBuffer {
    samples: Arc<[f64]>,
    sample_rate: f64,
}

impl NoiseBuffer {
    /// Generate `sample_rate * duration` fresh samples
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, sample_rate: f64, duration: f64) -> Self {
        let len = frame_count(sample_rate, duration);
        let samples: Arc<[f64]> = (0..len).map(|_| rng.gen_range(-1.0..=1.0)).collect();

        Self {
            samples,
            sample_rate,
        }
    }

    /// Number of samples in the buffer
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the buffer holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample rate the buffer was generated for
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Length of the buffer in seconds
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }

    /// Raw sample data
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Sample at `index`, or silence past the end of the buffer
    pub fn sample(&self, index: usize) -> f64 {
        self.samples.get(index).copied().unwrap_or(0.0)
    }
}

/// Convenience wrapper matching the primitive's usual name
pub fn make_noise_buffer<R: Rng + ?Sized>(
    rng: &mut R,
    sample_rate: f64,
    duration: f64,
) -> NoiseBuffer {
    NoiseBuffer::generate(rng, sample_rate, duration)
}

fn frame_count(sample_rate: f64, duration: f64) -> usize {
    let frames = (sample_rate * duration).round();
    if frames.is_finite() && frames > 0.0 {
        frames as usize
    } else {
        0
    }
}
