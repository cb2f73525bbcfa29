//! Biquad filter stage
//!
//! Bandpass and highpass biquads whose parameters are fixed when the
//! voice is scheduled.

use std::f64::consts::PI;

/// Butterworth Q, used where only a cutoff is given
pub const BUTTERWORTH_Q: f64 = 0.707;

/// Filter applied to a voice's source
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterSettings {
    /// Pass the source through untouched
    None,
    /// Bandpass around a center frequency with resonance `q`
    BandPass { frequency: f64, q: f64 },
    /// Highpass above a cutoff frequency
    HighPass { frequency: f64 },
}

impl FilterSettings {
    /// Center or cutoff frequency, if filtered
    pub fn frequency(&self) -> Option<f64> {
        match *self {
            FilterSettings::None => None,
            FilterSettings::BandPass { frequency, .. } | FilterSettings::HighPass { frequency } => {
                Some(frequency)
            }
        }
    }
}

/// Biquad response shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterType {
    HighPass,
    BandPass,
}

/// Biquad filter coefficients
#[derive(Debug, Clone, Copy)]
struct Coefficients {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

/// Biquad filter for audio processing
#[derive(Debug, Clone)]
pub struct Filter {
    filter_type: FilterType,
    sample_rate: f64,
    cutoff: f64,
    resonance: f64, // Q factor

    coeffs: Coefficients,

    // Filter state (Direct Form II transposed)
    z1: f64,
    z2: f64,
}

impl Filter {
    /// Create a filter with the given shape, frequency and Q
    pub fn new(sample_rate: f64, filter_type: FilterType, cutoff: f64, resonance: f64) -> Self {
        let mut filter = Self {
            filter_type,
            sample_rate,
            cutoff: clamp_cutoff(cutoff, sample_rate),
            resonance: clamp_resonance(resonance),
            coeffs: Coefficients {
                b0: 1.0,
                b1: 0.0,
                b2: 0.0,
                a1: 0.0,
                a2: 0.0,
            },
            z1: 0.0,
            z2: 0.0,
        };
        filter.calculate_coefficients();
        filter
    }

    /// Build the filter described by `settings`, or `None` for an unfiltered voice
    pub fn from_settings(settings: &FilterSettings, sample_rate: f64) -> Option<Self> {
        match *settings {
            FilterSettings::None => None,
            FilterSettings::BandPass { frequency, q } => {
                Some(Self::new(sample_rate, FilterType::BandPass, frequency, q))
            }
            FilterSettings::HighPass { frequency } => Some(Self::new(
                sample_rate,
                FilterType::HighPass,
                frequency,
                BUTTERWORTH_Q,
            )),
        }
    }

    /// Get the response shape
    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    /// Get cutoff (or center) frequency after clamping
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Get resonance after clamping
    pub fn resonance(&self) -> f64 {
        self.resonance
    }

    /// Reset filter state (clear history)
    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }

    fn calculate_coefficients(&mut self) {
        let omega = 2.0 * PI * self.cutoff / self.sample_rate;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / (2.0 * self.resonance);

        let (b0, b1, b2) = match self.filter_type {
            FilterType::HighPass => {
                let b0 = (1.0 + cos_omega) / 2.0;
                (b0, -(1.0 + cos_omega), b0)
            }
            // Constant 0 dB peak gain
            FilterType::BandPass => (alpha, 0.0, -alpha),
        };
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        self.coeffs = Coefficients {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        };
    }

    /// Process a single sample through the filter
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.coeffs.b0 * input + self.z1;

        self.z1 = self.coeffs.b1 * input - self.coeffs.a1 * output + self.z2;
        self.z2 = self.coeffs.b2 * input - self.coeffs.a2 * output;

        output
    }

    /// Process a buffer of samples in place
    pub fn process_buffer(&mut self, buffer: &mut [f64]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }
}

/// Wrap a rendered signal with the filter described by `settings`
pub fn apply_filter(signal: &mut [f64], settings: &FilterSettings, sample_rate: f64) {
    if let Some(mut filter) = Filter::from_settings(settings, sample_rate) {
        filter.process_buffer(signal);
    }
}

fn clamp_cutoff(hz: f64, sample_rate: f64) -> f64 {
    // 20 Hz to Nyquist minus margin
    hz.clamp(20.0, sample_rate * 0.45)
}

fn clamp_resonance(q: f64) -> f64 {
    q.clamp(0.1, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, i: usize) -> f64 {
        (2.0 * PI * freq * i as f64 / 44100.0).sin()
    }

    fn settled_peak(filter: &mut Filter, freq: f64) -> f64 {
        let mut peak = 0.0f64;
        for i in 0..8820 {
            let output = filter.process(sine(freq, i));
            if i > 4410 {
                peak = peak.max(output.abs());
            }
        }
        peak
    }

    #[test]
    fn test_from_settings() {
        assert!(Filter::from_settings(&FilterSettings::None, 44100.0).is_none());

        let band = Filter::from_settings(
            &FilterSettings::BandPass {
                frequency: 180.0,
                q: 1.5,
            },
            44100.0,
        )
        .unwrap();
        assert_eq!(band.filter_type(), FilterType::BandPass);
        assert_eq!(band.cutoff(), 180.0);
        assert_eq!(band.resonance(), 1.5);

        let high = Filter::from_settings(&FilterSettings::HighPass { frequency: 4500.0 }, 44100.0).unwrap();
        assert_eq!(high.filter_type(), FilterType::HighPass);
        assert!((high.resonance() - BUTTERWORTH_Q).abs() < 1e-12);
    }

    #[test]
    fn test_clamping() {
        let low = Filter::new(44100.0, FilterType::BandPass, 5.0, 0.01);
        assert_eq!(low.cutoff(), 20.0);
        assert_eq!(low.resonance(), 0.1);

        let high = Filter::new(44100.0, FilterType::BandPass, 30000.0, 500.0);
        assert!(high.cutoff() < 44100.0 * 0.5);
        assert_eq!(high.resonance(), 100.0);

        // Stick bursts use a narrow Q of 25
        let stick = Filter::new(44100.0, FilterType::BandPass, 2000.0, 25.0);
        assert_eq!(stick.resonance(), 25.0);
    }

    #[test]
    fn test_bandpass_passes_center() {
        let mut filter = Filter::new(44100.0, FilterType::BandPass, 1000.0, 2.0);
        let peak = settled_peak(&mut filter, 1000.0);
        assert!(peak > 0.9, "Expected passthrough at center, got {}", peak);
    }

    #[test]
    fn test_bandpass_rejects_far_frequencies() {
        let mut filter = Filter::new(44100.0, FilterType::BandPass, 2000.0, 25.0);
        let peak = settled_peak(&mut filter, 200.0);
        assert!(peak < 0.05, "Expected attenuation, got {}", peak);
    }

    #[test]
    fn test_highpass_filter() {
        let mut filter = Filter::new(44100.0, FilterType::HighPass, 4500.0, BUTTERWORTH_Q);
        let low = settled_peak(&mut filter, 200.0);
        assert!(low < 0.05, "Expected attenuation, got {}", low);

        filter.reset();
        let high = settled_peak(&mut filter, 12000.0);
        assert!(high > 0.8, "Expected passthrough, got {}", high);
    }

    #[test]
    fn test_filter_reset() {
        let mut filter = Filter::new(44100.0, FilterType::BandPass, 1000.0, 1.0);

        for _ in 0..100 {
            filter.process(1.0);
        }

        filter.reset();

        let output = filter.process(0.0);
        assert!(output.abs() < 0.001, "Expected near-zero after reset, got {}", output);
    }

    #[test]
    fn test_apply_filter_none_is_identity() {
        let mut buffer = vec![0.5, -0.25, 1.0];
        apply_filter(&mut buffer, &FilterSettings::None, 44100.0);
        assert_eq!(buffer, vec![0.5, -0.25, 1.0]);
    }

    #[test]
    fn test_apply_filter_highpass_blocks_dc() {
        let mut buffer = vec![1.0; 4410];
        apply_filter(&mut buffer, &FilterSettings::HighPass { frequency: 4500.0 }, 44100.0);
        assert!(buffer[4409].abs() < 0.001);
    }
}
