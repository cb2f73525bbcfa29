//! Signal primitives and voice construction
//!
//! Contains noise buffers, filters, oscillators, gain envelopes and the
//! voices assembled from them.

mod builder;
mod envelope;
mod filter;
mod noise;
mod oscillator;
mod voice;

pub use builder::{noise_voice, schedule_burst, schedule_tone, Sustain, BURST_ATTACK};
pub use envelope::{apply_envelope, Breakpoint, Envelope, EnvelopeBuilder, Ramp, EXP_FLOOR};
pub use filter::{apply_filter, Filter, FilterSettings, FilterType, BUTTERWORTH_Q};
pub use noise::{make_noise_buffer, NoiseBuffer};
pub use oscillator::{Oscillator, Waveform};
pub use voice::{ActiveVoice, Source, Voice, MAX_VOICE_DURATION};
