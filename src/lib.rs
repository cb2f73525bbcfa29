//! Rattle - procedural sound effects
//!
//! Synthesizes percussive and tonal effects from noise and oscillators
//! with time-scheduled gain envelopes. No audio assets are loaded.

pub mod config;
pub mod effects;
pub mod engine;
pub mod error;
pub mod synth;

pub use config::RattleConfig;
pub use effects::Effect;
pub use engine::{RealtimeEngine, SoundEngine};
pub use error::{Result, SfxError};
