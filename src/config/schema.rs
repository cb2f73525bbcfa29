//! Configuration schema definitions

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Main configuration for the sound engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RattleConfig {
    /// Audio output settings
    #[serde(default)]
    pub audio: AudioConfig,

    /// Master settings (volume, mute)
    #[serde(default)]
    pub master: MasterConfig,
}

impl RattleConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.audio.sample_rate < 8000 || self.audio.sample_rate > 192000 {
            bail!("Sample rate must be between 8000 and 192000");
        }
        if let Some(frames) = self.audio.buffer_size {
            if !(64..=8192).contains(&frames) {
                bail!("Buffer size must be between 64 and 8192");
            }
        }
        if !(0.0..=1.0).contains(&self.master.volume) {
            bail!("Master volume must be between 0.0 and 1.0");
        }

        Ok(())
    }
}

/// Audio output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate in Hz for offline rendering (default: 44100)
    ///
    /// Real-time output always runs at the device's own rate.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Fixed device buffer size in frames (None = device default)
    #[serde(default)]
    pub buffer_size: Option<u32>,

    /// Output device name (None = default device)
    #[serde(default)]
    pub device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            buffer_size: None,
            device: None,
        }
    }
}

fn default_sample_rate() -> u32 { 44100 }

/// Master settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterConfig {
    /// Master volume 0.0-1.0 (default: 0.8)
    #[serde(default = "default_volume")]
    pub volume: f32,

    /// Whether sound starts enabled (default: true)
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            enabled: default_enabled(),
        }
    }
}

fn default_volume() -> f32 { 0.8 }
fn default_enabled() -> bool { true }
