//! Configuration loading and validation

mod schema;

pub use schema::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Example configuration written by `rattle init`
pub const EXAMPLE_CONFIG: &str = r#"# rattle configuration

audio:
  # Sample rate used for offline renders
  sample_rate: 44100
  # Fixed device buffer in frames; omit for the device default
  # buffer_size: 512
  # Output device name; omit for the default device
  # device: "Built-in Output"

master:
  volume: 0.8
  enabled: true
"#;

/// Load configuration from a YAML file
pub fn load_config(path: &Path) -> Result<RattleConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {:?}", path))?;
    let config: RattleConfig = serde_yaml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}
