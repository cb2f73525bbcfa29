//! CLI interface for Rattle

use clap::{Parser, Subcommand, ValueEnum};
use rattle::Effect;
use std::path::PathBuf;

/// Procedural sound effects from noise and oscillators
#[derive(Parser)]
#[command(name = "rattle")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play an effect on the audio output
    Play {
        /// Effect to play
        #[arg(value_enum)]
        effect: EffectArg,

        /// Configuration file path (defaults apply if missing)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Render an effect to a WAV file
    Render {
        /// Effect to render
        #[arg(value_enum)]
        effect: EffectArg,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Seconds of silence to append
        #[arg(short, long, default_value = "0.25")]
        tail: f64,

        /// Configuration file path (defaults apply if missing)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List available audio output devices
    Devices,

    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "rattle.yaml")]
        config: PathBuf,
    },

    /// Generate an example configuration file
    Init,
}

/// Effect names accepted on the command line
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum EffectArg {
    Shake,
    Reveal,
    Success,
    Celebration,
}

impl From<EffectArg> for Effect {
    fn from(arg: EffectArg) -> Self {
        match arg {
            EffectArg::Shake => Effect::Shake,
            EffectArg::Reveal => Effect::Reveal,
            EffectArg::Success => Effect::Success,
            EffectArg::Celebration => Effect::Celebration,
        }
    }
}
