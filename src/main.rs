//! Rattle - procedural sound effects from noise and oscillators

use anyhow::{bail, Result};
use clap::Parser;
use rattle::config::{self, RattleConfig};
use rattle::engine::{self, OfflineContext, ProcessingContext, Recorder};
use rattle::{Effect, RealtimeEngine, SoundEngine};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

mod cli;

use cli::{Cli, Commands};

/// Longest any effect is allowed to sound
const MAX_EFFECT_SECS: f64 = 10.0;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play { effect, config } => {
            let cfg = load_or_default(config.as_deref())?;
            play(cfg, effect.into())?;
        }

        Commands::Render {
            effect,
            output,
            tail,
            config,
        } => {
            let cfg = load_or_default(config.as_deref())?;
            render(&cfg, effect.into(), &output, tail)?;
        }

        Commands::Devices => {
            println!("Available audio output devices:\n");

            if let Some(name) = engine::default_device_name() {
                println!("Default output: {}\n", name);
            }

            let devices = engine::list_output_devices();
            if devices.is_empty() {
                println!("  (none found)");
            }
            for (name, config) in devices {
                println!(
                    "  - {} ({} Hz, {} ch)",
                    name, config.sample_rate.0, config.channels
                );
            }
        }

        Commands::Check { config: config_path } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    println!("Configuration is valid!");
                    println!("  Sample rate: {} Hz", cfg.audio.sample_rate);
                    match cfg.audio.buffer_size {
                        Some(frames) => println!("  Buffer size: {}", frames),
                        None => println!("  Buffer size: device default"),
                    }
                    println!(
                        "  Device: {}",
                        cfg.audio.device.as_deref().unwrap_or("default")
                    );
                    println!("  Master volume: {:.0}%", cfg.master.volume * 100.0);
                    println!(
                        "  Sound: {}",
                        if cfg.master.enabled { "enabled" } else { "disabled" }
                    );
                }
                Err(e) => {
                    println!("Configuration is invalid: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            let path = "rattle.yaml";
            if Path::new(path).exists() {
                println!("rattle.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, config::EXAMPLE_CONFIG)?;
                println!("Created rattle.yaml with example configuration.");
            }
        }
    }

    Ok(())
}

fn load_or_default(path: Option<&Path>) -> Result<RattleConfig> {
    match path {
        Some(path) => config::load_config(path),
        None => {
            let default = PathBuf::from("rattle.yaml");
            if default.exists() {
                config::load_config(&default)
            } else {
                Ok(RattleConfig::default())
            }
        }
    }
}

fn play(cfg: RattleConfig, effect: Effect) -> Result<()> {
    if !cfg.master.enabled {
        println!("Sound is disabled in the configuration.");
        return Ok(());
    }

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;

    let mut engine = RealtimeEngine::from_config(cfg);
    engine.play_effect(effect);

    let Some(ctx) = engine.context() else {
        bail!("No audio output available");
    };
    info!(?effect, device = ctx.device_name(), "Playing");

    let deadline = Instant::now() + Duration::from_secs_f64(MAX_EFFECT_SECS);
    loop {
        if interrupted.load(Ordering::SeqCst) {
            engine.stop_celebration_music();
            println!("\nStopped.");
            break;
        }

        let remaining = engine.context().map(|c| c.active_voices()).unwrap_or(0);
        if remaining == 0 || Instant::now() >= deadline {
            break;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    // Let the device drain its last buffer
    std::thread::sleep(Duration::from_millis(100));
    Ok(())
}

fn render(cfg: &RattleConfig, effect: Effect, output: &Path, tail: f64) -> Result<()> {
    let sample_rate = cfg.audio.sample_rate as f64;
    let volume = cfg.master.volume as f64;

    let mut engine = SoundEngine::new(move || -> rattle::Result<OfflineContext> {
        Ok(OfflineContext::new(sample_rate, volume))
    });
    engine.play_effect(effect);

    let Some(ctx) = engine.context_mut() else {
        bail!("Failed to create offline context");
    };

    println!("Rendering {:?} to {:?}...", effect, output);
    let mut recorder = Recorder::for_context(output, ctx)?;
    recorder.capture(ctx, tail.max(0.0), MAX_EFFECT_SECS)?;
    let seconds = recorder.duration_secs();
    recorder.finalize()?;

    println!("Rendered {:.2}s to {:?}", seconds, output);
    Ok(())
}
