//! Real-time processing context using cpal

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Device, SampleFormat, Stream, StreamConfig};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, warn};

use super::context::{ContextFactory, ContextState, ProcessingContext, VoiceId};
use super::mixer::VoiceMixer;
use crate::config::{AudioConfig, RattleConfig};
use crate::error::{Result, SfxError};
use crate::synth::Voice;

/// A processing context rendering to an audio output device
///
/// The stream is built paused; `resume()` starts it. The mixer clock only
/// advances while the device pulls samples.
pub struct RealtimeContext {
    mixer: Arc<Mutex<VoiceMixer>>,
    stream: Stream,
    state: ContextState,
    sample_rate: f64,
    device_name: String,
}

impl RealtimeContext {
    /// Open the configured output device (or the default one)
    pub fn open(audio: &AudioConfig, volume: f32) -> Result<Self> {
        let host = cpal::default_host();
        let device = select_device(&host, audio.device.as_deref())?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let supported = device
            .default_output_config()
            .map_err(|e| unavailable("no default output config", e))?;
        let sample_format = supported.sample_format();
        let mut stream_config: StreamConfig = supported.into();
        if let Some(frames) = audio.buffer_size {
            stream_config.buffer_size = BufferSize::Fixed(frames);
        }

        let sample_rate = stream_config.sample_rate.0 as f64;
        if stream_config.sample_rate.0 != audio.sample_rate {
            debug!(
                device = sample_rate,
                configured = audio.sample_rate,
                "Using device sample rate"
            );
        }

        let mixer = Arc::new(Mutex::new(VoiceMixer::new(sample_rate, volume as f64)));

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, mixer.clone())?,
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, mixer.clone())?,
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, mixer.clone())?,
            other => {
                return Err(SfxError::ContextUnavailable(format!(
                    "unsupported sample format {:?}",
                    other
                )))
            }
        };

        // Some backends start streams on creation
        if let Err(e) = stream.pause() {
            debug!(error = %e, "Could not pause new stream");
        }

        debug!(device = %device_name, sample_rate, "Audio context created");

        Ok(Self {
            mixer,
            stream,
            state: ContextState::Suspended,
            sample_rate,
            device_name,
        })
    }

    /// Name of the output device
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Pause the output stream
    pub fn suspend(&mut self) -> Result<()> {
        self.stream
            .pause()
            .map_err(|e| unavailable("failed to pause stream", e))?;
        self.state = ContextState::Suspended;
        Ok(())
    }

    fn mixer(&self) -> MutexGuard<'_, VoiceMixer> {
        // A panicking audio callback must not take scheduling down with it
        self.mixer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProcessingContext for RealtimeContext {
    fn now(&self) -> f64 {
        self.mixer().now()
    }

    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn state(&self) -> ContextState {
        self.state
    }

    fn resume(&mut self) -> Result<()> {
        self.stream
            .play()
            .map_err(|e| unavailable("failed to start stream", e))?;
        self.state = ContextState::Running;
        Ok(())
    }

    fn schedule(&mut self, voice: Voice) -> VoiceId {
        self.mixer().schedule(voice)
    }

    fn schedule_all(&mut self, voices: Vec<Voice>) -> Vec<VoiceId> {
        // One lock for the whole batch; the callback outputs silence while it is held
        self.mixer().schedule_all(voices)
    }

    fn stop_voice(&mut self, id: VoiceId) -> bool {
        self.mixer().stop(id)
    }

    fn is_active(&self, id: VoiceId) -> bool {
        self.mixer().is_active(id)
    }

    fn active_voices(&self) -> usize {
        self.mixer().active_voices()
    }
}

/// Opens a `RealtimeContext` from configuration
#[derive(Debug, Clone)]
pub struct RealtimeFactory {
    config: RattleConfig,
}

impl RealtimeFactory {
    pub fn new(config: RattleConfig) -> Self {
        Self { config }
    }
}

impl ContextFactory for RealtimeFactory {
    type Context = RealtimeContext;

    fn create(&mut self) -> Result<RealtimeContext> {
        RealtimeContext::open(&self.config.audio, self.config.master.volume)
    }
}

fn select_device(host: &cpal::Host, name: Option<&str>) -> Result<Device> {
    if let Some(wanted) = name {
        let found = host
            .output_devices()
            .map_err(|e| unavailable("cannot enumerate output devices", e))?
            .find(|d| d.name().map(|n| n == wanted).unwrap_or(false));
        match found {
            Some(device) => return Ok(device),
            None => warn!(device = wanted, "Output device not found, using default"),
        }
    }

    host.default_output_device()
        .ok_or_else(|| SfxError::ContextUnavailable("no output device available".into()))
}

fn build_stream<T: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>>(
    device: &Device,
    config: &StreamConfig,
    mixer: Arc<Mutex<VoiceMixer>>,
) -> Result<Stream> {
    let channels = config.channels as usize;

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                if let Ok(mut mixer) = mixer.try_lock() {
                    for frame in data.chunks_mut(channels) {
                        let sample = T::from_sample(mixer.process() as f32);
                        for channel_sample in frame.iter_mut() {
                            *channel_sample = sample;
                        }
                    }
                } else {
                    // Mutex held by a scheduler, fill with silence
                    for sample in data.iter_mut() {
                        *sample = T::from_sample(0.0f32);
                    }
                }
            },
            |err| error!("Audio stream error: {}", err),
            None,
        )
        .map_err(|e| unavailable("failed to build output stream", e))
}

fn unavailable(context: &str, err: impl std::fmt::Display) -> SfxError {
    SfxError::ContextUnavailable(format!("{}: {}", context, err))
}

/// Get the default output device name
pub fn default_device_name() -> Option<String> {
    let host = cpal::default_host();
    host.default_output_device().and_then(|d| d.name().ok())
}

/// List all available output devices with their default configs
pub fn list_output_devices() -> Vec<(String, StreamConfig)> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    if let Ok(output_devices) = host.output_devices() {
        for device in output_devices {
            if let (Ok(name), Ok(config)) = (device.name(), device.default_output_config()) {
                devices.push((name, config.into()));
            }
        }
    }

    devices
}
