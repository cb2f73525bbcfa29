//! Offline processing context
//!
//! Renders voices on demand instead of from an audio callback. The clock
//! only moves when frames are rendered, which makes it suitable for WAV
//! rendering and deterministic tests.

use super::context::{ContextState, ProcessingContext, VoiceId};
use super::mixer::VoiceMixer;
use crate::error::Result;
use crate::synth::Voice;

/// A processing context driven by explicit render calls
pub struct OfflineContext {
    mixer: VoiceMixer,
    state: ContextState,
}

impl OfflineContext {
    /// Create a running context
    pub fn new(sample_rate: f64, volume: f64) -> Self {
        Self {
            mixer: VoiceMixer::new(sample_rate, volume),
            state: ContextState::Running,
        }
    }

    /// Create a context that must be resumed before it renders
    pub fn suspended(sample_rate: f64, volume: f64) -> Self {
        Self {
            mixer: VoiceMixer::new(sample_rate, volume),
            state: ContextState::Suspended,
        }
    }

    /// Stop rendering until resumed
    pub fn suspend(&mut self) {
        self.state = ContextState::Suspended;
    }

    /// Render `frames` mono samples
    ///
    /// A suspended context produces nothing and its clock stands still.
    pub fn render(&mut self, frames: usize) -> Vec<f32> {
        if self.state == ContextState::Suspended {
            return Vec::new();
        }
        let mut buffer = vec![0.0f32; frames];
        self.mixer.fill_buffer(&mut buffer);
        buffer
    }

    /// Render `seconds` worth of samples
    pub fn render_seconds(&mut self, seconds: f64) -> Vec<f32> {
        let frames = (seconds * self.mixer.sample_rate()).round().max(0.0) as usize;
        self.render(frames)
    }

    /// Render until every scheduled voice has finished
    ///
    /// Stops after `max_seconds` regardless, so a stuck voice cannot spin
    /// forever.
    pub fn render_to_silence(&mut self, max_seconds: f64) -> Vec<f32> {
        let block = (self.mixer.sample_rate() / 100.0).ceil().max(1.0) as usize;
        let deadline = self.mixer.now() + max_seconds;
        let mut output = Vec::new();

        while self.mixer.active_voices() > 0 && self.mixer.now() < deadline {
            let rendered = self.render(block);
            if rendered.is_empty() {
                break;
            }
            output.extend(rendered);
        }
        output
    }
}

impl ProcessingContext for OfflineContext {
    fn now(&self) -> f64 {
        self.mixer.now()
    }

    fn sample_rate(&self) -> f64 {
        self.mixer.sample_rate()
    }

    fn state(&self) -> ContextState {
        self.state
    }

    fn resume(&mut self) -> Result<()> {
        self.state = ContextState::Running;
        Ok(())
    }

    fn schedule(&mut self, voice: Voice) -> VoiceId {
        self.mixer.schedule(voice)
    }

    fn schedule_all(&mut self, voices: Vec<Voice>) -> Vec<VoiceId> {
        self.mixer.schedule_all(voices)
    }

    fn stop_voice(&mut self, id: VoiceId) -> bool {
        self.mixer.stop(id)
    }

    fn is_active(&self, id: VoiceId) -> bool {
        self.mixer.is_active(id)
    }

    fn active_voices(&self) -> usize {
        self.mixer.active_voices()
    }
}
