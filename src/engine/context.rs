//! Processing context abstraction
//!
//! A processing context owns the real-time clock and renders every
//! scheduled voice. The engine only ever talks to it through this trait,
//! so tests can drive an offline context instead of an audio device.

use crate::error::Result;
use crate::synth::Voice;

/// Handle to a voice scheduled on a context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceId(pub(crate) u64);

/// Whether the context is currently rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Running,
    /// Created but not rendering, e.g. until a user gesture allows audio
    Suspended,
}

/// Platform audio engine instance
pub trait ProcessingContext {
    /// Current time on the context's monotonic clock, in seconds
    fn now(&self) -> f64;

    fn sample_rate(&self) -> f64;

    fn state(&self) -> ContextState;

    /// Ask a suspended context to start rendering
    fn resume(&mut self) -> Result<()>;

    /// Hand a voice with absolute start/stop times to the renderer
    fn schedule(&mut self, voice: Voice) -> VoiceId;

    /// Queue voices timed relative to the current clock reading
    ///
    /// The clock is read and every voice queued in one step, so voices that
    /// start at offset zero cannot be overtaken by the clock mid-batch.
    fn schedule_all(&mut self, voices: Vec<Voice>) -> Vec<VoiceId> {
        let origin = self.now();
        voices
            .into_iter()
            .map(|voice| self.schedule(voice.anchored(origin)))
            .collect()
    }

    /// Silence a voice immediately
    ///
    /// Returns false if the voice already finished or was never scheduled.
    fn stop_voice(&mut self, id: VoiceId) -> bool;

    /// Check if a voice is still pending or sounding
    fn is_active(&self, id: VoiceId) -> bool;

    /// Number of voices still waiting to play or sounding
    fn active_voices(&self) -> usize;
}

/// Creates processing contexts on demand
pub trait ContextFactory {
    type Context: ProcessingContext;

    fn create(&mut self) -> Result<Self::Context>;
}

impl<C, F> ContextFactory for F
where
    C: ProcessingContext,
    F: FnMut() -> Result<C>,
{
    type Context = C;

    fn create(&mut self) -> Result<C> {
        self()
    }
}
