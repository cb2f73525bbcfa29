//! Sound engine lifecycle
//!
//! Owns the processing context, creates it lazily on the first sound
//! request, resumes it when suspended, tracks the global enable flag and
//! keeps hold of the celebration melody's voices so they can be stopped.

mod context;
mod mixer;
mod offline;
mod player;
mod recorder;
mod scheduler;

pub use context::{ContextFactory, ContextState, ProcessingContext, VoiceId};
pub use mixer::VoiceMixer;
pub use offline::OfflineContext;
pub use player::{default_device_name, list_output_devices, RealtimeContext, RealtimeFactory};
pub use recorder::Recorder;
pub use scheduler::{sequential, stagger, Schedule};

use rand::rngs::ThreadRng;
use rand::Rng;
use tracing::{debug, error, trace, warn};

use crate::config::RattleConfig;
use crate::effects::Effect;

/// Voices belonging to the currently playing melody
#[derive(Debug, Default)]
pub struct MelodyHandle {
    voices: Vec<VoiceId>,
}

impl MelodyHandle {
    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// Number of tracked voices the context still holds
    pub fn active<C: ProcessingContext + ?Sized>(&self, ctx: &C) -> usize {
        self.voices.iter().filter(|&&id| ctx.is_active(id)).count()
    }

    /// Forget finished voices, then track `ids`
    fn track<C: ProcessingContext + ?Sized>(
        &mut self,
        ctx: &C,
        ids: impl IntoIterator<Item = VoiceId>,
    ) {
        self.voices.retain(|&id| ctx.is_active(id));
        self.voices.extend(ids);
    }

    /// Stop every tracked voice and forget them
    fn cancel<C: ProcessingContext + ?Sized>(&mut self, ctx: Option<&mut C>) -> usize {
        let ids = std::mem::take(&mut self.voices);
        match ctx {
            Some(ctx) => ids.into_iter().filter(|&id| ctx.stop_voice(id)).count(),
            None => 0,
        }
    }
}

/// The procedural sound effects engine
///
/// Every trigger is fire-and-forget: voices are handed to the context with
/// absolute timestamps and the call returns immediately. Failures are
/// logged and swallowed, never raised to the caller.
pub struct SoundEngine<F: ContextFactory, R: Rng = ThreadRng> {
    factory: F,
    context: Option<F::Context>,
    enabled: bool,
    melody: MelodyHandle,
    rng: R,
}

/// Engine rendering to the system's audio output
pub type RealtimeEngine = SoundEngine<RealtimeFactory>;

impl<F: ContextFactory> SoundEngine<F> {
    /// Create an engine that draws randomness from the thread RNG
    pub fn new(factory: F) -> Self {
        Self::with_rng(factory, rand::thread_rng())
    }
}

impl RealtimeEngine {
    /// Create an engine for the system output described by `config`
    pub fn from_config(config: RattleConfig) -> Self {
        let enabled = config.master.enabled;
        let mut engine = Self::new(RealtimeFactory::new(config));
        engine.enabled = enabled;
        engine
    }
}

impl<F: ContextFactory, R: Rng> SoundEngine<F, R> {
    /// Create an engine with an explicit random source
    pub fn with_rng(factory: F, rng: R) -> Self {
        Self {
            factory,
            context: None,
            enabled: true,
            melody: MelodyHandle::default(),
            rng,
        }
    }

    /// Set the global mute flag
    ///
    /// Disabling stops the celebration melody at once. Short one-shot
    /// sounds already scheduled are left to finish.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.stop_celebration_music();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Make sure a context exists and is running
    ///
    /// Idempotent. Creates the context on first use and asks a suspended
    /// context to resume. Returns false if no context could be created;
    /// the next call tries again.
    pub fn ensure_context_ready(&mut self) -> bool {
        if self.context.is_none() {
            match self.factory.create() {
                Ok(ctx) => {
                    debug!(sample_rate = ctx.sample_rate(), "Processing context created");
                    self.context = Some(ctx);
                }
                Err(e) => {
                    warn!(error = %e, "Sound unavailable");
                    return false;
                }
            }
        }

        let Some(ctx) = self.context.as_mut() else {
            return false;
        };
        if ctx.state() == ContextState::Suspended {
            if let Err(e) = ctx.resume() {
                // Scheduling still works; the voices sound once resumed
                warn!(error = %e, "Failed to resume processing context");
            }
        }
        true
    }

    /// The processing context, if one has been created
    pub fn context(&self) -> Option<&F::Context> {
        self.context.as_ref()
    }

    pub fn context_mut(&mut self) -> Option<&mut F::Context> {
        self.context.as_mut()
    }

    /// Number of melody voices still pending or sounding
    pub fn active_melody_voices(&self) -> usize {
        match &self.context {
            Some(ctx) => self.melody.active(ctx),
            None => 0,
        }
    }

    /// Shaker rattle for when the user starts shaking
    pub fn play_shake_sound(&mut self) {
        self.play_effect(Effect::Shake);
    }

    /// Jingle for when a result is revealed
    pub fn play_reveal_sound(&mut self) {
        self.play_effect(Effect::Reveal);
    }

    /// Chime for a success event
    pub fn play_success_sound(&mut self) {
        self.play_effect(Effect::Success);
    }

    /// Start the celebration tune
    pub fn play_celebration_music(&mut self) {
        self.play_effect(Effect::Celebration);
    }

    /// Stop the celebration tune immediately
    ///
    /// Safe to call when nothing is playing or the notes already finished.
    pub fn stop_celebration_music(&mut self) {
        let stopped = self.melody.cancel(self.context.as_mut());
        if stopped > 0 {
            debug!(stopped, "Celebration music stopped");
        }
    }

    /// Schedule `effect` to start now
    pub fn play_effect(&mut self, effect: Effect) {
        if !self.enabled {
            trace!(?effect, "Sound disabled, ignoring trigger");
            return;
        }
        if !self.ensure_context_ready() {
            return;
        }
        let Some(ctx) = self.context.as_mut() else {
            return;
        };

        let schedule = match effect.build(&mut self.rng, ctx.sample_rate()) {
            Ok(schedule) => schedule,
            Err(e) => {
                error!(?effect, error = %e, "Failed to build effect");
                return;
            }
        };

        let voices = schedule.len();
        let ids = schedule.submit(ctx);
        if effect.is_cancellable() {
            self.melody.track(&*ctx, ids);
        }
        trace!(?effect, voices, "Effect scheduled");
    }
}
