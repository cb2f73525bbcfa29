//! Named sound effects
//!
//! Each effect is a pure function from a random source and sample rate to
//! a `Schedule` timed relative to the trigger.

mod chimes;
mod melody;
mod shake;

pub use chimes::{reveal, success, REVEAL_NOTES, SUCCESS_NOTES};
pub use melody::{celebration, tune, CELEBRATION};
pub use shake::{rattle, shake, LAYERS, STICK_COUNT};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::Schedule;
use crate::error::Result;

/// The effects the engine can play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Sticks rattling in a shaken cylinder
    Shake,
    /// Jingle when a result is revealed
    Reveal,
    /// Arpeggio for a success event
    Success,
    /// Longer tune that can be stopped mid-playback
    Celebration,
}

impl Effect {
    pub const ALL: [Effect; 4] = [
        Effect::Shake,
        Effect::Reveal,
        Effect::Success,
        Effect::Celebration,
    ];

    /// Whether the effect's voices are tracked for cancellation
    pub fn is_cancellable(&self) -> bool {
        matches!(self, Effect::Celebration)
    }

    /// Build the effect's voices relative to the trigger time
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R, sample_rate: f64) -> Result<Schedule> {
        match self {
            Effect::Shake => shake(rng, sample_rate),
            Effect::Reveal => reveal(),
            Effect::Success => success(),
            Effect::Celebration => celebration(),
        }
    }
}
