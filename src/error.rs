//! Error types for the sound engine

use thiserror::Error;

/// Errors raised while building or scheduling sound
///
/// None of these ever reach the end user: the engine logs and swallows
/// them, since sound is an enhancement layered on top of the application.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SfxError {
    /// The platform refused to create or resume the audio context
    #[error("audio context unavailable: {0}")]
    ContextUnavailable(String),

    /// A gain envelope violates its construction rules
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),

    /// A voice has a non-finite start or a non-positive duration
    #[error("invalid voice: {0}")]
    InvalidVoice(String),
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, SfxError>;
