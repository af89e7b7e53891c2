//! Audio decoder implementations

pub mod symphonia;

pub use self::symphonia::SymphoniaDecoder;

use crate::core::AudioBuffer;
use crate::error::TrimResult;

/// Trait for decoders turning a compressed payload into PCM
///
/// A decoder is a long-lived handle owned by the host and shared by every
/// pipeline run, so implementations must not keep per-run state.
pub trait Decoder: Send + Sync {
    /// Decode a complete payload into an audio buffer
    fn decode(&self, bytes: Vec<u8>) -> TrimResult<AudioBuffer>;
}
