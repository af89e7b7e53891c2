//! Output container encoders

pub mod wav;

pub use wav::WavEncoder;

use crate::core::AudioBuffer;
use crate::error::TrimResult;
use crate::processor::Checkpoint;

/// Trait for output container encoders
pub trait ContainerEncoder: Send + Sync {
    /// File extension of the produced container, without the dot
    fn extension(&self) -> &'static str;

    /// Encode `buffer`, calling `checkpoint(frames_done, total_frames)` after every slice
    fn encode_with(
        &self,
        buffer: &AudioBuffer,
        checkpoint: &mut Checkpoint<'_>,
    ) -> TrimResult<Vec<u8>>;

    /// Encode `buffer` in one go
    fn encode(&self, buffer: &AudioBuffer) -> TrimResult<Vec<u8>> {
        self.encode_with(buffer, &mut |_, _| Ok(()))
    }
}

/// Output container policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Canonical RIFF/WAVE, 16-bit PCM
    #[default]
    Wav,
}

impl OutputFormat {
    /// Build the encoder for this format
    pub fn encoder(&self, slice_frames: usize) -> Box<dyn ContainerEncoder> {
        match self {
            OutputFormat::Wav => Box::new(WavEncoder::new(slice_frames)),
        }
    }

    /// Get the file extension
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Wav => "wav",
        }
    }
}

/// Overall progress for an encode stage occupying `90..=95`
pub fn encode_progress(frames_done: u64, total_frames: u64) -> f64 {
    if total_frames == 0 {
        return 95.0;
    }
    90.0 + 5.0 * (frames_done as f64 / total_frames as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_progress() {
        assert_eq!(encode_progress(0, 100), 90.0);
        assert_eq!(encode_progress(50, 100), 92.5);
        assert_eq!(encode_progress(100, 100), 95.0);
        assert_eq!(encode_progress(0, 0), 95.0);
    }

    #[test]
    fn test_output_format_encoder() {
        let format = OutputFormat::default();
        let encoder = format.encoder(1024);
        assert_eq!(encoder.extension(), format.extension());
    }
}
