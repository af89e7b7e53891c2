use super::Checkpoint;
use crate::core::{AudioBuffer, SampleRange};
use crate::error::{TrimError, TrimResult};
use std::time::Duration;

/// Copies a frame range out of a buffer into a new, independent buffer
///
/// The copy walks the range in bounded slices and calls the checkpoint
/// after each one, so a long copy can report progress and be cancelled.
/// The result does not depend on the slice length.
#[derive(Debug, Clone)]
pub struct TrimCopier {
    /// Slice length in seconds of audio
    slice: Duration,
}

impl TrimCopier {
    /// Create a copier with the given slice length (clamped to at least one frame)
    pub fn new(slice: Duration) -> Self {
        TrimCopier { slice }
    }

    /// Calculate the number of frames per slice for a sample rate
    pub fn frames_per_slice(&self, sample_rate: u32) -> usize {
        ((self.slice.as_secs_f64() * sample_rate as f64).ceil() as usize).max(1)
    }

    /// Copy `range` out of `buffer`
    pub fn copy(&self, buffer: &AudioBuffer, range: &SampleRange) -> TrimResult<AudioBuffer> {
        self.copy_with(buffer, range, &mut |_, _| Ok(()))
    }

    /// Copy `range` out of `buffer`, calling `checkpoint(done, total)` after every slice
    pub fn copy_with(
        &self,
        buffer: &AudioBuffer,
        range: &SampleRange,
        checkpoint: &mut Checkpoint<'_>,
    ) -> TrimResult<AudioBuffer> {
        if range.start_sample >= range.end_sample || range.end_sample > buffer.frames() {
            return Err(TrimError::Internal(format!(
                "frame range {}..{} outside buffer of {} frames",
                range.start_sample,
                range.end_sample,
                buffer.frames()
            )));
        }

        let start = range.start_sample as usize;
        let end = range.end_sample as usize;
        let total = (end - start) as u64;
        let slice_frames = self.frames_per_slice(buffer.sample_rate());

        let mut channels: Vec<Vec<f32>> = (0..buffer.channel_count())
            .map(|_| Vec::with_capacity(end - start))
            .collect();

        for slice_start in (start..end).step_by(slice_frames) {
            let slice_end = std::cmp::min(slice_start + slice_frames, end);
            for (target, source) in channels.iter_mut().zip(buffer.channels()) {
                target.extend_from_slice(&source[slice_start..slice_end]);
            }
            checkpoint((slice_end - start) as u64, total)?;
        }

        AudioBuffer::new(channels, buffer.sample_rate())
    }
}

impl Default for TrimCopier {
    fn default() -> Self {
        TrimCopier::new(Duration::from_secs(1))
    }
}
