use crate::error::{TrimError, TrimResult};
use std::time::Duration;

/// Decoded multi-channel PCM audio
///
/// Samples are stored planar (one `Vec<f32>` per channel), all channels of
/// equal length, every value inside `[-1.0, 1.0]`. The buffer offers no
/// mutable access once built.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Per-channel samples
    channels: Vec<Vec<f32>>,
    /// Sample rate in Hz (e.g., 44100, 48000)
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a buffer from planar channel data
    ///
    /// Out-of-range samples are clamped into `[-1.0, 1.0]`; NaN becomes silence.
    pub fn new(mut channels: Vec<Vec<f32>>, sample_rate: u32) -> TrimResult<Self> {
        if sample_rate == 0 {
            return Err(TrimError::Decode("sample rate must be positive".to_string()));
        }
        if channels.is_empty() {
            return Err(TrimError::Decode("audio has no channels".to_string()));
        }
        if channels.len() > u16::MAX as usize {
            return Err(TrimError::Decode(format!(
                "unsupported channel count {}",
                channels.len()
            )));
        }

        let frames = channels[0].len();
        if channels.iter().any(|ch| ch.len() != frames) {
            return Err(TrimError::Decode(
                "channels have different lengths".to_string(),
            ));
        }

        for channel in channels.iter_mut() {
            for sample in channel.iter_mut() {
                *sample = clamp_sample(*sample);
            }
        }

        Ok(AudioBuffer {
            channels,
            sample_rate,
        })
    }

    /// Create a buffer from interleaved samples
    pub fn from_interleaved(
        samples: &[f32],
        channel_count: u16,
        sample_rate: u32,
    ) -> TrimResult<Self> {
        if channel_count == 0 {
            return Err(TrimError::Decode("audio has no channels".to_string()));
        }
        let count = channel_count as usize;
        if samples.len() % count != 0 {
            return Err(TrimError::Decode(
                "sample count not divisible by channel count".to_string(),
            ));
        }

        let frames = samples.len() / count;
        let mut channels = vec![Vec::with_capacity(frames); count];
        for frame in samples.chunks_exact(count) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }

        AudioBuffer::new(channels, sample_rate)
    }

    /// Get the number of channels
    pub fn channel_count(&self) -> u16 {
        self.channels.len() as u16
    }

    /// Get sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get number of frames (samples per channel)
    pub fn frames(&self) -> u64 {
        self.channels[0].len() as u64
    }

    /// Get the samples of one channel
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Iterate over all channels in order
    pub fn channels(&self) -> impl Iterator<Item = &[f32]> {
        self.channels.iter().map(Vec::as_slice)
    }

    /// Get the playable duration
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_secs())
    }

    /// Get the playable duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Check if the buffer holds no frames
    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }
}

fn clamp_sample(sample: f32) -> f32 {
    if sample.is_nan() {
        0.0
    } else {
        sample.clamp(-1.0, 1.0)
    }
}

/// Requested trim window in seconds, `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    /// Window start in seconds
    pub start: f64,
    /// Window end in seconds
    pub end: f64,
}

impl TimeRange {
    /// Create a validated range
    pub fn new(start: f64, end: f64) -> TrimResult<Self> {
        let range = TimeRange { start, end };
        range.validate()?;
        Ok(range)
    }

    /// Check `0 <= start < end` with finite bounds
    pub fn validate(&self) -> TrimResult<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(TrimError::Range(format!(
                "bounds must be finite, got {}..{}",
                self.start, self.end
            )));
        }
        if self.start < 0.0 {
            return Err(TrimError::Range(format!(
                "start {:.3}s is negative",
                self.start
            )));
        }
        if self.start >= self.end {
            return Err(TrimError::Range(format!(
                "start {:.3}s must be before end {:.3}s",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// Get the window length in seconds
    pub fn duration_secs(&self) -> f64 {
        self.end - self.start
    }
}

/// Trim window resolved to frame offsets, `[start_sample, end_sample)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRange {
    /// First frame included
    pub start_sample: u64,
    /// First frame excluded
    pub end_sample: u64,
}

impl SampleRange {
    /// Get the number of frames in the range
    pub fn frames(&self) -> u64 {
        self.end_sample - self.start_sample
    }
}
