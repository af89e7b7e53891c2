use crate::core::AudioBuffer;
use crate::error::{TrimError, TrimResult};
use crate::processor::Checkpoint;

/// Size of the canonical RIFF/WAVE PCM header
pub const WAV_HEADER_LEN: usize = 44;

const BITS_PER_SAMPLE: u16 = 16;
const BYTES_PER_SAMPLE: u64 = 2;
const PCM_FORMAT: u16 = 1;
const FMT_CHUNK_LEN: u32 = 16;

/// 0.1 s at 44.1 kHz
pub const DEFAULT_SLICE_FRAMES: usize = 4410;

/// 16-bit PCM WAV encoder
///
/// Writes the 44-byte canonical header followed by interleaved signed
/// 16-bit little-endian frames, in bounded slices.
#[derive(Debug, Clone)]
pub struct WavEncoder {
    slice_frames: usize,
}

impl WavEncoder {
    /// Create an encoder that processes `slice_frames` frames per slice
    pub fn new(slice_frames: usize) -> Self {
        WavEncoder {
            slice_frames: slice_frames.max(1),
        }
    }

    /// Get the number of frames per slice
    pub fn slice_frames(&self) -> usize {
        self.slice_frames
    }

    /// Data chunk size in bytes for `buffer`
    pub fn data_len(buffer: &AudioBuffer) -> u64 {
        buffer.frames() * buffer.channel_count() as u64 * BYTES_PER_SAMPLE
    }

    /// Block align and byte rate for `buffer`, if they fit their header fields
    fn frame_layout(buffer: &AudioBuffer) -> TrimResult<(u16, u32)> {
        let bytes_per_frame = buffer.channel_count() as u32 * (BITS_PER_SAMPLE / 8) as u32;
        let block_align = u16::try_from(bytes_per_frame).map_err(|_| {
            TrimError::Internal(format!(
                "{} channels exceed the WAV block align field",
                buffer.channel_count()
            ))
        })?;
        let byte_rate = buffer
            .sample_rate()
            .checked_mul(bytes_per_frame)
            .ok_or_else(|| {
                TrimError::Internal(format!(
                    "byte rate of {} Hz x {} channels exceeds the WAV header field",
                    buffer.sample_rate(),
                    buffer.channel_count()
                ))
            })?;
        Ok((block_align, byte_rate))
    }

    fn write_header(out: &mut Vec<u8>, buffer: &AudioBuffer, data_len: u32) -> TrimResult<()> {
        let channels = buffer.channel_count();
        let sample_rate = buffer.sample_rate();
        let (block_align, byte_rate) = Self::frame_layout(buffer)?;

        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
        out.extend_from_slice(&PCM_FORMAT.to_le_bytes());
        out.extend_from_slice(&channels.to_le_bytes());
        out.extend_from_slice(&sample_rate.to_le_bytes());
        out.extend_from_slice(&byte_rate.to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        Ok(())
    }
}

impl Default for WavEncoder {
    fn default() -> Self {
        WavEncoder::new(DEFAULT_SLICE_FRAMES)
    }
}

/// Convert a float sample to 16-bit PCM
///
/// Negative values scale by 32768, the rest by 32767; the cast truncates
/// toward zero. The product is taken in f64 so it is exact before truncation.
pub fn sample_to_i16(sample: f32) -> i16 {
    let s = if sample.is_nan() { 0.0 } else { sample.clamp(-1.0, 1.0) as f64 };
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

impl super::ContainerEncoder for WavEncoder {
    fn extension(&self) -> &'static str {
        "wav"
    }

    fn encode_with(
        &self,
        buffer: &AudioBuffer,
        checkpoint: &mut Checkpoint<'_>,
    ) -> TrimResult<Vec<u8>> {
        let data_len = Self::data_len(buffer);
        let riff_data_len = u32::try_from(data_len)
            .ok()
            .filter(|len| len.checked_add(36).is_some())
            .ok_or_else(|| {
                TrimError::Internal(format!(
                    "{} bytes of PCM data exceed the WAV size limit",
                    data_len
                ))
            })?;

        let expected_len = WAV_HEADER_LEN + data_len as usize;
        let mut out = Vec::with_capacity(expected_len);
        Self::write_header(&mut out, buffer, riff_data_len)?;

        let frames = buffer.frames() as usize;
        let channels: Vec<&[f32]> = buffer.channels().collect();

        for slice_start in (0..frames).step_by(self.slice_frames) {
            let slice_end = std::cmp::min(slice_start + self.slice_frames, frames);
            for i in slice_start..slice_end {
                for channel in &channels {
                    out.extend_from_slice(&sample_to_i16(channel[i]).to_le_bytes());
                }
            }
            checkpoint(slice_end as u64, frames as u64)?;
        }

        if out.len() != expected_len {
            return Err(TrimError::Internal(format!(
                "encoded {} bytes, header declares {}",
                out.len(),
                expected_len
            )));
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::ContainerEncoder;
    use std::io::Cursor;

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
    }

    fn sine(frames: usize, rate: u32, channels: usize) -> AudioBuffer {
        let data = (0..channels)
            .map(|ch| {
                (0..frames)
                    .map(|i| (i as f32 * 0.01 * (ch + 1) as f32).sin() * 0.8)
                    .collect()
            })
            .collect();
        AudioBuffer::new(data, rate).unwrap()
    }

    #[test]
    fn test_sample_conversion() {
        assert_eq!(sample_to_i16(0.0), 0);
        assert_eq!(sample_to_i16(1.0), 32767);
        assert_eq!(sample_to_i16(-1.0), -32768);
        assert_eq!(sample_to_i16(2.5), 32767);
        assert_eq!(sample_to_i16(-7.0), -32768);
        assert_eq!(sample_to_i16(0.5), 16383);
        assert_eq!(sample_to_i16(-0.5), -16384);
        assert_eq!(sample_to_i16(f32::NAN), 0);
    }

    #[test]
    fn test_positive_conversion_truncates_exact_product() {
        // 3.051851e-5 * 32767 is just below 1; an f32 product rounds up to 1.0
        assert_eq!(sample_to_i16(3.051851e-5), 0);
    }

    #[test]
    fn test_header_layout() {
        let buffer = AudioBuffer::new(vec![vec![0.0; 132_300]; 2], 44100).unwrap();
        let bytes = WavEncoder::default().encode(&buffer).unwrap();

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(u32_at(&bytes, 4), 529_236);
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(u32_at(&bytes, 16), 16);
        assert_eq!(u16_at(&bytes, 20), 1);
        assert_eq!(u16_at(&bytes, 22), 2);
        assert_eq!(u32_at(&bytes, 24), 44100);
        assert_eq!(u32_at(&bytes, 28), 44100 * 4);
        assert_eq!(u16_at(&bytes, 32), 4);
        assert_eq!(u16_at(&bytes, 34), 16);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(u32_at(&bytes, 40), 529_200);
        assert_eq!(bytes.len(), WAV_HEADER_LEN + 529_200);
    }

    #[test]
    fn test_interleaving_order() {
        let buffer = AudioBuffer::new(vec![vec![0.5, -1.0], vec![-0.5, 1.0]], 8000).unwrap();
        let bytes = WavEncoder::default().encode(&buffer).unwrap();
        let samples: Vec<i16> = bytes[WAV_HEADER_LEN..]
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(samples, vec![16383, -16384, -32768, 32767]);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let buffer = sine(10_000, 22050, 2);
        let encoder = WavEncoder::default();
        assert_eq!(encoder.encode(&buffer).unwrap(), encoder.encode(&buffer).unwrap());
    }

    #[test]
    fn test_slice_size_does_not_change_output() {
        let buffer = sine(9_999, 22050, 3);
        let n = WavEncoder::new(333).encode(&buffer).unwrap();
        let two_n = WavEncoder::new(666).encode(&buffer).unwrap();
        let one = WavEncoder::new(1).encode(&buffer).unwrap();
        assert_eq!(n, two_n);
        assert_eq!(n, one);
    }

    #[test]
    fn test_checkpoint_progress() {
        let buffer = sine(10_000, 44100, 1);
        let mut seen = Vec::new();
        WavEncoder::new(4410)
            .encode_with(&buffer, &mut |done, total| {
                seen.push((done, total));
                Ok(())
            })
            .unwrap();
        assert_eq!(seen, vec![(4410, 10_000), (8820, 10_000), (10_000, 10_000)]);
    }

    #[test]
    fn test_checkpoint_error_aborts() {
        let buffer = sine(10_000, 44100, 1);
        let result = WavEncoder::new(100).encode_with(&buffer, &mut |_, _| {
            Err(TrimError::EncodeTimeout {
                limit: std::time::Duration::ZERO,
            })
        });
        assert!(matches!(result, Err(TrimError::EncodeTimeout { .. })));
    }

    #[test]
    fn test_output_parses_as_wav() {
        let buffer = sine(4_000, 16000, 2);
        let bytes = WavEncoder::default().encode(&buffer).unwrap();

        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 16000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);
        assert_eq!(reader.duration(), 4_000);

        let samples: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples[0], sample_to_i16(buffer.channel(0).unwrap()[0]));
        assert_eq!(samples[3], sample_to_i16(buffer.channel(1).unwrap()[1]));
    }

    #[test]
    fn test_empty_buffer_encodes_header_only() {
        let buffer = AudioBuffer::new(vec![vec![]], 44100).unwrap();
        let bytes = WavEncoder::default().encode(&buffer).unwrap();
        assert_eq!(bytes.len(), WAV_HEADER_LEN);
        assert_eq!(u32_at(&bytes, 4), 36);
        assert_eq!(u32_at(&bytes, 40), 0);
    }

    #[test]
    fn test_too_many_channels_is_internal_error() {
        let buffer = AudioBuffer::new(vec![vec![0.0; 1]; 40_000], 8000).unwrap();
        let err = WavEncoder::default().encode(&buffer).unwrap_err();
        assert!(matches!(err, TrimError::Internal(_)));
    }

    #[test]
    fn test_byte_rate_overflow_is_internal_error() {
        let buffer = AudioBuffer::new(vec![vec![0.0; 1]; 2], u32::MAX).unwrap();
        let err = WavEncoder::default().encode(&buffer).unwrap_err();
        assert!(matches!(err, TrimError::Internal(_)));
    }
}
