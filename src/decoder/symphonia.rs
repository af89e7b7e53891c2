use crate::core::AudioBuffer;
use crate::error::{TrimError, TrimResult};
use log::{debug, warn};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Symphonia-based decoder for in-memory payloads
///
/// Holds no per-run state, so one instance can be shared by every run.
#[derive(Debug, Clone, Default)]
pub struct SymphoniaDecoder {
    /// File extension passed to the format probe
    extension_hint: Option<String>,
}

impl SymphoniaDecoder {
    /// Create a decoder that probes the format from content alone
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a file extension hint (e.g. "mp3") for the format probe
    pub fn with_extension_hint(mut self, extension: impl Into<String>) -> Self {
        self.extension_hint = Some(extension.into());
        self
    }
}

impl super::Decoder for SymphoniaDecoder {
    fn decode(&self, bytes: Vec<u8>) -> TrimResult<AudioBuffer> {
        if bytes.is_empty() {
            return Err(TrimError::Decode("payload is empty".to_string()));
        }
        let payload_len = bytes.len();

        // Create media source stream
        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = &self.extension_hint {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| TrimError::Decode(format!("unrecognized audio format: {}", e)))?;

        let mut reader = probed.format;

        // Find the first audio track
        let track = reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| TrimError::Decode("no audio track found".to_string()))?;
        let track_id = track.id;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| TrimError::Decode(format!("unsupported codec: {}", e)))?;

        let mut sample_rate = track.codec_params.sample_rate;
        let mut channel_count: Option<usize> = None;
        let mut interleaved: Vec<f32> = Vec::new();
        let mut sample_buf: Option<SampleBuffer<f32>> = None;
        let mut buf_frames = 0usize;
        let mut skipped = 0u64;

        loop {
            let packet = match reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(e.into()),
            };

            // Only process packets from our audio track
            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(msg)) => {
                    // Corrupt packet: skip it and keep going
                    skipped += 1;
                    debug!("Skipping undecodable packet: {}", msg);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if decoded.frames() == 0 {
                continue;
            }

            let spec = *decoded.spec();
            let count = spec.channels.count();
            match channel_count {
                None => {
                    channel_count = Some(count);
                    sample_rate = Some(spec.rate);
                }
                Some(previous) if previous != count => {
                    return Err(TrimError::Decode(format!(
                        "channel count changed mid-stream from {} to {}",
                        previous, count
                    )));
                }
                Some(_) => {}
            }

            if sample_buf.is_none() || decoded.capacity() > buf_frames {
                buf_frames = decoded.capacity();
                sample_buf = Some(SampleBuffer::<f32>::new(buf_frames as u64, spec));
            }
            if let Some(buf) = sample_buf.as_mut() {
                buf.copy_interleaved_ref(decoded);
                interleaved.extend_from_slice(buf.samples());
            }
        }

        if skipped > 0 {
            warn!("Skipped {} undecodable packets", skipped);
        }

        let channel_count = match channel_count {
            Some(count) if !interleaved.is_empty() => count,
            _ => return Err(TrimError::Decode("no audio frames decoded".to_string())),
        };
        let channel_count = u16::try_from(channel_count).map_err(|_| {
            TrimError::Decode(format!("unsupported channel count {}", channel_count))
        })?;

        let sample_rate =
            sample_rate.ok_or_else(|| TrimError::Decode("unknown sample rate".to_string()))?;

        let buffer = AudioBuffer::from_interleaved(&interleaved, channel_count, sample_rate)?;
        debug!(
            "Decoded {} bytes into {} frames x {} channels at {} Hz",
            payload_len,
            buffer.frames(),
            buffer.channel_count(),
            buffer.sample_rate()
        );
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::Decoder;
    use crate::encoder::{ContainerEncoder, WavEncoder};

    fn tone(frames: usize, rate: u32) -> AudioBuffer {
        let left = (0..frames).map(|i| (i as f32 * 0.05).sin() * 0.9).collect();
        let right = (0..frames).map(|i| (i as f32 * 0.02).cos() * -0.4).collect();
        AudioBuffer::new(vec![left, right], rate).unwrap()
    }

    #[test]
    fn test_invalid_payload() {
        let decoder = SymphoniaDecoder::new();
        assert!(matches!(
            decoder.decode(b"definitely not audio".to_vec()),
            Err(TrimError::Decode(_))
        ));
        assert!(matches!(decoder.decode(Vec::new()), Err(TrimError::Decode(_))));
    }

    #[test]
    fn test_round_trip_through_wav() {
        let original = tone(8_000, 22050);
        let bytes = WavEncoder::default().encode(&original).unwrap();

        let decoded = SymphoniaDecoder::new()
            .with_extension_hint("wav")
            .decode(bytes)
            .unwrap();

        assert_eq!(decoded.channel_count(), 2);
        assert_eq!(decoded.sample_rate(), 22050);
        assert_eq!(decoded.frames(), 8_000);

        // 16-bit quantization error
        let tolerance = 2.0 / 32768.0;
        for (a, b) in original.channels().zip(decoded.channels()) {
            for (x, y) in a.iter().zip(b) {
                assert!((x - y).abs() <= tolerance, "{} vs {}", x, y);
            }
        }
    }

    #[test]
    fn test_decoder_is_reusable() {
        let decoder = SymphoniaDecoder::new();
        for frames in [100, 2_000, 50] {
            let bytes = WavEncoder::default().encode(&tone(frames, 8000)).unwrap();
            assert_eq!(decoder.decode(bytes).unwrap().frames(), frames as u64);
        }
    }
}
