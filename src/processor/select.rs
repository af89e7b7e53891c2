use crate::core::{AudioBuffer, SampleRange, TimeRange};
use crate::error::{TrimError, TrimResult};

/// Resolve a time window to frame offsets in `buffer`
///
/// Offsets are `floor(seconds * sample_rate)`. An end past the audio is
/// clamped to the last frame; a start at or past it is rejected.
pub fn select(buffer: &AudioBuffer, range: &TimeRange) -> TrimResult<SampleRange> {
    range.validate()?;

    let total = buffer.frames();
    let rate = buffer.sample_rate() as f64;
    let start_sample = ((range.start * rate).floor() as u64).min(total);
    let end_sample = ((range.end * rate).floor() as u64).min(total);

    if start_sample >= total {
        return Err(TrimError::Range(format!(
            "start {:.3}s is past the end of the audio ({:.3}s)",
            range.start,
            buffer.duration_secs()
        )));
    }
    if start_sample >= end_sample {
        return Err(TrimError::Range(format!(
            "window {:.6}s..{:.6}s is shorter than one sample",
            range.start, range.end
        )));
    }

    Ok(SampleRange {
        start_sample,
        end_sample,
    })
}

/// A fixed-length trim starting at the beginning of the audio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetTrim {
    /// Short label (e.g. "30s")
    pub label: &'static str,
    /// Requested length in seconds
    pub seconds: f64,
    /// Longer description
    pub description: &'static str,
}

/// Preset trims offered to the user
pub const PRESET_TRIMS: [PresetTrim; 5] = [
    PresetTrim { label: "15s", seconds: 15.0, description: "15 seconds" },
    PresetTrim { label: "30s", seconds: 30.0, description: "30 seconds" },
    PresetTrim { label: "60s", seconds: 60.0, description: "1 minute" },
    PresetTrim { label: "2min", seconds: 120.0, description: "2 minutes" },
    PresetTrim { label: "5min", seconds: 300.0, description: "5 minutes" },
];

impl PresetTrim {
    /// Find a preset by its label (case-insensitive)
    pub fn find(label: &str) -> Option<PresetTrim> {
        PRESET_TRIMS
            .iter()
            .find(|p| p.label.eq_ignore_ascii_case(label))
            .copied()
    }

    /// Range `[0, min(preset, duration)]`
    ///
    /// With an unknown duration the preset length is used as is; the
    /// selector clamps it once the audio is decoded.
    pub fn range_for(&self, duration_secs: Option<f64>) -> TrimResult<TimeRange> {
        let end = match duration_secs {
            Some(duration) => self.seconds.min(duration),
            None => self.seconds,
        };
        TimeRange::new(0.0, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn silence(frames: usize, rate: u32, channels: usize) -> AudioBuffer {
        AudioBuffer::new(vec![vec![0.0; frames]; channels], rate).unwrap()
    }

    #[test]
    fn test_select_scenario() {
        let buffer = silence(441_000, 44100, 2);
        let range = select(&buffer, &TimeRange::new(2.0, 5.0).unwrap()).unwrap();

        assert_eq!(range.start_sample, 88_200);
        assert_eq!(range.end_sample, 220_500);
        assert_eq!(range.frames(), 132_300);
    }

    #[test]
    fn test_select_clamps_end() {
        let buffer = silence(441_000, 44100, 1);
        let range = select(&buffer, &TimeRange::new(8.0, 25.0).unwrap()).unwrap();
        assert_eq!(range.end_sample, 441_000);
        assert_eq!(range.frames(), 88_200);
    }

    #[test]
    fn test_select_floors_offsets() {
        let buffer = silence(1000, 100, 1);
        let range = select(&buffer, &TimeRange::new(0.019, 0.051).unwrap()).unwrap();
        assert_eq!(range.start_sample, 1);
        assert_eq!(range.end_sample, 5);
    }

    #[test]
    fn test_select_rejects_invalid_ranges() {
        let buffer = silence(441_000, 44100, 1);

        let equal = TimeRange { start: 5.0, end: 5.0 };
        assert!(matches!(select(&buffer, &equal), Err(TrimError::Range(_))));

        let negative = TimeRange { start: -1.0, end: 2.0 };
        assert!(matches!(select(&buffer, &negative), Err(TrimError::Range(_))));

        let past_end = TimeRange::new(10.0, 12.0).unwrap();
        assert!(matches!(select(&buffer, &past_end), Err(TrimError::Range(_))));
    }

    #[test]
    fn test_select_rejects_sub_sample_window() {
        let buffer = silence(1000, 100, 1);
        let range = TimeRange::new(0.011, 0.012).unwrap();
        assert!(matches!(select(&buffer, &range), Err(TrimError::Range(_))));
    }

    #[test]
    fn test_presets() {
        let preset = PresetTrim::find("2MIN").unwrap();
        assert_eq!(preset.seconds, 120.0);
        assert!(PresetTrim::find("10min").is_none());

        let short = preset.range_for(Some(45.0)).unwrap();
        assert_eq!(short, TimeRange { start: 0.0, end: 45.0 });

        let long = preset.range_for(Some(600.0)).unwrap();
        assert_eq!(long.end, 120.0);

        assert_eq!(preset.range_for(None).unwrap().end, 120.0);
        assert!(preset.range_for(Some(0.0)).is_err());
    }
}
