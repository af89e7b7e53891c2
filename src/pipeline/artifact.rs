use crate::core::TimeRange;
use crate::error::TrimResult;
use crate::fetch::{FetchListener, Fetcher};
use std::fs;
use std::path::Path;
use std::time::Duration;

const DEFAULT_ORIGINAL_FILENAME: &str = "audio.mp3";

/// Suggested filename for a trimmed output, e.g. `trimmed_audio_2.0s_to_5.0s.wav`
pub fn trimmed_filename(range: &TimeRange, extension: &str) -> String {
    format!(
        "trimmed_audio_{:.1}s_to_{:.1}s.{}",
        range.start, range.end, extension
    )
}

/// The encoded output of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedArtifact {
    bytes: Vec<u8>,
    filename: String,
    range: TimeRange,
    frames: u64,
    sample_rate: u32,
}

impl EncodedArtifact {
    pub(crate) fn new(
        bytes: Vec<u8>,
        filename: String,
        range: TimeRange,
        frames: u64,
        sample_rate: u32,
    ) -> Self {
        EncodedArtifact {
            bytes,
            filename,
            range,
            frames,
            sample_rate,
        }
    }

    /// Get the container bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Get owned bytes (consumes the artifact)
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Get the suggested filename
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Get the requested trim window
    pub fn range(&self) -> TimeRange {
        self.range
    }

    /// Get number of frames in the output
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Get sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the playable duration of the output
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames as f64 / self.sample_rate as f64)
    }

    /// Write the bytes to `path`
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> TrimResult<()> {
        fs::write(path, &self.bytes)?;
        Ok(())
    }
}

/// The untrimmed source, offered for direct download when encoding times out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalArtifact {
    url: String,
    filename: String,
}

impl OriginalArtifact {
    /// Reference the source at `url`; the filename falls back to the URL's last path segment
    pub fn new(url: impl Into<String>, filename: Option<String>) -> Self {
        let url = url.into();
        let filename = filename
            .filter(|name| !name.is_empty())
            .or_else(|| filename_from_url(&url))
            .unwrap_or_else(|| DEFAULT_ORIGINAL_FILENAME.to_string());
        OriginalArtifact { url, filename }
    }

    /// Get the source URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the suggested filename
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Download the untrimmed payload
    pub fn download(
        &self,
        fetcher: &dyn Fetcher,
        listener: &mut dyn FetchListener,
    ) -> TrimResult<Vec<u8>> {
        fetcher.fetch(&self.url, listener)
    }
}

fn filename_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let last = path.rsplit('/').next()?;
    if last.contains('.') && !last.starts_with('.') {
        Some(last.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_trimmed_filename() {
        let range = TimeRange::new(2.0, 5.0).unwrap();
        assert_eq!(trimmed_filename(&range, "wav"), "trimmed_audio_2.0s_to_5.0s.wav");

        let range = TimeRange::new(12.34, 75.0).unwrap();
        assert_eq!(trimmed_filename(&range, "wav"), "trimmed_audio_12.3s_to_75.0s.wav");
    }

    #[test]
    fn test_original_filename() {
        let original = OriginalArtifact::new("https://host/audio/abc-123.mp3?x=1", None);
        assert_eq!(original.filename(), "abc-123.mp3");

        let original = OriginalArtifact::new("https://host/stream", None);
        assert_eq!(original.filename(), "audio.mp3");

        let original = OriginalArtifact::new("/tmp/in.m4a", Some("song.m4a".to_string()));
        assert_eq!(original.filename(), "song.m4a");
        assert_eq!(original.url(), "/tmp/in.m4a");
    }

    #[test]
    fn test_artifact_write() {
        let dir = TempDir::new().unwrap();
        let range = TimeRange::new(0.0, 1.0).unwrap();
        let artifact = EncodedArtifact::new(vec![1, 2, 3], "out.wav".into(), range, 8000, 8000);
        let path = dir.path().join(artifact.filename());

        artifact.write_to(&path).unwrap();

        assert_eq!(fs::read(&path).unwrap(), vec![1, 2, 3]);
        assert_eq!(artifact.duration(), Duration::from_secs(1));
        assert_eq!(artifact.into_bytes(), vec![1, 2, 3]);
    }
}
