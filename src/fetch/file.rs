use super::{FetchListener, Fetcher, read_body};
use crate::error::{TrimError, TrimResult};
use log::info;
use reqwest::Url;
use std::fs::File;
use std::path::PathBuf;

/// Fetcher for local files, given as plain paths or `file://` URLs
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

impl FileFetcher {
    /// Resolve `url` to a filesystem path
    ///
    /// `file://` URLs are percent-decoded; anything else is taken as a raw path.
    pub fn path_for(url: &str) -> PathBuf {
        match url.strip_prefix("file://") {
            Some(raw) => Url::parse(url)
                .ok()
                .and_then(|parsed| parsed.to_file_path().ok())
                .unwrap_or_else(|| PathBuf::from(raw)),
            None => PathBuf::from(url),
        }
    }
}

impl Fetcher for FileFetcher {
    fn fetch(&self, url: &str, listener: &mut dyn FetchListener) -> TrimResult<Vec<u8>> {
        let path = Self::path_for(url);
        let file = File::open(&path)
            .map_err(|e| TrimError::Network(format!("cannot open {}: {}", path.display(), e)))?;
        let total = file.metadata().ok().map(|m| m.len());
        info!("Reading {}", path.display());

        read_body(file, total, listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::fetch::{FetchProgress, NoProgress};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_path_for() {
        assert_eq!(FileFetcher::path_for("file:///tmp/a.mp3"), PathBuf::from("/tmp/a.mp3"));
        assert_eq!(FileFetcher::path_for("/tmp/a.mp3"), PathBuf::from("/tmp/a.mp3"));
        assert_eq!(
            FileFetcher::path_for("file:///tmp/my%20song.mp3"),
            PathBuf::from("/tmp/my song.mp3")
        );
        // Raw paths keep their percent signs
        assert_eq!(FileFetcher::path_for("/tmp/100%25.mp3"), PathBuf::from("/tmp/100%25.mp3"));
    }

    #[test]
    fn test_fetch_percent_encoded_file_url() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("my song.mp3");
        std::fs::write(&path, b"spaced").unwrap();
        let url = format!("file://{}", path.display()).replace(' ', "%20");

        let body = FileFetcher.fetch(&url, &mut NoProgress).unwrap();
        assert_eq!(body, b"spaced");
    }

    #[test]
    fn test_fetch_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"payload bytes").unwrap();
        let url = format!("file://{}", temp_file.path().display());

        let mut events: Vec<FetchProgress> = Vec::new();
        let mut listener = |p: FetchProgress| events.push(p);
        let body = FileFetcher.fetch(&url, &mut listener).unwrap();

        assert_eq!(body, b"payload bytes");
        assert_eq!(
            events,
            vec![FetchProgress {
                received: 13,
                total: Some(13)
            }]
        );
    }

    #[test]
    fn test_missing_file_is_network_error() {
        let err = FileFetcher
            .fetch("/nonexistent/file.mp3", &mut NoProgress)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
    }
}
