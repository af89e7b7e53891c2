//! Streaming retrieval of source payloads

pub mod file;
pub mod http;

pub use file::FileFetcher;
pub use http::HttpFetcher;

use crate::error::{TrimError, TrimResult};
use std::io::{ErrorKind, Read};

/// Bytes read from the source per call
pub const READ_CHUNK_LEN: usize = 64 * 1024;

/// Minimum distance between two progress reports
pub const MIN_PROGRESS_STEP: u64 = 1024 * 1024;

/// Upper bound on up-front allocation from a declared content length
const MAX_PREALLOC: u64 = 256 * 1024 * 1024;

/// Trait for sources that deliver a complete payload
pub trait Fetcher: Send + Sync {
    /// Retrieve the full body behind `url`
    fn fetch(&self, url: &str, listener: &mut dyn FetchListener) -> TrimResult<Vec<u8>>;
}

/// Byte-level progress of one transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchProgress {
    /// Bytes received so far
    pub received: u64,
    /// Declared payload size, if the source announced one
    pub total: Option<u64>,
}

impl FetchProgress {
    /// Fraction received in `0.0..=1.0`, or `None` when indeterminate
    pub fn fraction(&self) -> Option<f64> {
        match self.total {
            Some(0) => Some(1.0),
            Some(total) => Some((self.received as f64 / total as f64).min(1.0)),
            None => None,
        }
    }
}

/// Observer of a running transfer
pub trait FetchListener {
    /// Called after every chunk; an error aborts the transfer
    fn on_chunk(&mut self, _received: u64) -> TrimResult<()> {
        Ok(())
    }

    /// Called when received bytes cross the next reporting threshold, and once at the end
    fn on_progress(&mut self, progress: FetchProgress);
}

impl<F: FnMut(FetchProgress)> FetchListener for F {
    fn on_progress(&mut self, progress: FetchProgress) {
        self(progress)
    }
}

/// Listener that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl FetchListener for NoProgress {
    fn on_progress(&mut self, _progress: FetchProgress) {}
}

/// Decides when cumulative byte counts deserve a progress report
///
/// The step is `max(5% of total, 1 MiB)`; without a known total it is 1 MiB.
#[derive(Debug, Clone)]
pub struct ProgressGate {
    step: u64,
    next: u64,
    last_reported: Option<u64>,
}

impl ProgressGate {
    /// Create a gate for a payload of `total` bytes
    pub fn new(total: Option<u64>) -> Self {
        let step = total
            .map(|t| (t / 20).max(MIN_PROGRESS_STEP))
            .unwrap_or(MIN_PROGRESS_STEP);
        ProgressGate {
            step,
            next: step,
            last_reported: None,
        }
    }

    /// Get the reporting step in bytes
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Whether `received` crossed a threshold since the last report
    pub fn crossed(&mut self, received: u64) -> bool {
        if received < self.next {
            return false;
        }
        self.next = (received / self.step + 1) * self.step;
        self.last_reported = Some(received);
        true
    }

    /// Whether the final count still needs a report
    pub fn needs_final(&self, received: u64) -> bool {
        self.last_reported != Some(received)
    }
}

/// Read `reader` to the end, in bounded chunks, reporting to `listener`
///
/// IO failures surface as [`TrimError::Transfer`]. A body shorter than
/// the declared `total` is a transfer failure too.
pub fn read_body<R: Read>(
    mut reader: R,
    total: Option<u64>,
    listener: &mut dyn FetchListener,
) -> TrimResult<Vec<u8>> {
    let capacity = total.map(|t| t.min(MAX_PREALLOC) as usize).unwrap_or(0);
    let mut body = Vec::with_capacity(capacity);
    let mut chunk = vec![0u8; READ_CHUNK_LEN];
    let mut gate = ProgressGate::new(total);

    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(TrimError::Transfer(format!(
                    "stream failed after {} bytes: {}",
                    body.len(),
                    e
                )));
            }
        };

        body.extend_from_slice(&chunk[..n]);
        let received = body.len() as u64;
        listener.on_chunk(received)?;
        if gate.crossed(received) {
            listener.on_progress(FetchProgress { received, total });
        }
    }

    let received = body.len() as u64;
    if let Some(total) = total {
        if received < total {
            return Err(TrimError::Transfer(format!(
                "stream ended after {} of {} bytes",
                received, total
            )));
        }
    }
    if gate.needs_final(received) {
        listener.on_progress(FetchProgress { received, total });
    }

    Ok(body)
}

/// Fetcher that picks HTTP or file access from the URL scheme
pub struct DefaultFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

impl DefaultFetcher {
    /// Create a fetcher with default HTTP settings
    pub fn new() -> TrimResult<Self> {
        Ok(Self::with_http(HttpFetcher::new()?))
    }

    /// Create a fetcher around a configured HTTP fetcher
    pub fn with_http(http: HttpFetcher) -> Self {
        DefaultFetcher {
            http,
            file: FileFetcher,
        }
    }
}

/// Whether `url` names an HTTP(S) resource
pub fn is_http_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

impl Fetcher for DefaultFetcher {
    fn fetch(&self, url: &str, listener: &mut dyn FetchListener) -> TrimResult<Vec<u8>> {
        if is_http_url(url) {
            self.http.fetch(url, listener)
        } else {
            self.file.fetch(url, listener)
        }
    }
}
