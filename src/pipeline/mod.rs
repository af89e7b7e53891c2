//! Trim-and-encode orchestration
//!
//! One run walks `Fetching → Decoding → Selecting → Copying → Encoding →
//! Completed`, strictly in order. Any failure ends the run in `Error`; a
//! cancel ends it back in `Idle`. Each stage drops its input as soon as
//! its output exists.

pub mod artifact;
pub mod job;
mod reporter;

pub use artifact::{EncodedArtifact, OriginalArtifact, trimmed_filename};
pub use job::{Canceller, ControlMessage, RunControl, TrimJob};

use crate::core::{PipelineState, ProcessingStatus, TimeRange};
use crate::decoder::Decoder;
use crate::encoder::{OutputFormat, encode_progress};
use crate::error::{TrimError, TrimResult};
use crate::fetch::{FetchListener, FetchProgress, Fetcher};
use crate::processor::{TrimCopier, select};
use log::{info, warn};
use reporter::{
    COMBINE, COPY_END, COPY_START, DECODE, ENCODE_START, FETCH_START, FINALIZE, SELECT,
    StatusReporter, span_progress,
};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default deadline for the encode stage
pub const DEFAULT_ENCODE_TIMEOUT: Duration = Duration::from_secs(30);

/// How finely a run reports progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressDetail {
    /// Download progress and per-slice copy/encode progress
    #[default]
    Detailed,
    /// Stage transitions only
    Coarse,
}

/// Tunables of the pipeline
#[derive(Debug, Clone)]
pub struct TrimOptions {
    /// Deadline for the encode stage, measured from its start; `None` disables it
    pub encode_timeout: Option<Duration>,
    /// Audio length copied per slice
    pub copy_slice: Duration,
    /// Frames encoded per slice
    pub encode_slice_frames: usize,
    /// Progress granularity
    pub progress_detail: ProgressDetail,
    /// Output container
    pub output_format: OutputFormat,
}

impl Default for TrimOptions {
    fn default() -> Self {
        TrimOptions {
            encode_timeout: Some(DEFAULT_ENCODE_TIMEOUT),
            copy_slice: Duration::from_secs(1),
            encode_slice_frames: crate::encoder::wav::DEFAULT_SLICE_FRAMES,
            progress_detail: ProgressDetail::Detailed,
            output_format: OutputFormat::Wav,
        }
    }
}

impl TrimOptions {
    /// Set the encode deadline
    pub fn with_encode_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.encode_timeout = timeout;
        self
    }

    /// Set the copy slice length
    pub fn with_copy_slice(mut self, slice: Duration) -> Self {
        self.copy_slice = slice;
        self
    }

    /// Set the encode slice size in frames
    pub fn with_encode_slice_frames(mut self, frames: usize) -> Self {
        self.encode_slice_frames = frames;
        self
    }

    /// Set the progress granularity
    pub fn with_progress_detail(mut self, detail: ProgressDetail) -> Self {
        self.progress_detail = detail;
        self
    }

    /// Set the output container
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }
}

/// What to trim
#[derive(Debug, Clone, PartialEq)]
pub struct TrimRequest {
    /// Where the source payload lives (HTTP(S) URL, `file://` URL or path)
    pub source_url: String,
    /// Window to keep
    pub range: TimeRange,
    /// Display filename of the source, used for the fallback download
    pub source_filename: Option<String>,
}

impl TrimRequest {
    /// Create a request
    pub fn new(source_url: impl Into<String>, range: TimeRange) -> Self {
        TrimRequest {
            source_url: source_url.into(),
            range,
            source_filename: None,
        }
    }

    /// Set the source display filename
    pub fn with_source_filename(mut self, filename: impl Into<String>) -> Self {
        self.source_filename = Some(filename.into());
        self
    }

    /// The untrimmed source as a downloadable artifact
    pub fn original(&self) -> OriginalArtifact {
        OriginalArtifact::new(self.source_url.clone(), self.source_filename.clone())
    }
}

/// How a run ended
#[derive(Debug)]
pub enum TrimOutcome {
    /// Output ready
    Completed(EncodedArtifact),
    /// The run failed
    Failed {
        /// What went wrong
        error: TrimError,
        /// Untrimmed source to offer instead, set only for encode timeouts
        fallback: Option<OriginalArtifact>,
    },
    /// The caller cancelled the run
    Cancelled,
}

impl TrimOutcome {
    /// Get the artifact of a completed run
    pub fn artifact(&self) -> Option<&EncodedArtifact> {
        match self {
            TrimOutcome::Completed(artifact) => Some(artifact),
            _ => None,
        }
    }

    /// Get the error of a failed run
    pub fn error(&self) -> Option<&TrimError> {
        match self {
            TrimOutcome::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Get the fallback offered by a failed run
    pub fn fallback(&self) -> Option<&OriginalArtifact> {
        match self {
            TrimOutcome::Failed { fallback, .. } => fallback.as_ref(),
            _ => None,
        }
    }

    /// Convert into a `Result`, treating a cancel as [`TrimError::Cancelled`]
    pub fn into_result(self) -> TrimResult<EncodedArtifact> {
        match self {
            TrimOutcome::Completed(artifact) => Ok(artifact),
            TrimOutcome::Failed { error, .. } => Err(error),
            TrimOutcome::Cancelled => Err(TrimError::Cancelled),
        }
    }
}

/// Sequences fetch, decode, select, copy and encode for trim requests
///
/// The fetcher and decoder are long-lived handles owned by the host; every
/// run borrows them and keeps its own buffers, so runs never share state.
#[derive(Clone)]
pub struct Orchestrator {
    fetcher: Arc<dyn Fetcher>,
    decoder: Arc<dyn Decoder>,
    options: TrimOptions,
}

impl Orchestrator {
    /// Create an orchestrator with default options
    pub fn new(fetcher: Arc<dyn Fetcher>, decoder: Arc<dyn Decoder>) -> Self {
        Orchestrator {
            fetcher,
            decoder,
            options: TrimOptions::default(),
        }
    }

    /// Replace the options
    pub fn with_options(mut self, options: TrimOptions) -> Self {
        self.options = options;
        self
    }

    /// Get the options
    pub fn options(&self) -> &TrimOptions {
        &self.options
    }

    /// Get the fetcher, e.g. to download a fallback
    pub fn fetcher(&self) -> &dyn Fetcher {
        self.fetcher.as_ref()
    }

    /// Run `request` on the calling thread, sending every status to `sink`
    ///
    /// The status sequence ends with exactly one `Completed` or `Error`
    /// status, or with `Idle` when `control` cancelled the run.
    pub fn run(
        &self,
        request: &TrimRequest,
        control: &RunControl,
        sink: &mut dyn FnMut(ProcessingStatus),
    ) -> TrimOutcome {
        let mut reporter = StatusReporter::new(sink, self.options.progress_detail);
        info!(
            "Trimming {} [{:.3}s, {:.3}s)",
            request.source_url, request.range.start, request.range.end
        );

        match self.execute(request, control, &mut reporter) {
            Ok(artifact) => {
                reporter.complete("Download completed successfully");
                info!(
                    "Trimmed {} frames into {} ({} bytes)",
                    artifact.frames(),
                    artifact.filename(),
                    artifact.bytes().len()
                );
                TrimOutcome::Completed(artifact)
            }
            Err(TrimError::Cancelled) => {
                info!("Trim of {} cancelled", request.source_url);
                reporter.reset("Cancelled");
                TrimOutcome::Cancelled
            }
            Err(error) => {
                warn!("Trim of {} failed ({}): {}", request.source_url, error.kind().name(), error);
                reporter.fail(&error);
                let fallback = error.has_fallback().then(|| request.original());
                TrimOutcome::Failed { error, fallback }
            }
        }
    }

    /// Run `request` on a dedicated worker thread
    pub fn spawn(&self, request: TrimRequest) -> TrimResult<TrimJob> {
        let (status_tx, status_rx) = crossbeam_channel::unbounded();
        let (canceller, control) = RunControl::channel();
        let orchestrator = self.clone();

        let handle = thread::Builder::new()
            .name("trim-pipeline".to_string())
            .spawn(move || {
                let mut sink = |status: ProcessingStatus| {
                    let _ = status_tx.send(status);
                };
                orchestrator.run(&request, &control, &mut sink)
            })?;

        Ok(TrimJob::new(status_rx, canceller, handle))
    }

    fn execute(
        &self,
        request: &TrimRequest,
        control: &RunControl,
        reporter: &mut StatusReporter<'_>,
    ) -> TrimResult<EncodedArtifact> {
        // Reject a bad window before any work
        request.range.validate()?;
        control.check()?;

        reporter.enter(PipelineState::Fetching, 0, "Initializing download...");
        reporter.enter(PipelineState::Fetching, FETCH_START, "Downloading audio file...");
        let payload = {
            let mut listener = StageListener {
                control,
                reporter: &mut *reporter,
            };
            self.fetcher.fetch(&request.source_url, &mut listener)?
        };
        control.check()?;

        reporter.enter(PipelineState::Decoding, COMBINE, "Processing audio data...");
        reporter.enter(PipelineState::Decoding, DECODE, "Decoding audio...");
        let decoded = self.decoder.decode(payload)?;
        control.check()?;

        reporter.enter(PipelineState::Selecting, SELECT, "Selecting trim range...");
        let range = select(&decoded, &request.range)?;

        reporter.enter(PipelineState::Copying, COPY_START, "Creating trimmed audio...");
        let copier = TrimCopier::new(self.options.copy_slice);
        let trimmed = copier.copy_with(&decoded, &range, &mut |done, total| {
            control.check()?;
            let overall = span_progress(COPY_START, COPY_END, done, total);
            reporter.slice(PipelineState::Copying, overall, done, total, "Creating trimmed audio");
            Ok(())
        })?;
        drop(decoded);

        reporter.enter(PipelineState::Encoding, ENCODE_START, "Converting to WAV format...");
        let encoder = self
            .options
            .output_format
            .encoder(self.options.encode_slice_frames);
        let limit = self.options.encode_timeout;
        let started = Instant::now();
        let bytes = encoder.encode_with(&trimmed, &mut |done, total| {
            control.check()?;
            if let Some(limit) = limit {
                if started.elapsed() >= limit {
                    return Err(TrimError::EncodeTimeout { limit });
                }
            }
            let overall = encode_progress(done, total);
            reporter.slice(PipelineState::Encoding, overall, done, total, "Converting to WAV");
            Ok(())
        })?;

        let frames = trimmed.frames();
        let sample_rate = trimmed.sample_rate();
        drop(trimmed);

        reporter.enter(PipelineState::Encoding, FINALIZE, "Preparing download...");
        let filename = trimmed_filename(&request.range, encoder.extension());
        Ok(EncodedArtifact::new(
            bytes,
            filename,
            request.range,
            frames,
            sample_rate,
        ))
    }
}

/// Bridges fetch events to the run's control and status reporter
struct StageListener<'r, 'a> {
    control: &'r RunControl,
    reporter: &'r mut StatusReporter<'a>,
}

impl FetchListener for StageListener<'_, '_> {
    fn on_chunk(&mut self, _received: u64) -> TrimResult<()> {
        self.control.check()
    }

    fn on_progress(&mut self, progress: FetchProgress) {
        self.reporter.fetch(progress);
    }
}
