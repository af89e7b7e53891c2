#![warn(missing_docs)]

//! # audio-trim: fetch, trim and re-encode audio
//!
//! Downloads a compressed audio file, decodes it to PCM, keeps a
//! `[start, end)` window and encodes that window as a 16-bit PCM WAV file.
//!
//! ## Features
//!
//! - **Fetch** - HTTP(S) via `reqwest`, local files, with download progress
//! - **Decode** - MP3, FLAC, WAV, OGG, AAC via Symphonia
//! - **Trim** - Sample-accurate window selection, sliced copy
//! - **Encode** - Canonical 44-byte-header WAV
//! - **Pipeline** - Ordered stages, monotonic progress, cancellation and an
//!   encode deadline with the untrimmed source as fallback
//!
//! ## Quick Start
//!
//! ```ignore
//! use audio_trim::{DefaultFetcher, Orchestrator, RunControl, SymphoniaDecoder, TimeRange, TrimRequest};
//! use std::sync::Arc;
//!
//! let orchestrator = Orchestrator::new(
//!     Arc::new(DefaultFetcher::new()?),
//!     Arc::new(SymphoniaDecoder::new()),
//! );
//! let request = TrimRequest::new("https://example.com/song.mp3", TimeRange::new(2.0, 5.0)?);
//!
//! let job = orchestrator.spawn(request)?;
//! for status in job.statuses() {
//!     println!("{}% {}", status.progress, status.message);
//! }
//! let artifact = job.wait().into_result()?;
//! artifact.write_to(artifact.filename())?;
//! ```

/// Core audio types and structures
pub mod core;
/// Error types for trim operations
pub mod error;
/// Payload fetchers
pub mod fetch;
/// Audio decoder implementations
pub mod decoder;
/// Trim window selection and copying
pub mod processor;
/// Audio encoder implementations
pub mod encoder;
/// Stage orchestration
pub mod pipeline;

pub use crate::core::{AudioBuffer, PipelineState, ProcessingStatus, SampleRange, StatusKind, TimeRange};
pub use crate::decoder::{Decoder, SymphoniaDecoder};
pub use crate::encoder::{ContainerEncoder, OutputFormat, WavEncoder};
pub use crate::error::{ErrorKind, TrimError, TrimResult};
pub use crate::fetch::{DefaultFetcher, FetchProgress, Fetcher, FileFetcher, HttpFetcher};
pub use crate::pipeline::{
    EncodedArtifact, Orchestrator, OriginalArtifact, ProgressDetail, RunControl, TrimJob,
    TrimOptions, TrimOutcome, TrimRequest,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
