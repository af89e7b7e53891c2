//! Core audio types and structures

/// Audio buffer and trim window types
pub mod audio;
/// Pipeline states and status reports
pub mod status;
/// Time formatting helpers
pub mod time;

pub use audio::{AudioBuffer, SampleRange, TimeRange};
pub use status::{PipelineState, ProcessingStatus, StatusKind};
pub use time::format_clock;
