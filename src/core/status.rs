use crate::error::{ErrorKind, TrimError};

/// State of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    /// Nothing running (initial state, and the state after a cancel)
    Idle,
    /// Downloading the source artifact
    Fetching,
    /// Decoding the payload into PCM
    Decoding,
    /// Resolving the trim window to frame offsets
    Selecting,
    /// Copying the selected frames
    Copying,
    /// Writing the output container
    Encoding,
    /// Output ready
    Completed,
    /// Run failed
    Error,
}

/// Coarse status tag, as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    /// Nothing running
    Idle,
    /// External extraction collaborator at work
    Extracting,
    /// Trim pipeline at work
    Trimming,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Error,
}

impl PipelineState {
    /// Map the pipeline state to the coarse status tag
    pub fn kind(&self) -> StatusKind {
        match self {
            PipelineState::Idle => StatusKind::Idle,
            PipelineState::Fetching
            | PipelineState::Decoding
            | PipelineState::Selecting
            | PipelineState::Copying
            | PipelineState::Encoding => StatusKind::Trimming,
            PipelineState::Completed => StatusKind::Completed,
            PipelineState::Error => StatusKind::Error,
        }
    }

    /// Whether a run ends in this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Completed | PipelineState::Error)
    }

    /// Get state name
    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Fetching => "fetching",
            PipelineState::Decoding => "decoding",
            PipelineState::Selecting => "selecting",
            PipelineState::Copying => "copying",
            PipelineState::Encoding => "encoding",
            PipelineState::Completed => "completed",
            PipelineState::Error => "error",
        }
    }
}

/// One observation of pipeline progress
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingStatus {
    /// Current state
    pub state: PipelineState,
    /// Overall progress, 0-100
    pub progress: u8,
    /// Human-readable message
    pub message: String,
    /// Error kind, set only when `state` is `Error`
    pub error: Option<ErrorKind>,
}

impl ProcessingStatus {
    /// The status before any run
    pub fn idle() -> Self {
        ProcessingStatus {
            state: PipelineState::Idle,
            progress: 0,
            message: String::new(),
            error: None,
        }
    }

    /// A working or completed status
    pub fn new(state: PipelineState, progress: u8, message: impl Into<String>) -> Self {
        ProcessingStatus {
            state,
            progress: progress.min(100),
            message: message.into(),
            error: None,
        }
    }

    /// A terminal error status for `err`
    pub fn failed(err: &TrimError) -> Self {
        ProcessingStatus {
            state: PipelineState::Error,
            progress: 0,
            message: err.to_string(),
            error: Some(err.kind()),
        }
    }

    /// Get the coarse status tag
    pub fn kind(&self) -> StatusKind {
        self.state.kind()
    }
}

impl Default for ProcessingStatus {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_kinds() {
        assert_eq!(PipelineState::Idle.kind(), StatusKind::Idle);
        assert_eq!(PipelineState::Copying.kind(), StatusKind::Trimming);
        assert_eq!(PipelineState::Encoding.kind(), StatusKind::Trimming);
        assert!(PipelineState::Completed.is_terminal());
        assert!(PipelineState::Error.is_terminal());
        assert!(!PipelineState::Idle.is_terminal());
    }

    #[test]
    fn test_failed_status_carries_kind() {
        let status = ProcessingStatus::failed(&TrimError::Decode("bad header".into()));
        assert_eq!(status.state, PipelineState::Error);
        assert_eq!(status.error, Some(ErrorKind::Decode));
        assert_eq!(status.progress, 0);
        assert!(status.message.contains("bad header"));
    }

    #[test]
    fn test_progress_capped() {
        let status = ProcessingStatus::new(PipelineState::Encoding, 140, "x");
        assert_eq!(status.progress, 100);
    }
}
