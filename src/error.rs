use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type for trim pipeline operations
pub type TrimResult<T> = Result<T, TrimError>;

/// Failure taxonomy of the trim pipeline
///
/// Every stage reports its failure through one of these variants. The
/// orchestrator turns them into a terminal `Error` status, except
/// [`TrimError::Cancelled`] which ends a run back in `Idle`.
#[derive(Error, Debug)]
pub enum TrimError {
    /// The transfer could not start: connection failure, non-2xx status,
    /// unreadable source file
    #[error("Network error: {0}")]
    Network(String),

    /// The transfer started but the stream was interrupted
    #[error("Transfer interrupted: {0}")]
    Transfer(String),

    /// The payload could not be decoded as audio
    #[error("Decode error: {0}")]
    Decode(String),

    /// The requested time range is invalid or cannot be satisfied
    #[error("Invalid trim range: {0}")]
    Range(String),

    /// Container encoding exceeded its deadline
    #[error("WAV conversion timed out after {:.1}s", .limit.as_secs_f64())]
    EncodeTimeout {
        /// The deadline that was exceeded
        limit: Duration,
    },

    /// An internal invariant was violated
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error while persisting an artifact
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The run was cancelled by the caller
    #[error("Cancelled")]
    Cancelled,
}

/// Kind of a [`TrimError`], without the attached message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`TrimError::Network`]
    Network,
    /// See [`TrimError::Transfer`]
    Transfer,
    /// See [`TrimError::Decode`]
    Decode,
    /// See [`TrimError::Range`]
    Range,
    /// See [`TrimError::EncodeTimeout`]
    EncodeTimeout,
    /// See [`TrimError::Internal`]
    Internal,
    /// See [`TrimError::Io`]
    Io,
    /// See [`TrimError::Cancelled`]
    Cancelled,
}

impl ErrorKind {
    /// Short lowercase name, used in status messages and logs
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Transfer => "transfer",
            ErrorKind::Decode => "decode",
            ErrorKind::Range => "range",
            ErrorKind::EncodeTimeout => "encode-timeout",
            ErrorKind::Internal => "internal",
            ErrorKind::Io => "io",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl TrimError {
    /// Get the taxonomy kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrimError::Network(_) => ErrorKind::Network,
            TrimError::Transfer(_) => ErrorKind::Transfer,
            TrimError::Decode(_) => ErrorKind::Decode,
            TrimError::Range(_) => ErrorKind::Range,
            TrimError::EncodeTimeout { .. } => ErrorKind::EncodeTimeout,
            TrimError::Internal(_) => ErrorKind::Internal,
            TrimError::Io(_) => ErrorKind::Io,
            TrimError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Whether this error has a defined recovery path (download the original)
    pub fn has_fallback(&self) -> bool {
        matches!(self, TrimError::EncodeTimeout { .. })
    }
}

impl From<symphonia::core::errors::Error> for TrimError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        TrimError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(TrimError::Network("x".into()).kind(), ErrorKind::Network);
        assert_eq!(TrimError::Range("x".into()).kind(), ErrorKind::Range);
        assert_eq!(TrimError::Cancelled.kind(), ErrorKind::Cancelled);
        let io = TrimError::from(io::Error::new(io::ErrorKind::Other, "disk"));
        assert_eq!(io.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_messages_are_distinguishable() {
        let timeout = TrimError::EncodeTimeout {
            limit: Duration::from_secs(30),
        };
        assert_eq!(timeout.to_string(), "WAV conversion timed out after 30.0s");
        assert!(timeout.has_fallback());

        let range = TrimError::Range("start must be before end".into());
        assert!(range.to_string().contains("Invalid trim range"));
        assert!(!range.has_fallback());
    }
}
