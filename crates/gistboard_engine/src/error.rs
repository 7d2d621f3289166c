//! Error types for the board client.

use thiserror::Error;

/// Result type for document store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for board controller operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Errors raised by the document store and its transports.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Network-level failure (connect, DNS, timeout, TLS).
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the operation can be retried.
        retryable: bool,
    },

    /// The store answered with a non-2xx status.
    #[error("store returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The response body could not be understood.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A read failed on every attempt.
    #[error("document unavailable after {attempts} attempt(s): {last_error}")]
    Unavailable {
        /// Number of attempts made.
        attempts: u32,
        /// Message of the last failure.
        last_error: String,
    },

    /// A write failed on every attempt.
    #[error("write failed after {attempts} attempt(s): {last_error}")]
    WriteFailed {
        /// Number of attempts made.
        attempts: u32,
        /// Message of the last failure.
        last_error: String,
    },
}

impl StoreError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if this error can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Transport { retryable, .. } => *retryable,
            StoreError::Status { .. } => true,
            _ => false,
        }
    }
}

/// Errors raised by board operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// The message was empty or whitespace only.
    #[error("message is empty")]
    EmptyMessage,

    /// The message spans more than one line.
    #[error("message must be a single line")]
    MultilineMessage,

    /// The message exceeds the configured length.
    #[error("message too long ({len} chars, max {max})")]
    MessageTooLong {
        /// Length of the rejected message in characters.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The board could not be read.
    #[error("board is offline: {0}")]
    Offline(#[source] StoreError),

    /// The forced truncation write failed; nothing was appended.
    #[error("failed to clear board: {0}")]
    TruncateFailed(#[source] StoreError),

    /// The write failed; the message may not have been stored.
    #[error("failed to send message: {0}")]
    WriteFailed(#[source] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(StoreError::transport_retryable("connection reset").is_retryable());
        assert!(!StoreError::transport_fatal("bad url").is_retryable());
        assert!(StoreError::Status { status: 502 }.is_retryable());
        assert!(StoreError::Status { status: 401 }.is_retryable());
        assert!(!StoreError::Protocol("not json".into()).is_retryable());
    }

    #[test]
    fn error_display() {
        let err = StoreError::Unavailable {
            attempts: 3,
            last_error: "timed out".into(),
        };
        assert_eq!(
            err.to_string(),
            "document unavailable after 3 attempt(s): timed out"
        );

        let err = BoardError::MessageTooLong { len: 51, max: 50 };
        assert!(err.to_string().contains("51"));
        assert!(err.to_string().contains("50"));
    }
}
