//! ccrepl Error Types

use thiserror::Error;

use crate::version::Version;

/// Result type alias for ccrepl operations
pub type Result<T> = std::result::Result<T, Error>;

/// ccrepl error types
#[derive(Error, Debug)]
pub enum Error {
    // Construction errors
    #[error("Invalid argument `{field}`: {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    // Binary codec errors
    #[error("Truncated or malformed binary task parameters: {0}")]
    TruncatedOrMalformedBinary(String),

    // Document codec errors
    #[error("Required field `{field}` is missing")]
    MissingField { field: &'static str },

    #[error("Malformed task parameter document: {0}")]
    MalformedDocument(#[from] serde_json::Error),

    // Host framework errors
    #[error("Unsupported version: task parameters require {required}, node is {actual}")]
    UnsupportedVersion { required: Version, actual: Version },

    #[error("Unknown task type: {0}")]
    UnknownTaskType(String),

    #[error("Task type already registered: {0}")]
    DuplicateTaskType(String),

    #[error("Invalid version string: {0}")]
    InvalidVersion(String),

    // Persistence errors
    #[error("Persisted task state corrupted: {0}")]
    Corrupted(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::TruncatedOrMalformedBinary(err.to_string())
    }
}

impl Error {
    /// The offending field, when the error is tied to one
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Error::InvalidArgument { field, .. } | Error::MissingField { field } => Some(*field),
            _ => None,
        }
    }

    /// Check if this error is retryable
    ///
    /// Only I/O against the backing file may succeed on a second attempt;
    /// decode failures are final for the task that owns the parameters.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Io(_))
    }

    /// Check if this error should fail the owning task instead of being retried
    pub fn fails_task(&self) -> bool {
        matches!(
            self,
            Error::TruncatedOrMalformedBinary(_)
                | Error::MissingField { .. }
                | Error::MalformedDocument(_)
                | Error::UnsupportedVersion { .. }
                | Error::UnknownTaskType(_)
                | Error::Corrupted(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_is_reported() {
        let err = Error::MissingField { field: "follower_index" };
        assert_eq!(err.field(), Some("follower_index"));
        assert!(err.to_string().contains("follower_index"));

        let err = Error::Corrupted("bad crc".into());
        assert_eq!(err.field(), None);
    }

    #[test]
    fn test_decode_errors_fail_the_task() {
        assert!(Error::TruncatedOrMalformedBinary("eof".into()).fails_task());
        assert!(!Error::TruncatedOrMalformedBinary("eof".into()).is_retryable());
        assert!(Error::Io(std::io::Error::other("disk")).is_retryable());
    }
}
