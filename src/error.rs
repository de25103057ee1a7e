//! Error handling module for the docker archive writer
//!
//! Every failure surfaced by this crate is archive-fatal: tar is an append-only
//! format, so once an entry header has been written there is no way to roll it
//! back. Callers should discard the destination on any error.

use thiserror::Error;

/// Broad classes of failure, used by callers that only care about the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Missing or malformed input (digests, configs, manifests, usage errors).
    InvalidInput,
    /// The underlying stream could not be written or a payload could not be read.
    IoFailure,
    /// The payload did not match the size committed in its tar header.
    IntegrityViolation,
}

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Error unmarshaling config: {0}")]
    ConfigUnmarshal(#[source] serde_json::Error),

    #[error("Error parsing manifest: {0}")]
    ManifestParse(#[source] serde_json::Error),

    #[error("Error marshaling {what}: {source}")]
    Serialization {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Size mismatch when copying {path}, expected {expected}, got {actual}")]
    SizeMismatch {
        path: String,
        expected: u64,
        actual: u64,
    },
}

impl ArchiveError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        ArchiveError::InvalidInput(msg.into())
    }

    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        ArchiveError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn serialization(what: &'static str, source: serde_json::Error) -> Self {
        ArchiveError::Serialization { what, source }
    }

    /// Returns the failure class this error belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            ArchiveError::InvalidInput(_)
            | ArchiveError::ConfigUnmarshal(_)
            | ArchiveError::ManifestParse(_) => ErrorClass::InvalidInput,
            ArchiveError::Serialization { .. } | ArchiveError::Io { .. } => ErrorClass::IoFailure,
            ArchiveError::SizeMismatch { .. } => ErrorClass::IntegrityViolation,
        }
    }
}

pub type Result<T> = std::result::Result<T, ArchiveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_mismatch_message_names_path_and_sizes() {
        let err = ArchiveError::SizeMismatch {
            path: "abc.tar".to_string(),
            expected: 10,
            actual: 7,
        };
        assert_eq!(
            err.to_string(),
            "Size mismatch when copying abc.tar, expected 10, got 7"
        );
        assert_eq!(err.class(), ErrorClass::IntegrityViolation);
    }

    #[test]
    fn test_error_classes() {
        let bad_json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(
            ArchiveError::ConfigUnmarshal(bad_json).class(),
            ErrorClass::InvalidInput
        );
        assert_eq!(
            ArchiveError::invalid_input("empty digest").class(),
            ErrorClass::InvalidInput
        );
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err = ArchiveError::io("manifest.json", io);
        assert_eq!(err.class(), ErrorClass::IoFailure);
        assert!(err.to_string().contains("manifest.json"));
    }
}
