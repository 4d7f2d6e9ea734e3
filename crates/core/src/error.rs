//! Error types for the huffpack codec and container engine.
//!
//! All operations return structured errors rather than panicking.
//! Every failure the core can produce falls into one of these kinds:
//! - `EmptyInput`: nothing to compress
//! - `InvalidFormat`: the archive header does not parse
//! - `IncompleteData`: a declared length exceeds the bytes actually present
//! - `CorruptStream`: packed bits or boundaries are inconsistent with the metadata
//! - `MissingSource`: a named input could not be obtained
//!
//! All operations are deterministic, so nothing is retried internally:
//! re-reading a malformed archive cannot succeed.

use thiserror::Error;

/// Top-level error type for all core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No data to compress (empty buffer, or empty file list).
    #[error("empty input: {reason}")]
    EmptyInput {
        /// What was found empty
        reason: &'static str,
    },

    /// Archive header cannot be parsed, or a field is nonsensical.
    #[error("invalid archive format: {reason}")]
    InvalidFormat {
        /// Why the header was rejected
        reason: String,
    },

    /// A declared header/payload length exceeds the available bytes.
    #[error("incomplete {section}: declared {declared} bytes, {available} available")]
    IncompleteData {
        /// Which region of the archive fell short
        section: &'static str,
        /// Bytes the length field promised
        declared: usize,
        /// Bytes actually present
        available: usize,
    },

    /// Bit sequence does not decode cleanly against the supplied tree,
    /// or recorded file boundaries are inconsistent with the payload.
    #[error("corrupt stream: {reason}")]
    CorruptStream {
        /// What failed to decode
        reason: String,
    },

    /// A named input could not be obtained by the file-I/O collaborator.
    #[error("missing source {name:?}: {source}")]
    MissingSource {
        /// Identifier of the input that could not be read
        name: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// File I/O error (collaborator layer only; the core itself does no I/O).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for `InvalidFormat` with a formatted reason.
    pub(crate) fn invalid_format(reason: impl Into<String>) -> Self {
        Error::InvalidFormat {
            reason: reason.into(),
        }
    }

    /// Shorthand for `CorruptStream` with a formatted reason.
    pub(crate) fn corrupt_stream(reason: impl Into<String>) -> Self {
        Error::CorruptStream {
            reason: reason.into(),
        }
    }
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
