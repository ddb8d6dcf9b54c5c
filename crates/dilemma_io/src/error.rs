//! Error types for dilemma_io crate.
//!
//! Checkpoint decoding failures name the tag or field at fault so a corrupt
//! file can be diagnosed without a debugger.

use thiserror::Error;

/// Main error type for dilemma_io operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// File system errors
    #[error(transparent)]
    FileSystem(#[from] std::io::Error),

    /// Checkpoint written by an incompatible format version
    #[error("Unsupported checkpoint version `{found}` (expected `{expected}`)")]
    Version { expected: String, found: String },

    /// A structural `#TAG` line is missing or wrong
    #[error("Line {line}: expected tag `#{expected}`, found `{found}`")]
    Tag {
        line: usize,
        expected: String,
        found: String,
    },

    /// A `name=value` field is missing, malformed or out of range
    #[error("Line {line}: field `{name}`: {reason}")]
    Field {
        line: usize,
        name: String,
        reason: String,
    },

    /// Input ended before the named element
    #[error("Unexpected end of checkpoint, expected {0}")]
    Truncated(String),

    /// Decoded values that are individually valid but inconsistent
    #[error("Validation error: {0}")]
    Validation(String),

    /// Generic error with context. The inner message is part of the
    /// display, so it is not also reported as the source.
    #[error("{context}: {inner}")]
    Context {
        context: String,
        inner: Box<IoError>,
    },
}

/// Result type alias for dilemma_io operations.
pub type Result<T> = std::result::Result<T, IoError>;

impl IoError {
    /// Creates a new validation error.
    #[must_use]
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a new field error.
    #[must_use]
    pub fn field<N: Into<String>, S: Into<String>>(line: usize, name: N, reason: S) -> Self {
        Self::Field {
            line,
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Wraps an error with additional context.
    #[must_use]
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            inner: Box::new(self),
        }
    }
}
