use thiserror::Error;

/// Specific kinds of failures that can occur when decoding an engine value
/// into one of the codec types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeErrorKind {
    #[error("cannot decode {target} from {shape} input")]
    UnsupportedShape {
        target: &'static str,
        shape: &'static str,
    },

    #[error("malformed {target} text: {reason}")]
    MalformedText {
        target: &'static str,
        reason: String,
    },

    #[error("invalid UTF-8 in byte input")]
    InvalidUtf8,

    #[error("invalid numeric text: {0:?}")]
    InvalidNumber(String),

    #[error("invalid bit character {found:?} at position {position}")]
    InvalidBit { found: char, position: usize },

    #[error("bit string length mismatch: declared {declared}, got {actual}")]
    BitLengthMismatch { declared: usize, actual: usize },
}

/// Error type returned when decoding an engine value fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("decode error: {kind}")]
pub struct DecodeError {
    kind: DecodeErrorKind,
}

impl DecodeError {
    /// Creates a new DecodeError with the given kind.
    pub const fn new(kind: DecodeErrorKind) -> Self {
        Self { kind }
    }

    /// Returns the specific kind of decode error that occurred.
    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }

    pub(crate) fn unsupported(target: &'static str, shape: &'static str) -> Self {
        tracing::trace!(target_type = target, shape, "rejected input shape");
        Self::new(DecodeErrorKind::UnsupportedShape { target, shape })
    }

    pub(crate) fn malformed(target: &'static str, reason: impl Into<String>) -> Self {
        Self::new(DecodeErrorKind::MalformedText {
            target,
            reason: reason.into(),
        })
    }
}

/// Result type for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Specific kinds of failures that can occur when encoding a value or
/// rendering a SQL fragment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeErrorKind {
    #[error("invalid selection {selected:?} for enum {name:?}")]
    InvalidSelection { name: String, selected: String },

    #[error("unsupported descriptor kind: {0:?}")]
    UnsupportedDescriptorKind(String),

    #[error("descriptor is missing required field {0:?}")]
    MissingField(&'static str),

    #[error("serialization failed: {0}")]
    Serialize(String),
}

/// Error type returned when encoding a value fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("encode error: {kind}")]
pub struct EncodeError {
    kind: EncodeErrorKind,
}

impl EncodeError {
    /// Creates a new EncodeError with the given kind.
    pub fn new(kind: EncodeErrorKind) -> Self {
        Self { kind }
    }

    /// Returns the specific kind of encode error that occurred.
    pub fn kind(&self) -> &EncodeErrorKind {
        &self.kind
    }
}

impl From<serde_json::Error> for EncodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(EncodeErrorKind::Serialize(err.to_string()))
    }
}

/// Result type for encode operations.
pub type EncodeResult<T> = Result<T, EncodeError>;
