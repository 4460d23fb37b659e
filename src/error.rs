//! Error types for the tagwire codec

use thiserror::Error;

/// Errors that can occur while building or parsing a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// Tag outside `0..=MAX_TAG`
    #[error("invalid tag: {0}")]
    InvalidTag(u32),
    /// Parser was asked to read zero bytes
    #[error("parser length must be a positive number")]
    InvalidLength,
    /// In-memory source is shorter than the range the parser was asked to read
    #[error("source holds {available} bytes but the parser needs {required}")]
    SourceTooShort {
        /// Bytes held by the source
        available: usize,
        /// End position requested by the caller
        required: usize,
    },
    /// Value does not fit in a varint
    #[error("value {0} exceeds the varint limit")]
    VarintOutOfRange(u64),
    /// Byte array element that is not a single byte
    #[error("given value for input byte {0}")]
    InvalidInputByte(&'static str),
    /// Buffer too small for the encoded value
    #[error("buffer too small for operation")]
    ShortBuffer,
    /// Ran out of data while reading
    #[error("unexpected end of data")]
    UnexpectedEof,
    /// Varint did not terminate within the maximum length
    #[error("reading varint past maximum length")]
    VarintTooLong,
    /// Typed getter does not match the currently parsed value
    #[error("currently parsed value is not {expected}")]
    ValueMismatch {
        /// Kind of value the getter wanted
        expected: &'static str,
    },
    /// String value is not valid UTF-8
    #[error("currently parsed value is not valid UTF-8")]
    InvalidUtf8,
    /// Header carries a type code this format does not define
    #[error("unknown value type {0}")]
    UnknownValueType(u8),
    /// Codec invariant violated
    #[error("internal codec error: {0}")]
    Internal(&'static str),
    /// Underlying stream failed
    #[cfg(feature = "std")]
    #[error("i/o error: {0:?}")]
    Io(std::io::ErrorKind),
}

/// Failure class an [`Error`] belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller broke the API contract
    InvalidArgument,
    /// A value could not be written
    Serialization,
    /// Bytes could not be read back into a value
    Unserialization,
    /// Bug in the codec itself
    Internal,
    /// The backing stream reported an error
    Io,
}

impl Error {
    /// Returns the failure class of this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidTag(_) | Error::InvalidLength | Error::SourceTooShort { .. } => {
                ErrorKind::InvalidArgument
            }
            Error::VarintOutOfRange(_) | Error::InvalidInputByte(_) | Error::ShortBuffer => {
                ErrorKind::Serialization
            }
            Error::UnexpectedEof
            | Error::VarintTooLong
            | Error::ValueMismatch { .. }
            | Error::InvalidUtf8
            | Error::UnknownValueType(_) => ErrorKind::Unserialization,
            Error::Internal(_) => ErrorKind::Internal,
            #[cfg(feature = "std")]
            Error::Io(_) => ErrorKind::Io,
        }
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => Error::UnexpectedEof,
            kind => Error::Io(kind),
        }
    }
}

/// Result type alias for tagwire operations
pub type Result<T> = core::result::Result<T, Error>;
