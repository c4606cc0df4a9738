//! Error types for storage operations.

use std::fmt;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while storing or retrieving primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Attempted to read past the end of the buffer.
    UnexpectedEof {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// Attempted to write past the capacity of a bounded writer.
    BufferOverflow {
        /// Number of bytes the write needed.
        attempted: usize,
        /// Remaining capacity in bytes.
        capacity: usize,
    },

    /// A length does not fit in the signed 32-bit wire prefix.
    LengthOverflow { length: usize },

    /// A length prefix read from the wire was negative.
    NegativeLength { value: i32 },

    /// A configured limit was exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// String bytes were not valid UTF-8.
    InvalidUtf8 {
        /// Byte offset of the string body in the buffer.
        offset: usize,
    },
}

/// Specific storage limit that was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    DataLength,
    PrincipalComponents,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof {
                requested,
                available,
            } => {
                write!(
                    f,
                    "attempted to read {requested} bytes but only {available} bytes available"
                )
            }
            Self::BufferOverflow {
                attempted,
                capacity,
            } => {
                write!(
                    f,
                    "attempted to write {attempted} bytes but only {capacity} bytes of capacity remain"
                )
            }
            Self::LengthOverflow { length } => {
                write!(f, "length {length} does not fit in an int32 prefix")
            }
            Self::NegativeLength { value } => {
                write!(f, "negative length prefix {value}")
            }
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
            Self::InvalidUtf8 { offset } => {
                write!(f, "string at offset {offset} is not valid UTF-8")
            }
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DataLength => "data length",
            Self::PrincipalComponents => "principal components",
        };
        write!(f, "{name}")
    }
}

impl std::error::Error for StorageError {}
