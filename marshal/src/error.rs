//! Error types for record marshalling.

use std::fmt;

use crate::mask::EntryMask;

/// Result type for marshal operations.
pub type MarshalResult<T> = Result<T, MarshalError>;

/// Errors that can occur while encoding or decoding administration records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarshalError {
    /// A storage primitive failed. Propagated unchanged.
    Storage(storage::StorageError),

    /// A key record could not be decoded.
    ///
    /// Key records report one generic failure regardless of which of their
    /// fields was short; the storage error is kept as the source.
    KeyDecode(storage::StorageError),

    /// A record count read from the wire exceeds the configured limit.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// Memory for a decoded record array could not be reserved.
    OutOfMemory { kind: LimitKind, count: usize },

    /// A self-describing entry carried a different mask than expected.
    MaskMismatch {
        expected: EntryMask,
        found: EntryMask,
    },

    /// A field selected for encoding has no value.
    MissingField { field: &'static str },
}

/// Record array whose count was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    KeyData,
    TlData,
}

impl fmt::Display for MarshalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "storage error: {e}"),
            Self::KeyDecode(e) => write!(f, "failed to decode key data: {e}"),
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} count limit exceeded: {actual} > {limit}")
            }
            Self::OutOfMemory { kind, count } => {
                write!(f, "out of memory allocating {count} {kind} records")
            }
            Self::MaskMismatch { expected, found } => {
                write!(f, "entry mask mismatch: expected {expected}, found {found}")
            }
            Self::MissingField { field } => {
                write!(f, "field {field} is selected but has no value")
            }
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::KeyData => "key data",
            Self::TlData => "tl data",
        };
        write!(f, "{name}")
    }
}

impl std::error::Error for MarshalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Storage(e) | Self::KeyDecode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<storage::StorageError> for MarshalError {
    fn from(err: storage::StorageError) -> Self {
        Self::Storage(err)
    }
}
