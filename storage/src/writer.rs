//! Sequential writer for encoding storage primitives.

use crate::error::{StorageError, StorageResult};
use crate::principal::PrincipalName;

/// A sequential big-endian writer.
///
/// Writes are accumulated in an internal buffer. Call [`finish`](Self::finish)
/// to take the bytes. A writer created with [`with_limit`](Self::with_limit)
/// refuses any write that would grow the buffer past the limit; a refused
/// write leaves the buffer unchanged.
#[derive(Debug, Default)]
pub struct StorageWriter {
    bytes: Vec<u8>,
    limit: Option<usize>,
}

impl StorageWriter {
    /// Creates a new unbounded writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer that fails once more than `max_bytes` would be written.
    #[must_use]
    pub fn with_limit(max_bytes: usize) -> Self {
        Self {
            bytes: Vec::new(),
            limit: Some(max_bytes),
        }
    }

    /// Returns the number of bytes written so far.
    #[must_use]
    pub fn bytes_written(&self) -> usize {
        self.bytes.len()
    }

    /// Returns the bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Writes a signed 32-bit integer.
    pub fn store_int32(&mut self, value: i32) -> StorageResult<()> {
        self.put(&value.to_be_bytes())
    }

    /// Writes an unsigned 32-bit integer using the same four-byte layout.
    pub fn store_uint32(&mut self, value: u32) -> StorageResult<()> {
        self.put(&value.to_be_bytes())
    }

    /// Writes an opaque buffer as an int32 length followed by the bytes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::LengthOverflow`] if the buffer is longer than
    /// `i32::MAX` bytes.
    pub fn store_data(&mut self, data: &[u8]) -> StorageResult<()> {
        let len = i32::try_from(data.len())
            .map_err(|_| StorageError::LengthOverflow { length: data.len() })?;
        self.reserve(4 + data.len())?;
        self.store_int32(len)?;
        self.put(data)
    }

    /// Writes a string with the same layout as [`store_data`](Self::store_data).
    pub fn store_string(&mut self, value: &str) -> StorageResult<()> {
        self.store_data(value.as_bytes())
    }

    /// Writes a principal name: name type, component count, realm, components.
    pub fn store_principal(&mut self, principal: &PrincipalName) -> StorageResult<()> {
        let count = i32::try_from(principal.components.len()).map_err(|_| {
            StorageError::LengthOverflow {
                length: principal.components.len(),
            }
        })?;
        self.store_int32(principal.name_type)?;
        self.store_int32(count)?;
        self.store_string(&principal.realm)?;
        for component in &principal.components {
            self.store_string(component)?;
        }
        Ok(())
    }

    /// Finishes writing and returns the byte buffer.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }

    fn reserve(&self, additional: usize) -> StorageResult<()> {
        if let Some(limit) = self.limit {
            let capacity = limit.saturating_sub(self.bytes.len());
            if additional > capacity {
                return Err(StorageError::BufferOverflow {
                    attempted: additional,
                    capacity,
                });
            }
        }
        Ok(())
    }

    fn put(&mut self, data: &[u8]) -> StorageResult<()> {
        self.reserve(data.len())?;
        self.bytes.extend_from_slice(data);
        Ok(())
    }
}
