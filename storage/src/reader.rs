//! Sequential reader with bounded operations.

use crate::error::{LimitKind, StorageError, StorageResult};
use crate::limits::Limits;
use crate::principal::PrincipalName;

/// A sequential big-endian reader for decoding storage primitives.
///
/// All read operations are bounds-checked and length prefixes are validated
/// against [`Limits`] before allocating. The reader never panics on malformed
/// input.
#[derive(Debug)]
pub struct StorageReader<'a> {
    data: &'a [u8],
    pos: usize,
    limits: Limits,
}

impl<'a> StorageReader<'a> {
    /// Creates a reader with default limits.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_limits(data, Limits::default())
    }

    /// Creates a reader with the given limits.
    #[must_use]
    pub const fn with_limits(data: &'a [u8], limits: Limits) -> Self {
        Self {
            data,
            pos: 0,
            limits,
        }
    }

    /// Returns the limits this reader enforces.
    #[must_use]
    pub const fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Returns the number of bytes remaining to read.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Returns `true` if there are no more bytes to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the current byte position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Reads a signed 32-bit integer.
    pub fn ret_int32(&mut self) -> StorageResult<i32> {
        Ok(i32::from_be_bytes(self.take_array::<4>()?))
    }

    /// Reads an unsigned 32-bit integer.
    pub fn ret_uint32(&mut self) -> StorageResult<u32> {
        Ok(u32::from_be_bytes(self.take_array::<4>()?))
    }

    /// Reads an int32 length followed by that many bytes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NegativeLength`] for a negative prefix,
    /// [`StorageError::LimitsExceeded`] if the length is above
    /// `max_data_len`, and [`StorageError::UnexpectedEof`] if the buffer
    /// is short.
    pub fn ret_data(&mut self) -> StorageResult<Vec<u8>> {
        let len = self.ret_length()?;
        Ok(self.take(len)?.to_vec())
    }

    /// Reads a length-prefixed UTF-8 string.
    pub fn ret_string(&mut self) -> StorageResult<String> {
        let len = self.ret_length()?;
        let offset = self.pos;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| StorageError::InvalidUtf8 { offset })
    }

    /// Reads a principal name.
    pub fn ret_principal(&mut self) -> StorageResult<PrincipalName> {
        let name_type = self.ret_int32()?;
        let raw_count = self.ret_int32()?;
        let count =
            usize::try_from(raw_count).map_err(|_| StorageError::NegativeLength { value: raw_count })?;
        if count > self.limits.max_principal_components {
            return Err(StorageError::LimitsExceeded {
                kind: LimitKind::PrincipalComponents,
                limit: self.limits.max_principal_components,
                actual: count,
            });
        }
        let realm = self.ret_string()?;
        let mut components = Vec::with_capacity(count);
        for _ in 0..count {
            components.push(self.ret_string()?);
        }
        Ok(PrincipalName {
            name_type,
            realm,
            components,
        })
    }

    fn ret_length(&mut self) -> StorageResult<usize> {
        let raw = self.ret_int32()?;
        let len = usize::try_from(raw).map_err(|_| StorageError::NegativeLength { value: raw })?;
        if len > self.limits.max_data_len {
            return Err(StorageError::LimitsExceeded {
                kind: LimitKind::DataLength,
                limit: self.limits.max_data_len,
                actual: len,
            });
        }
        Ok(len)
    }

    fn take(&mut self, len: usize) -> StorageResult<&'a [u8]> {
        let available = self.remaining();
        if len > available {
            return Err(StorageError::UnexpectedEof {
                requested: len,
                available,
            });
        }
        let data = self.data;
        let out = &data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    fn take_array<const N: usize>(&mut self) -> StorageResult<[u8; N]> {
        let bytes = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }
}
