//! Key record encoding/decoding and redaction.

use std::fmt;

use storage::{StorageReader, StorageResult, StorageWriter};
use subtle::{Choice, ConstantTimeEq};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{MarshalError, MarshalResult};

/// Placeholder written instead of real key bytes when keys are withheld.
///
/// Four bytes is not a valid key length for any enctype, so a client that
/// asked for keys it may not see ends up with keys that cannot work.
pub const BOGUS_KEY_DATA: [u8; 4] = [0xE5, 0xE5, 0xE5, 0xE5];

/// A typed blob inside a key record: the key itself or its salt.
///
/// The contents are wiped when dropped. `Debug` shows only the length.
#[derive(Clone, PartialEq, Eq, Default, Zeroize, ZeroizeOnDrop)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyContents {
    /// Enctype for a key, salt type for a salt.
    pub kind: i32,
    pub contents: Vec<u8>,
}

impl KeyContents {
    #[must_use]
    pub fn new(kind: i32, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            contents: contents.into(),
        }
    }
}

impl fmt::Debug for KeyContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyContents")
            .field("kind", &self.kind)
            .field("len", &self.contents.len())
            .finish()
    }
}

/// One key slot of a principal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyData {
    pub version: i32,
    pub kvno: i32,
    pub key: KeyContents,
    pub salt: KeyContents,
}

impl KeyData {
    /// Returns `true` if the key bytes are the redaction placeholder.
    ///
    /// The comparison runs in constant time over the key bytes.
    #[must_use]
    pub fn is_bogus(&self) -> bool {
        self.bogus_choice().into()
    }

    fn bogus_choice(&self) -> Choice {
        // Length mismatch yields a false choice without inspecting contents.
        self.key.contents.as_slice().ct_eq(&BOGUS_KEY_DATA[..])
    }
}

/// Writes a key record with its real key bytes.
pub fn encode_key(writer: &mut StorageWriter, key: &KeyData) -> MarshalResult<()> {
    write_key(writer, key, &key.key.contents)?;
    Ok(())
}

/// Writes a key record with [`BOGUS_KEY_DATA`] in place of the key bytes.
///
/// Version, kvno, both type tags and the salt are written verbatim, so the
/// record has the same field layout as one from [`encode_key`].
pub fn encode_key_redacted(writer: &mut StorageWriter, key: &KeyData) -> MarshalResult<()> {
    write_key(writer, key, &BOGUS_KEY_DATA)?;
    Ok(())
}

fn write_key(writer: &mut StorageWriter, key: &KeyData, key_bytes: &[u8]) -> StorageResult<()> {
    writer.store_int32(key.version)?;
    writer.store_int32(key.kvno)?;
    writer.store_int32(key.key.kind)?;
    writer.store_data(key_bytes)?;
    writer.store_int32(key.salt.kind)?;
    writer.store_data(&key.salt.contents)
}

/// Reads one key record.
///
/// # Errors
///
/// Any short or malformed field yields [`MarshalError::KeyDecode`].
pub fn decode_key(reader: &mut StorageReader<'_>) -> MarshalResult<KeyData> {
    read_key(reader).map_err(MarshalError::KeyDecode)
}

fn read_key(reader: &mut StorageReader<'_>) -> StorageResult<KeyData> {
    let version = reader.ret_int32()?;
    let kvno = reader.ret_int32()?;
    let key_kind = reader.ret_int32()?;
    let key_contents = reader.ret_data()?;
    let salt_kind = reader.ret_int32()?;
    let salt_contents = reader.ret_data()?;
    Ok(KeyData {
        version,
        kvno,
        key: KeyContents::new(key_kind, key_contents),
        salt: KeyContents::new(salt_kind, salt_contents),
    })
}

/// Returns `true` if at least one key is the redaction placeholder.
///
/// Every key is inspected regardless of earlier matches. An empty slice
/// gives `false`.
#[must_use]
pub fn some_keys_are_bogus(keys: &[KeyData]) -> bool {
    keys.iter()
        .fold(Choice::from(0), |acc, key| acc | key.bogus_choice())
        .into()
}

/// Returns `true` if every key is the redaction placeholder.
///
/// Every key is inspected regardless of earlier mismatches. An empty slice
/// gives `false`: there is nothing to call redacted.
#[must_use]
pub fn all_keys_are_bogus(keys: &[KeyData]) -> bool {
    if keys.is_empty() {
        return false;
    }
    keys.iter()
        .fold(Choice::from(1), |acc, key| acc & key.bogus_choice())
        .into()
}
