//! Extension (TL-data) record encoding/decoding.

use storage::{StorageReader, StorageWriter};

use crate::error::MarshalResult;

/// An opaque, type-tagged attachment to a principal entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TlData {
    pub kind: i32,
    pub contents: Vec<u8>,
}

impl TlData {
    #[must_use]
    pub fn new(kind: i32, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            contents: contents.into(),
        }
    }
}

/// Writes one extension record: type tag, then length and bytes.
pub fn encode_tl(writer: &mut StorageWriter, tl: &TlData) -> MarshalResult<()> {
    writer.store_int32(tl.kind)?;
    writer.store_data(&tl.contents)?;
    Ok(())
}

/// Reads one extension record.
pub fn decode_tl(reader: &mut StorageReader<'_>) -> MarshalResult<TlData> {
    let kind = reader.ret_int32()?;
    let contents = reader.ret_data()?;
    Ok(TlData { kind, contents })
}
