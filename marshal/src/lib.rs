//! Principal entry marshalling for kadm5 administration records.
//!
//! This crate builds on `storage` to encode and decode the administrative
//! view of a Kerberos principal, selected field by field with a bitmask.
//!
//! # Features
//!
//! - Masked encoding in a fixed canonical field order
//! - Self-describing entries that carry their own mask
//! - Key redaction with a recognizable placeholder
//! - Transactional decoding with bounded record counts
//! - Realm parameter exchange
//!
//! # Example
//!
//! ```
//! use marshal::{
//!     decode_entry_with_mask, encode_entry_with_mask, EntryMask, MarshalLimits, PrincipalEntry,
//! };
//! use storage::{StorageReader, StorageWriter};
//!
//! let entry = PrincipalEntry {
//!     principal: Some("alice@EXAMPLE.COM".parse().unwrap()),
//!     attributes: 0x10,
//!     ..PrincipalEntry::default()
//! };
//! let mask = EntryMask::from_raw(EntryMask::PRINCIPAL | EntryMask::ATTRIBUTES);
//!
//! let mut writer = StorageWriter::new();
//! encode_entry_with_mask(&mut writer, &entry, mask).unwrap();
//! let bytes = writer.finish();
//!
//! let mut reader = StorageReader::new(&bytes);
//! let (found, decoded) = decode_entry_with_mask(&mut reader, &MarshalLimits::default()).unwrap();
//! assert_eq!(found, mask);
//! assert_eq!(decoded.principal, entry.principal);
//! ```

mod entry;
mod error;
mod key;
mod limits;
mod mask;
mod params;
mod tl;

pub use entry::{
    decode_entry, decode_entry_expecting, decode_entry_full, decode_entry_into,
    decode_entry_with_mask, encode_entry, encode_entry_full, encode_entry_redacted,
    encode_entry_with_mask, KeyMode, PrincipalEntry,
};
pub use error::{LimitKind, MarshalError, MarshalResult};
pub use key::{
    all_keys_are_bogus, decode_key, encode_key, encode_key_redacted, some_keys_are_bogus,
    KeyContents, KeyData, BOGUS_KEY_DATA,
};
pub use limits::MarshalLimits;
pub use mask::{selected_fields, EntryField, EntryMask, MaskField, ParamsField, ParamsMask};
pub use params::{decode_params, encode_params, ConfigParams};
pub use storage::Limits as StorageLimits;
pub use tl::{decode_tl, encode_tl, TlData};
