//! Principal entry encoding/decoding.
//!
//! An entry is written as the subsequence of its fields selected by an
//! [`EntryMask`], in the fixed order of [`EntryField::CANONICAL`]. The mask
//! itself is either agreed out of band or, for the self-describing form,
//! written as the first int32.
//!
//! Decoding is all-or-nothing: fields are decoded into a staged copy that is
//! committed only when every selected field decoded. The reader is not
//! rewound on failure.

use storage::{PrincipalName, StorageReader, StorageWriter};

use crate::error::{LimitKind, MarshalError, MarshalResult};
use crate::key::{decode_key, encode_key, encode_key_redacted, KeyData};
use crate::limits::MarshalLimits;
use crate::mask::{EntryField, EntryMask};
use crate::tl::{decode_tl, encode_tl, TlData};

/// An administrative principal record.
///
/// `tl_data[0]` is the head of the extension list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrincipalEntry {
    pub principal: Option<PrincipalName>,
    pub princ_expire_time: i32,
    pub pw_expiration: i32,
    pub last_pwd_change: i32,
    pub max_life: i32,
    pub mod_name: Option<PrincipalName>,
    pub mod_date: i32,
    pub attributes: u32,
    pub kvno: i32,
    pub mkvno: i32,
    pub policy: Option<String>,
    pub aux_attributes: u32,
    pub max_renewable_life: i32,
    pub last_success: i32,
    pub last_failed: i32,
    pub fail_auth_count: i32,
    pub key_data: Vec<KeyData>,
    pub tl_data: Vec<TlData>,
}

/// Whether real key bytes go on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyMode {
    /// Write real key bytes.
    #[default]
    Include,
    /// Write the redaction placeholder for every key.
    Redact,
}

/// Encodes the fields of `entry` selected by `mask`.
pub fn encode_entry(
    writer: &mut StorageWriter,
    entry: &PrincipalEntry,
    mask: EntryMask,
    keys: KeyMode,
) -> MarshalResult<()> {
    tracing::trace!(
        mask = %mask,
        keys = entry.key_data.len(),
        tl_data = entry.tl_data.len(),
        redact = keys == KeyMode::Redact,
        "encoding principal entry"
    );
    for field in mask.fields() {
        encode_field(writer, entry, field, keys)?;
    }
    Ok(())
}

/// Encodes every field with real keys. The mask is not written.
pub fn encode_entry_full(writer: &mut StorageWriter, entry: &PrincipalEntry) -> MarshalResult<()> {
    encode_entry(writer, entry, EntryMask::ALL, KeyMode::Include)
}

/// Encodes every field with redacted keys. The mask is not written.
pub fn encode_entry_redacted(
    writer: &mut StorageWriter,
    entry: &PrincipalEntry,
) -> MarshalResult<()> {
    encode_entry(writer, entry, EntryMask::ALL, KeyMode::Redact)
}

/// Writes `mask` as an int32, then the selected fields with real keys.
pub fn encode_entry_with_mask(
    writer: &mut StorageWriter,
    entry: &PrincipalEntry,
    mask: EntryMask,
) -> MarshalResult<()> {
    writer.store_uint32(mask.raw())?;
    encode_entry(writer, entry, mask, KeyMode::Include)
}

fn encode_field(
    writer: &mut StorageWriter,
    entry: &PrincipalEntry,
    field: EntryField,
    keys: KeyMode,
) -> MarshalResult<()> {
    match field {
        EntryField::Principal => {
            let principal = entry.principal.as_ref().ok_or(MarshalError::MissingField {
                field: field.name(),
            })?;
            writer.store_principal(principal)?;
        }
        EntryField::PrincExpireTime => writer.store_int32(entry.princ_expire_time)?,
        EntryField::PwExpiration => writer.store_int32(entry.pw_expiration)?,
        EntryField::LastPwdChange => writer.store_int32(entry.last_pwd_change)?,
        EntryField::MaxLife => writer.store_int32(entry.max_life)?,
        EntryField::ModName => {
            writer.store_int32(i32::from(entry.mod_name.is_some()))?;
            if let Some(mod_name) = &entry.mod_name {
                writer.store_principal(mod_name)?;
            }
        }
        EntryField::ModTime => writer.store_int32(entry.mod_date)?,
        EntryField::Attributes => writer.store_uint32(entry.attributes)?,
        EntryField::Kvno => writer.store_int32(entry.kvno)?,
        EntryField::Mkvno => writer.store_int32(entry.mkvno)?,
        EntryField::Policy => {
            writer.store_int32(i32::from(entry.policy.is_some()))?;
            if let Some(policy) = &entry.policy {
                writer.store_string(policy)?;
            }
        }
        EntryField::AuxAttributes => writer.store_uint32(entry.aux_attributes)?,
        EntryField::MaxRenewableLife => writer.store_int32(entry.max_renewable_life)?,
        EntryField::LastSuccess => writer.store_int32(entry.last_success)?,
        EntryField::LastFailed => writer.store_int32(entry.last_failed)?,
        EntryField::FailAuthCount => writer.store_int32(entry.fail_auth_count)?,
        EntryField::KeyData => {
            store_count(writer, entry.key_data.len())?;
            for key in &entry.key_data {
                match keys {
                    KeyMode::Include => encode_key(writer, key)?,
                    KeyMode::Redact => encode_key_redacted(writer, key)?,
                }
            }
        }
        EntryField::TlData => {
            store_count(writer, entry.tl_data.len())?;
            for tl in &entry.tl_data {
                encode_tl(writer, tl)?;
            }
        }
    }
    Ok(())
}

fn store_count(writer: &mut StorageWriter, len: usize) -> MarshalResult<()> {
    let count = i32::try_from(len).map_err(|_| {
        MarshalError::Storage(storage::StorageError::LengthOverflow { length: len })
    })?;
    writer.store_int32(count)?;
    Ok(())
}

/// Decodes the fields selected by `mask` into a fresh entry.
///
/// Unselected fields are left at their defaults. `limits` bounds record
/// counts; value lengths are bounded by the reader's own limits.
pub fn decode_entry(
    reader: &mut StorageReader<'_>,
    mask: EntryMask,
    limits: &MarshalLimits,
) -> MarshalResult<PrincipalEntry> {
    let mut entry = PrincipalEntry::default();
    decode_fields(reader, &mut entry, mask, limits)?;
    Ok(entry)
}

/// Decodes the fields selected by `mask` over an existing entry.
///
/// Unselected fields keep their values. On error `entry` is left exactly as
/// it was.
pub fn decode_entry_into(
    reader: &mut StorageReader<'_>,
    entry: &mut PrincipalEntry,
    mask: EntryMask,
    limits: &MarshalLimits,
) -> MarshalResult<()> {
    staged(entry, |staged| decode_fields(reader, staged, mask, limits))
}

/// Decodes every field. Counterpart of [`encode_entry_full`] and
/// [`encode_entry_redacted`].
pub fn decode_entry_full(
    reader: &mut StorageReader<'_>,
    limits: &MarshalLimits,
) -> MarshalResult<PrincipalEntry> {
    decode_entry(reader, EntryMask::ALL, limits)
}

/// Reads the mask, then the fields it selects.
///
/// Returns the mask found on the wire so the caller can compare it with
/// what it asked for.
pub fn decode_entry_with_mask(
    reader: &mut StorageReader<'_>,
    limits: &MarshalLimits,
) -> MarshalResult<(EntryMask, PrincipalEntry)> {
    let mask = EntryMask::from_raw(reader.ret_uint32()?);
    let entry = decode_entry(reader, mask, limits)?;
    Ok((mask, entry))
}

/// Reads a self-describing entry and requires its mask to equal `expected`.
///
/// The mask is checked before any field is decoded.
pub fn decode_entry_expecting(
    reader: &mut StorageReader<'_>,
    expected: EntryMask,
    limits: &MarshalLimits,
) -> MarshalResult<PrincipalEntry> {
    let found = EntryMask::from_raw(reader.ret_uint32()?);
    if found != expected {
        tracing::debug!(expected = %expected, found = %found, "entry mask mismatch");
        return Err(MarshalError::MaskMismatch { expected, found });
    }
    decode_entry(reader, found, limits)
}

/// Runs `decode` on a copy of `target` and commits the copy on success.
pub(crate) fn staged<T, F>(target: &mut T, decode: F) -> MarshalResult<()>
where
    T: Clone,
    F: FnOnce(&mut T) -> MarshalResult<()>,
{
    let mut staged = target.clone();
    decode(&mut staged)?;
    *target = staged;
    Ok(())
}

fn decode_fields(
    reader: &mut StorageReader<'_>,
    entry: &mut PrincipalEntry,
    mask: EntryMask,
    limits: &MarshalLimits,
) -> MarshalResult<()> {
    for field in mask.fields() {
        decode_field(reader, entry, field, limits)?;
    }
    tracing::trace!(
        mask = %mask,
        keys = entry.key_data.len(),
        tl_data = entry.tl_data.len(),
        "decoded principal entry"
    );
    Ok(())
}

fn decode_field(
    reader: &mut StorageReader<'_>,
    entry: &mut PrincipalEntry,
    field: EntryField,
    limits: &MarshalLimits,
) -> MarshalResult<()> {
    match field {
        EntryField::Principal => entry.principal = Some(reader.ret_principal()?),
        EntryField::PrincExpireTime => entry.princ_expire_time = reader.ret_int32()?,
        EntryField::PwExpiration => entry.pw_expiration = reader.ret_int32()?,
        EntryField::LastPwdChange => entry.last_pwd_change = reader.ret_int32()?,
        EntryField::MaxLife => entry.max_life = reader.ret_int32()?,
        EntryField::ModName => {
            entry.mod_name = if reader.ret_int32()? != 0 {
                Some(reader.ret_principal()?)
            } else {
                None
            };
        }
        EntryField::ModTime => entry.mod_date = reader.ret_int32()?,
        EntryField::Attributes => entry.attributes = reader.ret_uint32()?,
        EntryField::Kvno => entry.kvno = reader.ret_int32()?,
        EntryField::Mkvno => entry.mkvno = reader.ret_int32()?,
        EntryField::Policy => {
            entry.policy = if reader.ret_int32()? != 0 {
                Some(reader.ret_string()?)
            } else {
                None
            };
        }
        EntryField::AuxAttributes => entry.aux_attributes = reader.ret_uint32()?,
        EntryField::MaxRenewableLife => entry.max_renewable_life = reader.ret_int32()?,
        EntryField::LastSuccess => entry.last_success = reader.ret_int32()?,
        EntryField::LastFailed => entry.last_failed = reader.ret_int32()?,
        EntryField::FailAuthCount => entry.fail_auth_count = reader.ret_int32()?,
        EntryField::KeyData => {
            let count = ret_count(reader, LimitKind::KeyData, limits.max_keys)?;
            let mut keys = reserve(LimitKind::KeyData, count)?;
            for _ in 0..count {
                keys.push(decode_key(reader)?);
            }
            entry.key_data = keys;
        }
        EntryField::TlData => {
            let count = ret_count(reader, LimitKind::TlData, limits.max_tl_data)?;
            let mut list = reserve(LimitKind::TlData, count)?;
            for _ in 0..count {
                list.push(decode_tl(reader)?);
            }
            // Each record goes to the head of the list, so wire order is reversed.
            list.reverse();
            entry.tl_data = list;
        }
    }
    Ok(())
}

fn ret_count(
    reader: &mut StorageReader<'_>,
    kind: LimitKind,
    limit: usize,
) -> MarshalResult<usize> {
    let raw = reader.ret_uint32()?;
    let count = usize::try_from(raw).unwrap_or(usize::MAX);
    if count > limit {
        tracing::debug!(%kind, count, limit, "rejecting record count");
        return Err(MarshalError::LimitsExceeded {
            kind,
            limit,
            actual: count,
        });
    }
    Ok(count)
}

fn reserve<T>(kind: LimitKind, count: usize) -> MarshalResult<Vec<T>> {
    let mut records = Vec::new();
    records
        .try_reserve_exact(count)
        .map_err(|_| MarshalError::OutOfMemory { kind, count })?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{KeyContents, BOGUS_KEY_DATA};

    fn sample_entry() -> PrincipalEntry {
        PrincipalEntry {
            principal: Some(PrincipalName::parse("alice@EXAMPLE.COM").unwrap()),
            princ_expire_time: 1_900_000_000,
            pw_expiration: 1_800_000_000,
            last_pwd_change: 1_700_000_000,
            max_life: 36_000,
            mod_name: Some(PrincipalName::parse("kadmin/admin@EXAMPLE.COM").unwrap()),
            mod_date: 1_700_000_100,
            attributes: 0x10,
            kvno: 3,
            mkvno: 1,
            policy: Some("default".to_owned()),
            aux_attributes: 0,
            max_renewable_life: 604_800,
            last_success: 1_700_000_200,
            last_failed: 0,
            fail_auth_count: 2,
            key_data: vec![KeyData {
                version: 2,
                kvno: 3,
                key: KeyContents::new(18, vec![0x42; 32]),
                salt: KeyContents::new(3, b"EXAMPLE.COMalice".to_vec()),
            }],
            tl_data: vec![TlData::new(1, b"a".to_vec())],
        }
    }

    fn encode_with(entry: &PrincipalEntry, mask: EntryMask, keys: KeyMode) -> Vec<u8> {
        let mut writer = StorageWriter::new();
        encode_entry(&mut writer, entry, mask, keys).unwrap();
        writer.finish()
    }

    #[test]
    fn full_roundtrip() {
        let entry = sample_entry();
        let mut writer = StorageWriter::new();
        encode_entry_full(&mut writer, &entry).unwrap();
        let bytes = writer.finish();

        let mut reader = StorageReader::new(&bytes);
        let decoded = decode_entry_full(&mut reader, &MarshalLimits::default()).unwrap();
        assert_eq!(decoded, entry);
        assert!(reader.is_empty());
    }

    #[test]
    fn empty_mask_writes_nothing() {
        assert!(encode_with(&sample_entry(), EntryMask::NONE, KeyMode::Include).is_empty());
    }

    #[test]
    fn redacted_full_keeps_everything_but_key_bytes() {
        let entry = sample_entry();
        let mut writer = StorageWriter::new();
        encode_entry_redacted(&mut writer, &entry).unwrap();
        let bytes = writer.finish();

        let mut reader = StorageReader::new(&bytes);
        let decoded = decode_entry_full(&mut reader, &MarshalLimits::default()).unwrap();
        assert_eq!(decoded.key_data[0].key.contents, BOGUS_KEY_DATA.to_vec());
        assert_eq!(decoded.key_data[0].salt, entry.key_data[0].salt);

        let mut expected = entry;
        expected.key_data[0].key.contents = BOGUS_KEY_DATA.to_vec();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn nullable_fields_write_presence_word() {
        let mut entry = sample_entry();
        entry.policy = None;
        let mask = EntryMask::from_raw(EntryMask::POLICY);
        let bytes = encode_with(&entry, mask, KeyMode::Include);
        assert_eq!(bytes, vec![0, 0, 0, 0]);

        entry.policy = Some("p".to_owned());
        let bytes = encode_with(&entry, mask, KeyMode::Include);
        assert_eq!(bytes, vec![0, 0, 0, 1, 0, 0, 0, 1, b'p']);
    }

    #[test]
    fn absent_nullable_clears_existing_value() {
        let mut source = sample_entry();
        source.mod_name = None;
        let mask = EntryMask::from_raw(EntryMask::MOD_NAME);
        let bytes = encode_with(&source, mask, KeyMode::Include);

        let mut target = sample_entry();
        let mut reader = StorageReader::new(&bytes);
        decode_entry_into(&mut reader, &mut target, mask, &MarshalLimits::default()).unwrap();
        assert_eq!(target.mod_name, None);
    }

    #[test]
    fn missing_principal_is_reported() {
        let mut entry = sample_entry();
        entry.principal = None;
        let mut writer = StorageWriter::new();
        let err = encode_entry_full(&mut writer, &entry).unwrap_err();
        assert_eq!(err, MarshalError::MissingField { field: "principal" });
    }

    #[test]
    fn decode_into_keeps_unselected_fields() {
        let source = PrincipalEntry {
            kvno: 9,
            ..PrincipalEntry::default()
        };
        let mask = EntryMask::from_raw(EntryMask::KVNO);
        let bytes = encode_with(&source, mask, KeyMode::Include);

        let mut target = sample_entry();
        let mut reader = StorageReader::new(&bytes);
        decode_entry_into(&mut reader, &mut target, mask, &MarshalLimits::default()).unwrap();

        let mut expected = sample_entry();
        expected.kvno = 9;
        assert_eq!(target, expected);
    }

    #[test]
    fn decode_into_is_atomic_on_failure() {
        let bytes = encode_with(&sample_entry(), EntryMask::ALL, KeyMode::Include);
        let truncated = &bytes[..bytes.len() - 1];

        let original = PrincipalEntry {
            kvno: 77,
            ..PrincipalEntry::default()
        };
        let mut target = original.clone();
        let mut reader = StorageReader::new(truncated);
        let err = decode_entry_into(
            &mut reader,
            &mut target,
            EntryMask::ALL,
            &MarshalLimits::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MarshalError::Storage(_)));
        assert_eq!(target, original);
    }

    #[test]
    fn tl_data_decodes_in_reverse_wire_order() {
        let entry = PrincipalEntry {
            tl_data: vec![
                TlData::new(1, b"a".to_vec()),
                TlData::new(2, b"b".to_vec()),
                TlData::new(3, b"c".to_vec()),
            ],
            ..PrincipalEntry::default()
        };
        let mask = EntryMask::from_raw(EntryMask::TL_DATA);
        let bytes = encode_with(&entry, mask, KeyMode::Include);

        let mut reader = StorageReader::new(&bytes);
        let decoded = decode_entry(&mut reader, mask, &MarshalLimits::default()).unwrap();
        let kinds: Vec<_> = decoded.tl_data.iter().map(|tl| tl.kind).collect();
        assert_eq!(kinds, vec![3, 2, 1]);
    }

    #[test]
    fn zero_counts_yield_empty_arrays() {
        let mask = EntryMask::from_raw(EntryMask::KEY_DATA | EntryMask::TL_DATA);
        let bytes = encode_with(&PrincipalEntry::default(), mask, KeyMode::Include);
        assert_eq!(bytes, vec![0; 8]);

        let mut target = sample_entry();
        let mut reader = StorageReader::new(&bytes);
        decode_entry_into(&mut reader, &mut target, mask, &MarshalLimits::default()).unwrap();
        assert!(target.key_data.is_empty());
        assert!(target.tl_data.is_empty());
    }

    #[test]
    fn key_count_over_limit_is_rejected() {
        let bytes = [0x7F, 0xFF, 0xFF, 0xFF];
        let mut reader = StorageReader::new(&bytes);
        let err = decode_entry(
            &mut reader,
            EntryMask::from_raw(EntryMask::KEY_DATA),
            &MarshalLimits::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            MarshalError::LimitsExceeded {
                kind: LimitKind::KeyData,
                limit: 256,
                actual: 0x7FFF_FFFF,
            }
        );
    }

    #[test]
    fn negative_tl_count_is_rejected_as_huge() {
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF];
        let mut reader = StorageReader::new(&bytes);
        let err = decode_entry(
            &mut reader,
            EntryMask::from_raw(EntryMask::TL_DATA),
            &MarshalLimits::for_testing(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            MarshalError::LimitsExceeded {
                kind: LimitKind::TlData,
                actual: 0xFFFF_FFFF,
                ..
            }
        ));
    }

    #[test]
    fn bad_key_record_aborts_entry() {
        let mask = EntryMask::from_raw(EntryMask::KEY_DATA | EntryMask::KVNO);
        let mut writer = StorageWriter::new();
        writer.store_int32(4).unwrap(); // kvno
        writer.store_int32(1).unwrap(); // one key follows, but is cut short
        writer.store_int32(2).unwrap();
        let bytes = writer.finish();

        let mut reader = StorageReader::new(&bytes);
        let err = decode_entry(&mut reader, mask, &MarshalLimits::default()).unwrap_err();
        assert!(matches!(err, MarshalError::KeyDecode(_)));
    }

    #[test]
    fn self_describing_roundtrip() {
        let entry = sample_entry();
        let mask = EntryMask::from_raw(
            EntryMask::PRINCIPAL | EntryMask::KVNO | EntryMask::KEY_DATA | EntryMask::POLICY,
        );
        let mut writer = StorageWriter::new();
        encode_entry_with_mask(&mut writer, &entry, mask).unwrap();
        let bytes = writer.finish();

        let mut reader = StorageReader::new(&bytes);
        let (found, decoded) =
            decode_entry_with_mask(&mut reader, &MarshalLimits::default()).unwrap();
        assert_eq!(found, mask);
        assert_eq!(decoded.principal, entry.principal);
        assert_eq!(decoded.kvno, entry.kvno);
        assert_eq!(decoded.key_data, entry.key_data);
        assert_eq!(decoded.policy, entry.policy);
        assert_eq!(decoded.max_life, 0);
    }

    #[test]
    fn expecting_rejects_other_mask() {
        let entry = sample_entry();
        let mut writer = StorageWriter::new();
        encode_entry_with_mask(&mut writer, &entry, EntryMask::from_raw(EntryMask::KVNO)).unwrap();
        let bytes = writer.finish();

        let mut reader = StorageReader::new(&bytes);
        let err = decode_entry_expecting(&mut reader, EntryMask::ALL, &MarshalLimits::default())
            .unwrap_err();
        assert_eq!(
            err,
            MarshalError::MaskMismatch {
                expected: EntryMask::ALL,
                found: EntryMask::from_raw(EntryMask::KVNO),
            }
        );
    }

    #[test]
    fn encode_stops_at_first_failure() {
        let entry = sample_entry();
        let mut writer = StorageWriter::with_limit(6);
        let mask = EntryMask::from_raw(EntryMask::KVNO | EntryMask::MKVNO);
        let err = encode_entry(&mut writer, &entry, mask, KeyMode::Include).unwrap_err();
        assert!(matches!(
            err,
            MarshalError::Storage(storage::StorageError::BufferOverflow { .. })
        ));
        assert_eq!(writer.as_bytes(), &[0, 0, 0, 3]);
    }

    #[test]
    fn value_lengths_follow_reader_limits() {
        let entry = PrincipalEntry {
            policy: Some("p".repeat(5000)),
            ..PrincipalEntry::default()
        };
        let mask = EntryMask::from_raw(EntryMask::POLICY);
        let bytes = encode_with(&entry, mask, KeyMode::Include);

        let mut reader = StorageReader::with_limits(&bytes, storage::Limits::for_testing());
        assert_eq!(reader.limits().max_data_len, 4096);
        let err = decode_entry(&mut reader, mask, &MarshalLimits::for_testing()).unwrap_err();
        assert_eq!(
            err,
            MarshalError::Storage(storage::StorageError::LimitsExceeded {
                kind: storage::LimitKind::DataLength,
                limit: 4096,
                actual: 5000,
            })
        );

        let mut reader = StorageReader::new(&bytes);
        let decoded = decode_entry(&mut reader, mask, &MarshalLimits::for_testing()).unwrap();
        assert_eq!(decoded.policy, entry.policy);
    }

    #[test]
    fn unreservable_count_is_out_of_memory() {
        let err = reserve::<KeyData>(LimitKind::KeyData, usize::MAX).unwrap_err();
        assert_eq!(
            err,
            MarshalError::OutOfMemory {
                kind: LimitKind::KeyData,
                count: usize::MAX,
            }
        );
        assert!(reserve::<TlData>(LimitKind::TlData, 3).unwrap().capacity() >= 3);
    }
}
