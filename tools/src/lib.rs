//! Introspection and debugging tools for kadm5 administration records.
//!
//! This crate provides utilities for inspecting captured records:
//!
//! - Show which fields a self-describing entry carries and where they sit
//! - Decode entries and config parameters into JSON
//! - Summarize keys without exposing key material
//!
//! # Design Principles
//!
//! - **Never print key bytes** - Keys are reported by length and redaction state only.
//! - **Human-readable output** - Make it easy to see what is on the wire.

use anyhow::{bail, Context, Result};
use marshal::{
    all_keys_are_bogus, decode_entry_into, decode_params, some_keys_are_bogus, ConfigParams,
    EntryMask, KeyData, MarshalLimits, ParamsField, ParamsMask, PrincipalEntry, TlData,
};
use serde::Serialize;
use storage::{Limits, PrincipalName, StorageReader};

/// Kind of record held in an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Self-describing principal entry: mask, then the selected fields.
    Entry,
    /// Config parameters: mask, then the realm if selected.
    Params,
}

/// Turns file contents into record bytes.
///
/// With `hex_text`, the contents are a hex dump; whitespace is ignored.
pub fn read_input(contents: &[u8], hex_text: bool) -> Result<Vec<u8>> {
    if !hex_text {
        return Ok(contents.to_vec());
    }
    let digits: Vec<u8> = contents
        .iter()
        .copied()
        .filter(|byte| !byte.is_ascii_whitespace())
        .collect();
    hex::decode(digits).context("parse hex input")
}

/// Layout summary of one record.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub kind: RecordKind,
    pub mask: u32,
    pub fields: Vec<FieldSpan>,
    pub total_bytes: usize,
    pub trailing_bytes: usize,
}

/// Where one field sits in the record.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSpan {
    pub name: &'static str,
    pub offset: usize,
    pub byte_len: usize,
}

/// Walks a self-describing entry field by field.
pub fn inspect_entry(
    bytes: &[u8],
    storage_limits: &Limits,
    limits: &MarshalLimits,
) -> Result<InspectReport> {
    let mut reader = StorageReader::with_limits(bytes, storage_limits.clone());
    let mask = EntryMask::from_raw(reader.ret_uint32().context("read entry mask")?);
    let mut entry = PrincipalEntry::default();
    let mut fields = Vec::new();
    for field in mask.fields() {
        let offset = reader.position();
        decode_entry_into(&mut reader, &mut entry, EntryMask::of(&[field]), limits)
            .with_context(|| format!("decode field {} at offset {offset}", field.name()))?;
        fields.push(FieldSpan {
            name: field.name(),
            offset,
            byte_len: reader.position() - offset,
        });
    }
    tracing::debug!(mask = %mask, fields = fields.len(), "inspected entry");
    Ok(InspectReport {
        kind: RecordKind::Entry,
        mask: mask.raw(),
        fields,
        total_bytes: bytes.len(),
        trailing_bytes: reader.remaining(),
    })
}

/// Walks a config parameters record.
pub fn inspect_params(bytes: &[u8], storage_limits: &Limits) -> Result<InspectReport> {
    let mut reader = StorageReader::with_limits(bytes, storage_limits.clone());
    let mask = ParamsMask::from_raw(reader.ret_uint32().context("read params mask")?);
    let mut fields = Vec::new();
    for field in mask.fields() {
        let offset = reader.position();
        match field {
            ParamsField::Realm => {
                reader
                    .ret_string()
                    .with_context(|| format!("decode realm at offset {offset}"))?;
            }
        }
        fields.push(FieldSpan {
            name: "realm",
            offset,
            byte_len: reader.position() - offset,
        });
    }
    Ok(InspectReport {
        kind: RecordKind::Params,
        mask: mask.raw(),
        fields,
        total_bytes: bytes.len(),
        trailing_bytes: reader.remaining(),
    })
}

/// Inspects `bytes` as a record of `kind`.
pub fn inspect_record(
    bytes: &[u8],
    kind: RecordKind,
    storage_limits: &Limits,
    limits: &MarshalLimits,
) -> Result<InspectReport> {
    match kind {
        RecordKind::Entry => inspect_entry(bytes, storage_limits, limits),
        RecordKind::Params => inspect_params(bytes, storage_limits),
    }
}

/// A decoded record, ready for JSON output.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodedRecord {
    Entry(EntryReport),
    Params(ConfigParams),
}

/// A principal entry with key material replaced by summaries.
#[derive(Debug, Clone, Serialize)]
pub struct EntryReport {
    pub mask: EntryMask,
    pub principal: Option<String>,
    pub princ_expire_time: i32,
    pub pw_expiration: i32,
    pub last_pwd_change: i32,
    pub max_life: i32,
    pub mod_name: Option<String>,
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
    pub keys: Vec<KeyReport>,
    pub keys_redacted: bool,
    pub some_keys_redacted: bool,
    pub tl_data: Vec<TlReport>,
}

/// Summary of one key record.
#[derive(Debug, Clone, Serialize)]
pub struct KeyReport {
    pub version: i32,
    pub kvno: i32,
    pub enctype: i32,
    pub key_len: usize,
    pub bogus: bool,
    pub salt_type: i32,
    pub salt_hex: String,
}

/// One extension record, contents as hex.
#[derive(Debug, Clone, Serialize)]
pub struct TlReport {
    pub kind: i32,
    pub contents_hex: String,
}

impl EntryReport {
    fn new(mask: EntryMask, entry: &PrincipalEntry) -> Self {
        Self {
            mask,
            principal: entry.principal.as_ref().map(PrincipalName::to_string),
            princ_expire_time: entry.princ_expire_time,
            pw_expiration: entry.pw_expiration,
            last_pwd_change: entry.last_pwd_change,
            max_life: entry.max_life,
            mod_name: entry.mod_name.as_ref().map(PrincipalName::to_string),
            mod_date: entry.mod_date,
            attributes: entry.attributes,
            kvno: entry.kvno,
            mkvno: entry.mkvno,
            policy: entry.policy.clone(),
            aux_attributes: entry.aux_attributes,
            max_renewable_life: entry.max_renewable_life,
            last_success: entry.last_success,
            last_failed: entry.last_failed,
            fail_auth_count: entry.fail_auth_count,
            keys: entry.key_data.iter().map(KeyReport::new).collect(),
            keys_redacted: all_keys_are_bogus(&entry.key_data),
            some_keys_redacted: some_keys_are_bogus(&entry.key_data),
            tl_data: entry.tl_data.iter().map(TlReport::new).collect(),
        }
    }
}

impl KeyReport {
    fn new(key: &KeyData) -> Self {
        Self {
            version: key.version,
            kvno: key.kvno,
            enctype: key.key.kind,
            key_len: key.key.contents.len(),
            bogus: key.is_bogus(),
            salt_type: key.salt.kind,
            salt_hex: hex::encode(&key.salt.contents),
        }
    }
}

impl TlReport {
    fn new(tl: &TlData) -> Self {
        Self {
            kind: tl.kind,
            contents_hex: hex::encode(&tl.contents),
        }
    }
}

/// Decodes `bytes` as a record of `kind`. Trailing bytes are an error.
pub fn decode_record(
    bytes: &[u8],
    kind: RecordKind,
    storage_limits: &Limits,
    limits: &MarshalLimits,
) -> Result<DecodedRecord> {
    match kind {
        RecordKind::Entry => {
            let mut reader = StorageReader::with_limits(bytes, storage_limits.clone());
            let (mask, entry) =
                marshal::decode_entry_with_mask(&mut reader, limits).context("decode entry")?;
            if !reader.is_empty() {
                bail!("{} trailing bytes after entry", reader.remaining());
            }
            Ok(DecodedRecord::Entry(EntryReport::new(mask, &entry)))
        }
        RecordKind::Params => {
            let mut params = ConfigParams::default();
            decode_params(bytes, &mut params, storage_limits).context("decode params")?;
            Ok(DecodedRecord::Params(params))
        }
    }
}

/// Renders a decoded record as indented text.
pub fn format_decode_pretty(record: &DecodedRecord) -> String {
    let mut out = String::new();
    match record {
        DecodedRecord::Entry(entry) => {
            out.push_str(&format!("entry mask: {}\n", entry.mask));
            if let Some(principal) = &entry.principal {
                out.push_str(&format!("principal: {principal}\n"));
            }
            if let Some(mod_name) = &entry.mod_name {
                out.push_str(&format!("modified by: {mod_name} at {}\n", entry.mod_date));
            }
            out.push_str(&format!(
                "attributes: 0x{:08x} kvno: {} mkvno: {}\n",
                entry.attributes, entry.kvno, entry.mkvno
            ));
            if let Some(policy) = &entry.policy {
                out.push_str(&format!("policy: {policy}\n"));
            }
            let redaction = if entry.keys_redacted {
                " (redacted)"
            } else if entry.some_keys_redacted {
                " (partly redacted)"
            } else {
                ""
            };
            out.push_str(&format!("keys: {}{redaction}\n", entry.keys.len()));
            for key in &entry.keys {
                out.push_str(&format!(
                    "  kvno {} enctype {} ({} bytes) salt type {}\n",
                    key.kvno, key.enctype, key.key_len, key.salt_type
                ));
            }
            out.push_str(&format!("tl data: {}\n", entry.tl_data.len()));
            for tl in &entry.tl_data {
                out.push_str(&format!(
                    "  type 0x{:04x}: {} bytes\n",
                    tl.kind,
                    tl.contents_hex.len() / 2
                ));
            }
        }
        DecodedRecord::Params(params) => {
            out.push_str(&format!("params mask: 0x{:08x}\n", params.mask.raw()));
            match &params.realm {
                Some(realm) => out.push_str(&format!("realm: {realm}\n")),
                None => out.push_str("realm: (not set)\n"),
            }
        }
    }
    out
}
