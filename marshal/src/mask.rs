//! Field masks and the canonical field order of masked records.

use std::fmt;
use std::ops::{BitAnd, BitOr};

/// A field of a masked record.
///
/// `CANONICAL` is the wire order. It is shared by encode and decode, so the
/// two directions cannot drift apart.
pub trait MaskField: Copy + fmt::Debug + 'static {
    /// Every field in wire order.
    const CANONICAL: &'static [Self];

    /// The mask bit that selects this field.
    fn bit(self) -> u32;
}

/// Iterates the fields selected by `raw`, in canonical order.
pub fn selected_fields<F: MaskField>(raw: u32) -> impl Iterator<Item = F> {
    F::CANONICAL
        .iter()
        .copied()
        .filter(move |field| raw & field.bit() != 0)
}

/// Field mask for a principal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct EntryMask(u32);

impl EntryMask {
    pub const PRINCIPAL: u32 = 0x00_0001;
    pub const PRINC_EXPIRE_TIME: u32 = 0x00_0002;
    pub const PW_EXPIRATION: u32 = 0x00_0004;
    pub const LAST_PWD_CHANGE: u32 = 0x00_0008;
    pub const ATTRIBUTES: u32 = 0x00_0010;
    pub const MAX_LIFE: u32 = 0x00_0020;
    pub const MOD_TIME: u32 = 0x00_0040;
    pub const MOD_NAME: u32 = 0x00_0080;
    pub const KVNO: u32 = 0x00_0100;
    pub const MKVNO: u32 = 0x00_0200;
    pub const AUX_ATTRIBUTES: u32 = 0x00_0400;
    pub const POLICY: u32 = 0x00_0800;
    /// Request-only flag; selects no field on the wire.
    pub const POLICY_CLR: u32 = 0x00_1000;
    pub const MAX_RLIFE: u32 = 0x00_2000;
    pub const LAST_SUCCESS: u32 = 0x00_4000;
    pub const LAST_FAILED: u32 = 0x00_8000;
    pub const FAIL_AUTH_COUNT: u32 = 0x01_0000;
    pub const KEY_DATA: u32 = 0x02_0000;
    pub const TL_DATA: u32 = 0x04_0000;

    /// Selects every field.
    pub const ALL: Self = Self(!0);

    /// Selects no field.
    pub const NONE: Self = Self(0);

    /// Creates a mask from a raw value. Unknown bits are kept and ignored.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw mask bits.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns `true` if every bit of `bits` is set.
    #[must_use]
    pub const fn contains(self, bits: u32) -> bool {
        self.0 & bits == bits
    }

    /// Returns `true` if `field` is selected.
    #[must_use]
    pub fn selects(self, field: EntryField) -> bool {
        self.0 & field.bit() != 0
    }

    /// Iterates the selected fields in wire order.
    pub fn fields(self) -> impl Iterator<Item = EntryField> {
        selected_fields(self.0)
    }

    /// Builds the mask that selects exactly `fields`.
    #[must_use]
    pub fn of(fields: &[EntryField]) -> Self {
        Self(fields.iter().fold(0, |acc, field| acc | field.bit()))
    }
}

impl BitOr for EntryMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for EntryMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Display for EntryMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// The fields of a principal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryField {
    Principal,
    PrincExpireTime,
    PwExpiration,
    LastPwdChange,
    MaxLife,
    ModName,
    ModTime,
    Attributes,
    Kvno,
    Mkvno,
    Policy,
    AuxAttributes,
    MaxRenewableLife,
    LastSuccess,
    LastFailed,
    FailAuthCount,
    KeyData,
    TlData,
}

impl MaskField for EntryField {
    // Not bit order: MAX_LIFE is written before MOD_NAME, MOD_TIME and ATTRIBUTES.
    const CANONICAL: &'static [Self] = &[
        Self::Principal,
        Self::PrincExpireTime,
        Self::PwExpiration,
        Self::LastPwdChange,
        Self::MaxLife,
        Self::ModName,
        Self::ModTime,
        Self::Attributes,
        Self::Kvno,
        Self::Mkvno,
        Self::Policy,
        Self::AuxAttributes,
        Self::MaxRenewableLife,
        Self::LastSuccess,
        Self::LastFailed,
        Self::FailAuthCount,
        Self::KeyData,
        Self::TlData,
    ];

    fn bit(self) -> u32 {
        match self {
            Self::Principal => EntryMask::PRINCIPAL,
            Self::PrincExpireTime => EntryMask::PRINC_EXPIRE_TIME,
            Self::PwExpiration => EntryMask::PW_EXPIRATION,
            Self::LastPwdChange => EntryMask::LAST_PWD_CHANGE,
            Self::MaxLife => EntryMask::MAX_LIFE,
            Self::ModName => EntryMask::MOD_NAME,
            Self::ModTime => EntryMask::MOD_TIME,
            Self::Attributes => EntryMask::ATTRIBUTES,
            Self::Kvno => EntryMask::KVNO,
            Self::Mkvno => EntryMask::MKVNO,
            Self::Policy => EntryMask::POLICY,
            Self::AuxAttributes => EntryMask::AUX_ATTRIBUTES,
            Self::MaxRenewableLife => EntryMask::MAX_RLIFE,
            Self::LastSuccess => EntryMask::LAST_SUCCESS,
            Self::LastFailed => EntryMask::LAST_FAILED,
            Self::FailAuthCount => EntryMask::FAIL_AUTH_COUNT,
            Self::KeyData => EntryMask::KEY_DATA,
            Self::TlData => EntryMask::TL_DATA,
        }
    }
}

impl EntryField {
    /// Field name used in errors and reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Principal => "principal",
            Self::PrincExpireTime => "princ_expire_time",
            Self::PwExpiration => "pw_expiration",
            Self::LastPwdChange => "last_pwd_change",
            Self::MaxLife => "max_life",
            Self::ModName => "mod_name",
            Self::ModTime => "mod_date",
            Self::Attributes => "attributes",
            Self::Kvno => "kvno",
            Self::Mkvno => "mkvno",
            Self::Policy => "policy",
            Self::AuxAttributes => "aux_attributes",
            Self::MaxRenewableLife => "max_renewable_life",
            Self::LastSuccess => "last_success",
            Self::LastFailed => "last_failed",
            Self::FailAuthCount => "fail_auth_count",
            Self::KeyData => "key_data",
            Self::TlData => "tl_data",
        }
    }
}

/// Field mask for a config parameters record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct ParamsMask(u32);

impl ParamsMask {
    pub const REALM: u32 = 1 << 0;
    pub const KADMIND_PORT: u32 = 1 << 2;
    pub const ADMIN_SERVER: u32 = 1 << 3;
    pub const DBNAME: u32 = 1 << 4;

    /// Bits that are carried on the wire; the rest are local-only.
    pub const MARSHALLED: u32 = Self::REALM;

    /// Creates a mask from a raw value.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw mask bits.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns `true` if every bit of `bits` is set.
    #[must_use]
    pub const fn contains(self, bits: u32) -> bool {
        self.0 & bits == bits
    }

    /// Returns the mask restricted to the marshalled bits.
    #[must_use]
    pub const fn marshalled(self) -> Self {
        Self(self.0 & Self::MARSHALLED)
    }

    /// Iterates the selected marshalled fields in wire order.
    pub fn fields(self) -> impl Iterator<Item = ParamsField> {
        selected_fields(self.0)
    }
}

impl BitOr for ParamsMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// The marshalled fields of a config parameters record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamsField {
    Realm,
}

impl MaskField for ParamsField {
    const CANONICAL: &'static [Self] = &[Self::Realm];

    fn bit(self) -> u32 {
        match self {
            Self::Realm => ParamsMask::REALM,
        }
    }
}
