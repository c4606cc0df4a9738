//! Config parameters encoding/decoding.
//!
//! Only the realm travels on the wire. The other parameters are local
//! settings that share the mask so callers can track which ones are set.

use storage::{Limits, StorageReader, StorageWriter};

use crate::entry::staged;
use crate::error::{MarshalError, MarshalResult};
use crate::mask::{ParamsField, ParamsMask};

/// Realm configuration exchanged between admin client and server.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfigParams {
    pub mask: ParamsMask,
    pub realm: Option<String>,
    pub kadmind_port: Option<u16>,
    pub admin_server: Option<String>,
    pub dbname: Option<String>,
}

impl ConfigParams {
    /// Creates params carrying only a realm.
    #[must_use]
    pub fn for_realm(realm: impl Into<String>) -> Self {
        Self {
            mask: ParamsMask::from_raw(ParamsMask::REALM),
            realm: Some(realm.into()),
            ..Self::default()
        }
    }
}

/// Encodes `params` into an owned buffer.
///
/// The mask is written restricted to the marshalled bits.
pub fn encode_params(params: &ConfigParams) -> MarshalResult<Vec<u8>> {
    let mask = params.mask.marshalled();
    let mut writer = StorageWriter::new();
    writer.store_uint32(mask.raw())?;
    for field in mask.fields() {
        match field {
            ParamsField::Realm => {
                let realm = params
                    .realm
                    .as_deref()
                    .ok_or(MarshalError::MissingField { field: "realm" })?;
                writer.store_string(realm)?;
            }
        }
    }
    Ok(writer.finish())
}

/// Decodes `bytes` over `params`.
///
/// `params.mask` takes the raw mask from the wire. Fields not selected keep
/// their values. On error `params` is left unchanged.
pub fn decode_params(
    bytes: &[u8],
    params: &mut ConfigParams,
    limits: &Limits,
) -> MarshalResult<()> {
    let mut reader = StorageReader::with_limits(bytes, limits.clone());
    staged(params, |staged| {
        staged.mask = ParamsMask::from_raw(reader.ret_uint32()?);
        for field in staged.mask.fields() {
            match field {
                ParamsField::Realm => staged.realm = Some(reader.ret_string()?),
            }
        }
        Ok(())
    })
}
