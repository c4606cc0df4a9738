//! Big-endian storage primitives for kadm5 administration records.
//!
//! This crate provides [`StorageWriter`] and [`StorageReader`] for the
//! primitive values that administration records are built from: 32-bit
//! integers, length-prefixed opaque data, length-prefixed strings and
//! principal names.
//!
//! # Design Principles
//!
//! - **No unsafe code**
//! - **Bounded reads** - Every length prefix is checked against [`Limits`] before allocating.
//! - **No record knowledge** - This crate knows nothing about principals' attributes, keys or masks.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use storage::{PrincipalName, StorageReader, StorageWriter};
//!
//! let mut writer = StorageWriter::new();
//! writer.store_int32(42).unwrap();
//! writer.store_principal(&PrincipalName::parse("alice@EXAMPLE.COM").unwrap()).unwrap();
//!
//! let bytes = writer.finish();
//!
//! let mut reader = StorageReader::new(&bytes);
//! assert_eq!(reader.ret_int32().unwrap(), 42);
//! assert_eq!(reader.ret_principal().unwrap().to_string(), "alice@EXAMPLE.COM");
//! ```

mod error;
mod limits;
mod principal;
mod reader;
mod writer;

pub use error::{LimitKind, StorageError, StorageResult};
pub use limits::Limits;
pub use principal::{ParsePrincipalError, PrincipalName, NT_PRINCIPAL};
pub use reader::StorageReader;
pub use writer::StorageWriter;
