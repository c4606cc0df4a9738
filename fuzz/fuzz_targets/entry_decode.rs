#![no_main]

use libfuzzer_sys::fuzz_target;
use marshal::{
    decode_entry_into, decode_entry_with_mask, decode_params, encode_entry_with_mask,
    ConfigParams, MarshalLimits, PrincipalEntry,
};
use storage::{Limits, StorageReader, StorageWriter};

fuzz_target!(|data: &[u8]| {
    let limits = MarshalLimits::for_testing();
    let storage_limits = Limits::for_testing();

    let mut reader = StorageReader::with_limits(data, storage_limits.clone());
    if let Ok((mask, entry)) = decode_entry_with_mask(&mut reader, &limits) {
        // Anything that decodes must re-encode and decode to the same fields.
        let consumed = reader.position();
        let mut writer = StorageWriter::new();
        if encode_entry_with_mask(&mut writer, &entry, mask).is_ok() {
            let bytes = writer.finish();
            let mut again = PrincipalEntry::default();
            let mut reader = StorageReader::with_limits(&bytes[4..], storage_limits.clone());
            assert!(decode_entry_into(&mut reader, &mut again, mask, &limits).is_ok());
            assert_eq!(bytes.len(), consumed);
        }
    }

    let mut params = ConfigParams::default();
    let before = params.clone();
    if decode_params(data, &mut params, &storage_limits).is_err() {
        assert_eq!(params, before);
    }
});
