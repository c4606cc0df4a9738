#![no_main]

use libfuzzer_sys::fuzz_target;
use storage::{Limits, StorageReader};

fuzz_target!(|data: &[u8]| {
    let mut reader = StorageReader::with_limits(data, Limits::for_testing());
    let mut idx = 0usize;

    // Input bytes pick the primitive; the reader consumes the same input.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 5;
        idx += 1;

        let result = match op {
            0 => reader.ret_int32().map(drop),
            1 => reader.ret_uint32().map(drop),
            2 => reader.ret_data().map(drop),
            3 => reader.ret_string().map(drop),
            _ => reader.ret_principal().map(drop),
        };
        if result.is_err() {
            break;
        }
    }
});
