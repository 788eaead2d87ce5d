#![no_main]
use libfuzzer_sys::fuzz_target;
use lz_thaw::framed::decompress_stream;
use std::io::{Cursor, Read};

fuzz_target!(|data: &[u8]| {
    let mut reader = decompress_stream(Cursor::new(data), true);
    let mut buffer = vec![0; 4096];
    while let Ok(n) = reader.read(&mut buffer) {
        if n == 0 {
            break;
        }
    }
});
