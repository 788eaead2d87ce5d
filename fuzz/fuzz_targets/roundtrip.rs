#![no_main]
use libfuzzer_sys::fuzz_target;
use lz_thaw::framed::decompress_frame;
use std::io::{Cursor, Write};

fuzz_target!(|data: &[u8]| {
    let mut encoder = lz4_flex::frame::FrameEncoder::new(Vec::new());
    encoder.write_all(data).expect("could not feed the reference encoder");
    let compressed = encoder.finish().expect("reference encoder failed");

    let decompressed = decompress_frame(Cursor::new(&compressed), true)
        .expect("failed to decompress data produced by the reference encoder");
    assert!(decompressed == data, "decompression result did not match the original input");
});
