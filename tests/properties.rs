//! Property-based tests: whatever the inputs, decoding must round-trip the
//! reference encoder's output, never panic on garbage, and treat frame
//! boundaries as invisible.

use lz4_flex::frame::FrameEncoder;
use lz_thaw::framed::{decompress_frame, decompress_stream};
use lz_thaw::raw;
use proptest::prelude::*;
use std::io::{Cursor, Read, Write};

fn reference_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = FrameEncoder::new(Vec::new());
    encoder.write_all(data).expect("encode");
    encoder.finish().expect("finish")
}

/// A skippable frame wrapping `garbage`.
fn skippable_frame(garbage: &[u8]) -> Vec<u8> {
    let mut bytes = 0x184D2A50u32.to_le_bytes().to_vec();
    bytes.extend_from_slice(&(garbage.len() as u32).to_le_bytes());
    bytes.extend_from_slice(garbage);
    bytes
}

/// A raw block spelling "one literal, then a run of `extra + 4` copies of it".
fn run_block(byte: u8, match_len: usize) -> Vec<u8> {
    assert!(match_len >= 4);
    let code = (match_len - 4).min(15);
    let mut block = vec![0x10 | code as u8, byte, 1, 0];
    if code == 15 {
        let mut remaining = match_len - 4 - 15;
        while remaining >= 255 {
            block.push(255);
            remaining -= 255;
        }
        block.push(remaining as u8);
    }
    block
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        ..ProptestConfig::default()
    })]

    /// Anything the reference encoder emits, we must decode back verbatim.
    #[test]
    fn roundtrip_arbitrary_data(data in prop::collection::vec(any::<u8>(), 0..4096)) {
        let compressed = reference_compress(&data);
        let decoded = decompress_frame(Cursor::new(&compressed), true).unwrap();
        prop_assert_eq!(decoded, data);
    }

    /// Highly compressible inputs exercise the match paths rather than the
    /// literal paths.
    #[test]
    fn roundtrip_repetitive_data(
        pattern in prop::collection::vec(any::<u8>(), 1..8),
        reps in 1usize..4096,
    ) {
        let data: Vec<u8> = pattern.iter().copied().cycle().take(reps).collect();
        let compressed = reference_compress(&data);
        let decoded = decompress_frame(Cursor::new(&compressed), true).unwrap();
        prop_assert_eq!(decoded, data);
    }

    /// Garbage must produce a typed error or a harmless payload, never a
    /// panic, hang or out-of-bounds access.
    #[test]
    fn garbage_never_panics(data in prop::collection::vec(any::<u8>(), 0..2048)) {
        let _ = decompress_frame(Cursor::new(&data), true);
        let _ = raw::decompress_block(&data);
    }

    /// Garbage that starts like a frame gets deeper into the decoder.
    #[test]
    fn framed_garbage_never_panics(data in prop::collection::vec(any::<u8>(), 0..2048)) {
        let mut input = 0x184D2204u32.to_le_bytes().to_vec();
        input.extend_from_slice(&data);
        let _ = decompress_frame(Cursor::new(&input), true);
    }

    /// One literal followed by a match with offset 1 is the canonical run
    /// encoding: it must decode to `match_len + 1` copies of the byte.
    #[test]
    fn run_encoding(byte in any::<u8>(), match_len in 4usize..2000) {
        let block = run_block(byte, match_len);
        let decoded = raw::decompress_block(&block).unwrap();
        prop_assert_eq!(decoded, vec![byte; match_len + 1]);
    }

    /// Concatenated frames read as one payload, with or without a skippable
    /// frame wedged between them.
    #[test]
    fn concatenation_is_transparent(
        x in prop::collection::vec(any::<u8>(), 0..2048),
        y in prop::collection::vec(any::<u8>(), 0..2048),
        garbage in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let mut expected = x.clone();
        expected.extend_from_slice(&y);

        let mut plain = reference_compress(&x);
        plain.extend_from_slice(&reference_compress(&y));

        let mut with_skippable = reference_compress(&x);
        with_skippable.extend_from_slice(&skippable_frame(&garbage));
        with_skippable.extend_from_slice(&reference_compress(&y));

        for input in [plain, with_skippable].iter() {
            let mut decoded = Vec::new();
            decompress_stream(Cursor::new(input), true)
                .read_to_end(&mut decoded)
                .unwrap();
            prop_assert_eq!(&decoded, &expected);
        }
    }
}
