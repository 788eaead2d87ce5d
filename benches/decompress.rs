use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lz4_flex::frame::FrameEncoder;
use lz_thaw::framed::decompress_frame;
use lz_thaw::raw;
use rand::prelude::*;
use std::io::{Cursor, Write};

fn criterion_benchmark(c: &mut Criterion) {
    let mut data = vec![0u8; 10_000_000];
    thread_rng().fill(&mut data[2_000_000..6_000_000]); // mixed: zeros compress, noise doesn't

    let frame = {
        let mut encoder = FrameEncoder::new(Vec::new());
        encoder.write_all(&data).unwrap();
        encoder.finish().unwrap()
    };

    let mut group = c.benchmark_group("decompress");
    group.bench_with_input("frame 10M mixed", &frame.as_slice(), |b, frame| {
        b.iter(|| decompress_frame(Cursor::new(black_box(frame)), true).unwrap())
    });
    group.bench_with_input("frame 10M mixed, unverified", &frame.as_slice(), |b, frame| {
        b.iter(|| decompress_frame(Cursor::new(black_box(frame)), false).unwrap())
    });

    let block = lz4_flex::block::compress(&data[..1_000_000]);
    group.bench_with_input("raw block 1M", &block.as_slice(), |b, block| {
        b.iter(|| raw::decompress_block(black_box(block)).unwrap())
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
