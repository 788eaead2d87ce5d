use lz_thaw::framed::decompress_stream;
use std::env;
use std::fs::File;
use std::io::{self, BufWriter};

fn main() -> io::Result<()> {
    let filename_in = env::args().nth(1).expect("usage: unlz4 <in.lz4> <out>");
    let filename_out = env::args().nth(2).expect("usage: unlz4 <in.lz4> <out>");
    let file_in = File::open(filename_in)?;
    let file_out = File::create(filename_out)?;

    let mut reader = decompress_stream(file_in, true);
    let mut writer = BufWriter::with_capacity(32 * 1024, file_out);
    io::copy(&mut reader, &mut writer)?;

    Ok(())
}
