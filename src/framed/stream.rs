use fehler::{throw, throws};
use std::cmp;
use std::io::{self, BufRead, Read};

use super::decompress::{DecompressionError, LZ4FrameReader};

/// Serves the decompressed bytes of every frame in a source, one `read` at a
/// time, without ever materialising more than a single frame.
///
/// Each frame is decoded whole and drained before the next one is touched;
/// the consumer never observes where one frame ends and the next begins,
/// which is how the frame format wants concatenated frames to behave.
/// Skippable frames are swallowed along the way. A `read` comes back short
/// only when the source is exhausted.
pub struct LZ4StreamReader<R: Read> {
    frames: LZ4FrameReader<R>,
    buffer: Vec<u8>,
    bytes_taken: usize,
    finished: bool,
}

/// Start decoding a stream of LZ4 frames.
pub fn decompress_stream<R: Read>(reader: R, verify_checksums: bool) -> LZ4StreamReader<R> {
    LZ4StreamReader {
        frames: LZ4FrameReader::with_verification(reader, verify_checksums),
        buffer: Vec::new(),
        bytes_taken: 0,
        finished: false,
    }
}

impl<R: Read> LZ4StreamReader<R> {
    /// Give back the underlying byte source. The undelivered remainder of the
    /// current frame is dropped.
    pub fn into_inner(self) -> R {
        self.frames.into_inner()
    }
}

impl<R: Read> Read for LZ4StreamReader<R> {
    #[throws(io::Error)]
    fn read(&mut self, buf: &mut [u8]) -> usize {
        let mut written = 0;
        // keep crossing frame boundaries until the caller's buffer is full
        while written < buf.len() {
            let mybuf = self.fill_buf()?;
            if mybuf.is_empty() {
                break;
            }
            let bytes_to_take = cmp::min(mybuf.len(), buf.len() - written);
            buf[written..written + bytes_to_take].copy_from_slice(&mybuf[..bytes_to_take]);
            self.consume(bytes_to_take);
            written += bytes_to_take;
        }
        written
    }
}

impl<R: Read> BufRead for LZ4StreamReader<R> {
    #[throws(io::Error)]
    fn fill_buf(&mut self) -> &[u8] {
        // frames may legitimately be empty (skippable ones always are), so
        // keep decoding until there is something to serve or nothing is left
        while self.bytes_taken == self.buffer.len() && !self.finished {
            self.bytes_taken = 0;
            self.buffer = match self.frames.decode_frame() {
                Ok(payload) => payload,
                Err(DecompressionError::EndOfStream) => {
                    self.finished = true;
                    Vec::new()
                }
                Err(e) => throw!(io::Error::from(e)),
            };
        }
        &self.buffer[self.bytes_taken..]
    }

    fn consume(&mut self, amt: usize) {
        self.bytes_taken += amt;
        assert!(
            self.bytes_taken <= self.buffer.len(),
            "You consumed more bytes than I even gave you!"
        );
    }
}
