use byteorder::{ReadBytesExt, LE};
use fehler::{throw, throws};
use std::convert::TryInto;
use std::hash::Hasher;
use std::io::{self, ErrorKind, Read};
use thiserror::Error;
use tracing::{debug, warn};
use twox_hash::XxHash32;

use super::header::{self, BlockDescriptor, Flags};
use super::{INCOMPRESSIBLE, MAGIC, SKIPPABLE_MAGIC_HIGH, SKIPPABLE_MAGIC_LOW};
use crate::raw;

/// Don't trust the content-size field with more than this much preallocation;
/// anything real grows past it organically.
const PREALLOC_LIMIT: u64 = 16 * 1024 * 1024;

/// Errors when decompressing an LZ4 frame.
#[derive(Error, Debug)]
pub enum DecompressionError {
    #[error("error reading from the input you gave me")]
    InputError(#[from] io::Error),
    #[error("the raw LZ4 decompression failed (data corruption?)")]
    CodecError(#[from] raw::DecodeError),
    #[error("invalid header")]
    HeaderParseError(#[from] header::ParseError),
    #[error("wrong magic number in file header: {0:08x}")]
    WrongMagic(u32),
    #[error("the frame wants a predefined dictionary, which we do not support")]
    DictionaryUnsupported,
    #[error("the header checksum was invalid")]
    HeaderChecksumFail,
    #[error("a block checksum was invalid")]
    BlockChecksumFail,
    #[error("the frame checksum was invalid")]
    FrameChecksumFail,
    #[error("the input ended in the middle of a frame")]
    PrematureEnd,
    #[error("the input ended cleanly where the next frame would begin")]
    EndOfStream,
    #[error("stream contains a compressed block with a size so large we can't even compute it (let alone fit the block in memory...)")]
    BlockLengthOverflow,
    #[error("a block decompressed to more data than allowed")]
    BlockSizeOverflow,
}
type Error = DecompressionError; // do it this way for better docs

impl From<Error> for io::Error {
    fn from(e: Error) -> io::Error {
        io::Error::new(ErrorKind::Other, e)
    }
}

/// Everything the variable-length frame descriptor told us.
#[derive(Clone, Debug)]
pub struct FrameHeader {
    flags: Flags,
    block_maxsize: usize,
    content_size: Option<u64>,
}

impl FrameHeader {
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// No single block in this frame may decode to more than this many bytes.
    pub fn block_maxsize(&self) -> usize {
        self.block_maxsize
    }

    /// The uncompressed payload size the frame declares, if it declares one.
    /// Purely advisory.
    pub fn content_size(&self) -> Option<u64> {
        self.content_size
    }
}

/// What the magic number said the next frame is.
#[derive(Debug)]
pub enum FrameKind {
    /// A regular LZ4 frame, descriptor already parsed.
    Lz4(FrameHeader),
    /// A skippable frame: `size` bytes of foreign data follow the size field.
    Skippable { magic: u32, size: u32 },
}

/// Inside a frame, running out of input is corruption, not a clean end.
fn field_error(e: io::Error) -> Error {
    if e.kind() == ErrorKind::UnexpectedEof {
        Error::PrematureEnd
    } else {
        Error::InputError(e)
    }
}

#[throws]
fn read_u8(reader: &mut impl Read) -> u8 {
    reader.read_u8().map_err(field_error)?
}

#[throws]
fn read_u32(reader: &mut impl Read) -> u32 {
    reader.read_u32::<LE>().map_err(field_error)?
}

#[throws]
fn read_exact(reader: &mut impl Read, buf: &mut [u8]) {
    reader.read_exact(buf).map_err(field_error)?
}

/// Read the magic number, distinguishing a source that is exhausted exactly at
/// the frame boundary (`EndOfStream`) from one that dies inside the field
/// (`PrematureEnd`).
#[throws]
fn read_magic(reader: &mut impl Read) -> u32 {
    let mut buf = [0u8; 4];
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => throw!(Error::EndOfStream),
            Ok(0) => throw!(Error::PrematureEnd),
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => throw!(Error::InputError(e)),
        }
    }
    u32::from_le_bytes(buf)
}

/// Discard exactly `n` bytes from the source.
#[throws]
fn skip(reader: &mut impl Read, n: u64) {
    let discarded = io::copy(&mut reader.by_ref().take(n), &mut io::sink())?;
    if discarded < n {
        throw!(Error::PrematureEnd);
    }
}

/// Parse the frame descriptor that follows an LZ4 magic number.
///
/// The descriptor is variable length, so the bytes are collected as they are
/// read; that buffer is exactly the window the trailing header checksum is
/// computed over.
#[throws]
fn read_frame_header(reader: &mut impl Read, verify_checksum: bool) -> FrameHeader {
    let mut descriptor = Vec::with_capacity(14);

    let flags_byte = read_u8(reader)?;
    descriptor.push(flags_byte);
    let flags = Flags::parse(flags_byte)?;

    let bd_byte = read_u8(reader)?;
    descriptor.push(bd_byte);
    let bd = BlockDescriptor::parse(bd_byte)?;

    let content_size = if flags.content_size() {
        let mut buf = [0u8; 8];
        read_exact(reader, &mut buf)?;
        descriptor.extend_from_slice(&buf);
        Some(u64::from_le_bytes(buf))
    } else {
        None
    };

    if flags.dictionary_id() {
        // consume the id field, then refuse: we have no dictionary to offer
        let mut buf = [0u8; 4];
        read_exact(reader, &mut buf)?;
        throw!(Error::DictionaryUnsupported);
    }

    let header_checksum = read_u8(reader)?;
    if verify_checksum {
        let mut hasher = XxHash32::with_seed(0);
        hasher.write(&descriptor);
        if (hasher.finish() >> 8) as u8 != header_checksum {
            throw!(Error::HeaderChecksumFail);
        }
    }

    let block_maxsize = bd.block_maxsize()?;
    debug!(?flags, block_maxsize, "parsed frame header");

    FrameHeader {
        flags,
        block_maxsize,
        content_size,
    }
}

/// Decodes the frames of an LZ4 stream, one whole frame at a time.
///
/// The reader does not buffer; every frame's payload is handed to the caller
/// as an owned buffer. Wrap it in [`super::decompress_stream`] for an
/// incremental `std::io::Read` view instead.
pub struct LZ4FrameReader<R: Read> {
    reader: R,
    verify_checksums: bool,
    read_buf: Vec<u8>,
    last_header: Option<FrameHeader>,
}

impl<R: Read> LZ4FrameReader<R> {
    /// Checksum verification defaults to on.
    pub fn new(reader: R) -> Self {
        Self::with_verification(reader, true)
    }

    /// `verify_checksums: false` skips the header, block and content checksum
    /// comparisons uniformly. The checksum fields are still consumed.
    pub fn with_verification(reader: R, verify_checksums: bool) -> Self {
        LZ4FrameReader {
            reader,
            verify_checksums,
            read_buf: Vec::new(),
            last_header: None,
        }
    }

    /// The descriptor of the most recently decoded LZ4 frame, if any.
    pub fn frame_header(&self) -> Option<&FrameHeader> {
        self.last_header.as_ref()
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Consume exactly one frame and return its uncompressed payload.
    ///
    /// Skippable frames are consumed whole and yield an empty payload. A
    /// source that is already exhausted fails with [`DecompressionError::EndOfStream`],
    /// the only error that does not indicate a corrupt or unsupported stream.
    #[throws]
    pub fn decode_frame(&mut self) -> Vec<u8> {
        match self.read_frame_kind()? {
            FrameKind::Skippable { size, .. } => {
                skip(&mut self.reader, u64::from(size))?;
                Vec::new()
            }
            FrameKind::Lz4(frame_header) => {
                let payload = self.decode_payload(&frame_header)?;
                self.last_header = Some(frame_header);
                payload
            }
        }
    }

    /// Read the magic number and whatever header belongs to it.
    #[throws]
    fn read_frame_kind(&mut self) -> FrameKind {
        let magic = read_magic(&mut self.reader)?;
        match magic {
            MAGIC => FrameKind::Lz4(read_frame_header(&mut self.reader, self.verify_checksums)?),
            m if (SKIPPABLE_MAGIC_LOW..=SKIPPABLE_MAGIC_HIGH).contains(&m) => {
                let size = read_u32(&mut self.reader)?;
                FrameKind::Skippable { magic: m, size }
            }
            m => throw!(Error::WrongMagic(m)),
        }
    }

    /// Decode the data blocks up to and including the end mark, plus the
    /// content checksum if the frame carries one.
    #[throws]
    fn decode_payload(&mut self, frame_header: &FrameHeader) -> Vec<u8> {
        let flags = frame_header.flags();
        let block_maxsize = frame_header.block_maxsize();

        // the declared size is advisory, but it makes a fine capacity hint
        let mut output = match frame_header.content_size() {
            Some(size) => Vec::with_capacity(size.min(PREALLOC_LIMIT) as usize),
            None => Vec::new(),
        };

        let mut content_hasher = if self.verify_checksums && flags.content_checksum() {
            Some(XxHash32::with_seed(0))
        } else {
            None
        };

        loop {
            let block_length = read_u32(&mut self.reader)?;
            if block_length == 0 {
                break; // end mark
            }

            let is_compressed = block_length & INCOMPRESSIBLE == 0;
            let block_length: usize = (block_length & !INCOMPRESSIBLE)
                .try_into()
                .or(Err(Error::BlockLengthOverflow))?;
            if block_length > block_maxsize {
                throw!(Error::BlockSizeOverflow);
            }

            let buf = &mut self.read_buf;
            buf.resize(block_length, 0);
            read_exact(&mut self.reader, buf)?;

            if flags.block_checksums() {
                let checksum = read_u32(&mut self.reader)?;
                if self.verify_checksums {
                    let mut hasher = XxHash32::with_seed(0);
                    hasher.write(buf);
                    if hasher.finish() != checksum.into() {
                        throw!(Error::BlockChecksumFail);
                    }
                }
            }

            let before = output.len();
            if is_compressed {
                // the frame-wide buffer is the lookback window, so matches may
                // reach into earlier blocks when the frame was encoded that way
                let limit = before.saturating_add(block_maxsize);
                raw::decompress_raw(buf, &mut output, limit)?;
            } else {
                output.extend_from_slice(buf);
            }

            if let Some(hasher) = content_hasher.as_mut() {
                hasher.write(&output[before..]);
            }
        }

        if flags.content_checksum() {
            let checksum = read_u32(&mut self.reader)?;
            if let Some(hasher) = content_hasher {
                if hasher.finish() != checksum.into() {
                    throw!(Error::FrameChecksumFail);
                }
            }
        }

        if let Some(expected) = frame_header.content_size() {
            if expected != output.len() as u64 {
                // the reference decoder treats this as a diagnostic, not an error
                warn!(
                    expected,
                    actual = output.len() as u64,
                    "content size field disagrees with decoded length"
                );
            }
        }

        output
    }
}

/// Decompress a single frame from `reader` into a fresh buffer.
#[throws]
pub fn decompress_frame<R: Read>(reader: R, verify_checksums: bool) -> Vec<u8> {
    LZ4FrameReader::with_verification(reader, verify_checksums).decode_frame()?
}
