#![forbid(unsafe_code)]

//! Decoding LZ4, the fast compression format.
//!
//! This crate only decodes. It understands the raw block format (the
//! literal/match stream itself) and the frame container around it (magic
//! number, descriptor, checksummed data blocks), and it can present a whole
//! sequence of concatenated frames as a single [`std::io::Read`].
//!
//! Most callers want one of:
//! - [`framed::decompress_frame`] to decode exactly one frame in one call
//! - [`framed::decompress_stream`] to read a file containing any number of
//!   frames, skippable frames included
//! - [`raw::decompress_block`] when something else already delimits the
//!   compressed bytes and there is no framing to speak of

pub mod framed;
pub mod raw;

pub use framed::{
    decompress_frame, decompress_stream, DecompressionError, LZ4FrameReader, LZ4StreamReader,
};
pub use raw::decompress_block;
