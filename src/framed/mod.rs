//! The LZ4 frame format.
//!
//! An lz4-compressed file typically consists of a single frame.
//!
//! The frame format is self-terminating, i.e. it can be embedded without a
//! length prefix. This also allows LZ4 frames to be concatenated back to back,
//! and the format defines skippable frames for embedding foreign data; the
//! [`decompress_stream`] adapter hides both so a concatenated file reads as
//! one contiguous payload.
//!
//! This crate decodes frames only; it never produces them.

mod decompress;
mod header;
mod stream;

/// The four magic bytes at the start of every LZ4 frame (little endian).
pub const MAGIC: u32 = 0x184D2204;
/// Skippable frames may use any of the 16 magic numbers starting here.
pub const SKIPPABLE_MAGIC_LOW: u32 = 0x184D2A50;
/// The last magic number of the skippable range.
pub const SKIPPABLE_MAGIC_HIGH: u32 = 0x184D2A5F;
/// The frame format sets the high bit of a block's length field to indicate
/// that the data was stored uncompressed.
const INCOMPRESSIBLE: u32 = 1 << 31;

pub use decompress::*;
pub use header::*;
pub use stream::*;
