//! The raw LZ4 block format.
//!
//! A block is nothing but sequences: a token byte, some literals, and a
//! back-reference into the bytes decoded so far. There is no magic number, no
//! length field and no checksum, so a block is only decodable when some outer
//! container already delimits the compressed bytes. The `framed` module is
//! that container; use this module directly when you have your own.

mod decompress;

pub use decompress::*;
