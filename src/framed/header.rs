#![allow(non_upper_case_globals)]

use bitflags::bitflags;
use fehler::{throw, throws};
use thiserror::Error;

bitflags! {
    /// The feature bits of the frame descriptor's flag byte.
    pub struct Flags: u8 {
        const IndependentBlocks = 0b00100000;
        const BlockChecksums    = 0b00010000;
        const ContentSize       = 0b00001000;
        const ContentChecksum   = 0b00000100;
        const DictionaryId      = 0b00000001;
    }
}

/// Errors when parsing the two descriptor bytes at the start of a frame.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("at the time of writing this, spec says block maxsize value {0} is reserved")]
    UnimplementedBlocksize(u8),
    #[error("file version {0} not supported")]
    UnsupportedVersion(u8),
    #[error("reserved bits in flags set")]
    ReservedFlagBitsSet,
    #[error("reserved bits in bd set")]
    ReservedBdBitsSet,
}

impl Flags {
    /// The flag byte also carries the 2-bit format version in its top bits and
    /// a reserved bit right below the feature bits; both are checked here.
    #[throws(ParseError)]
    pub fn parse(i: u8) -> Self {
        let version = i >> 6;
        if version != 1 {
            throw!(ParseError::UnsupportedVersion(version));
        }
        if (i & 0b10) != 0 {
            throw!(ParseError::ReservedFlagBitsSet);
        }

        Flags::from_bits_truncate(i)
    }

    pub fn independent_blocks(&self) -> bool { self.contains(Flags::IndependentBlocks) }
    pub fn block_checksums(&self)    -> bool { self.contains(Flags::BlockChecksums) }
    pub fn content_size(&self)       -> bool { self.contains(Flags::ContentSize) }
    pub fn content_checksum(&self)   -> bool { self.contains(Flags::ContentChecksum) }
    pub fn dictionary_id(&self)      -> bool { self.contains(Flags::DictionaryId) }
}

/// The second descriptor byte, carrying nothing but the block maxsize code.
pub struct BlockDescriptor(pub u8);

impl BlockDescriptor {
    #[throws(ParseError)]
    pub fn parse(i: u8) -> Self {
        if (i & 0b10001111) != 0 {
            throw!(ParseError::ReservedBdBitsSet);
        }
        BlockDescriptor(i)
    }

    /// Decodes the 3-bit size code: 4..=7 mean 64 KiB, 256 KiB, 1 MiB, 4 MiB.
    /// The remaining codes are reserved.
    #[throws(ParseError)]
    pub fn block_maxsize(&self) -> usize {
        let size = (self.0 >> 4) & 0b111;
        if (4..8).contains(&size) {
            1 << (size * 2 + 8)
        } else {
            throw!(ParseError::UnimplementedBlocksize(size))
        }
    }
}
