use byteorder::{ReadBytesExt, LE};
use std::convert::TryFrom;
use std::io::{Cursor, Read};
use thiserror::Error;

/// Errors when decoding a raw LZ4 block.
#[derive(Error, Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DecodeError {
    /// The input ended in the middle of a sequence.
    /// Either it was truncated or you're trying to decompress garbage.
    #[error("input ended in the middle of a sequence")]
    PrematureEnd,
    /// A match may not have an offset of zero and may not reach further back
    /// than the bytes decoded so far.
    #[error("match offset {0} is outside the decoded output")]
    BadMatchOffset(usize),
    /// Decoding stopped because the output would have grown past the limit the
    /// caller imposed.
    #[error("decoded data would exceed the allowed output size")]
    OutputLimitExceeded,
}

/// This is how LZ4 encodes lengths of 15 and more.
/// Just keep reading and adding while it's all FF.
///
/// The sum is accumulated in a `u64`: the longest possible chain in a real
/// input adds 255 per input byte, which cannot overflow 64 bits before the
/// input slice runs out.
fn read_lsic(initial: u8, reader: &mut Cursor<&[u8]>) -> Result<u64, DecodeError> {
    let mut value = u64::from(initial);
    if value == 0xF {
        loop {
            let more = reader.read_u8().map_err(|_| DecodeError::PrematureEnd)?;
            value += u64::from(more);
            if more != 0xFF {
                break;
            }
        }
    }
    Ok(value)
}

/// Extend `output` by `match_len` bytes copied from `match_len` positions
/// starting `offset` bytes before the current end.
///
/// The copy has forward byte-by-byte semantics: when `offset < match_len` the
/// source range grows into the bytes this very call is writing, which is how
/// LZ4 encodes runs. The fast paths below only kick in when they provably
/// produce the same bytes.
fn copy_overlapping(
    offset: usize,
    match_len: usize,
    output: &mut Vec<u8>,
) -> Result<(), DecodeError> {
    let old_len = output.len();
    match offset {
        o if o == 0 || o > old_len => return Err(DecodeError::BadMatchOffset(offset)),

        // fastpath: memset if we repeat the same byte forever
        1 => {
            let b = output[old_len - 1];
            output.resize(old_len + match_len, b);
        }

        o if match_len <= o => {
            // fastpath: nonoverlapping
            // for borrowck reasons we have to extend with zeroes first and then memcpy
            // instead of simply using extend_from_slice
            output.resize(old_len + match_len, 0);
            let (head, tail) = output.split_at_mut(old_len);
            tail.copy_from_slice(&head[old_len - offset..][..match_len]);
        }

        2 | 4 | 8 => {
            // fastpath: overlapping, but the period divides 16

            // build a 16 byte pattern buffer so we can write 16 bytes per
            // iteration instead of one
            let mut buf = [0u8; 16];
            for chunk in buf.chunks_mut(offset) {
                chunk.copy_from_slice(&output[old_len - offset..][..offset]);
            }
            output.resize(old_len + match_len, 0);
            for target in output[old_len..].chunks_mut(buf.len()) {
                target.copy_from_slice(&buf[..target.len()]);
            }
        }

        _ => {
            // slowest path: the match overlaps its own output, copy single bytes
            output.reserve(match_len);
            for i in 0..match_len {
                let b = output[old_len - offset + i];
                output.push(b);
            }
        }
    }
    Ok(())
}

/// Decode the sequences of an LZ4 block, appending to `output`.
///
/// `output` may already hold data; matches are resolved against everything in
/// it, which is how the frame format lets a block reference the output of the
/// blocks before it. `output_limit` bounds the total length `output` is
/// allowed to reach; pass `usize::MAX` when nothing bounds it.
///
/// Returns the number of bytes appended.
pub fn decompress_raw(
    input: &[u8],
    output: &mut Vec<u8>,
    output_limit: usize,
) -> Result<usize, DecodeError> {
    let base_len = output.len();
    let mut reader = Cursor::new(input);

    loop {
        let token = match reader.read_u8() {
            Ok(x) => x,
            Err(_) => break, // a block may contain no sequences at all
        };

        // literals
        let literal_length = usize::try_from(read_lsic(token >> 4, &mut reader)?)
            .map_err(|_| DecodeError::OutputLimitExceeded)?;
        if literal_length > output_limit.saturating_sub(output.len()) {
            return Err(DecodeError::OutputLimitExceeded);
        }

        let literal_start = output.len();
        output.resize(literal_start + literal_length, 0);
        if reader.read_exact(&mut output[literal_start..]).is_err() {
            output.truncate(literal_start);
            return Err(DecodeError::PrematureEnd);
        }

        // a sequence that exactly exhausts the input is the block's last
        // and carries no match
        if reader.position() as usize == input.len() {
            break;
        }

        let offset = reader
            .read_u16::<LE>()
            .map_err(|_| DecodeError::PrematureEnd)? as usize;

        // the token's match nibble leaves out the 4-byte minimum every match has
        let match_len = usize::try_from(4 + read_lsic(token & 0xF, &mut reader)?)
            .map_err(|_| DecodeError::OutputLimitExceeded)?;
        if match_len > output_limit.saturating_sub(output.len()) {
            return Err(DecodeError::OutputLimitExceeded);
        }

        copy_overlapping(offset, match_len, output)?;
    }

    Ok(output.len() - base_len)
}

/// Decode a whole LZ4 block into a fresh buffer.
pub fn decompress_block(input: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut output = Vec::new();
    decompress_raw(input, &mut output, usize::MAX)?;
    Ok(output)
}
