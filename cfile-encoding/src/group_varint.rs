//! Group varint encoding of `u32` quads.
//!
//! A quad is written as one selector byte followed by each value in little-endian order with its
//! leading zero bytes dropped. The selector holds `width - 1` for every value in two bits, the
//! first value in the most significant pair:
//!
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┬──────────┐
//! │ selector │ v0 (1-4) │ v1 (1-4) │ v2 (1-4) │ v3 (1-4) │
//! └──────────┴──────────┴──────────┴──────────┴──────────┘
//!  76 54 32 10
//!  w0 w1 w2 w3
//! ```

use bytes::{Buf, BufMut};
use cfile_error::{CFileResult, cfile_bail};

/// Number of values encoded together in one quad.
pub const GROUP_SIZE: usize = 4;

/// Encoded length of the largest possible quad.
pub const MAX_QUAD_LEN: usize = 1 + GROUP_SIZE * size_of::<u32>();

/// Encoded length of a quad, indexed by its selector byte.
const QUAD_LENGTHS: [u8; 256] = quad_lengths();

const fn quad_lengths() -> [u8; 256] {
    let mut lengths = [0u8; 256];
    let mut selector = 0;
    while selector < lengths.len() {
        let s = selector as u8;
        lengths[selector] = 5 + (s >> 6 & 0b11) + (s >> 4 & 0b11) + (s >> 2 & 0b11) + (s & 0b11);
        selector += 1;
    }
    lengths
}

/// The number of bytes a quad occupies, selector included, as implied by its selector byte.
#[inline]
pub fn quad_len(selector: u8) -> usize {
    QUAD_LENGTHS[selector as usize] as usize
}

/// Minimal number of little-endian bytes needed to hold `value`. Zero still takes one byte.
#[inline]
pub fn byte_width(value: u32) -> usize {
    (size_of::<u32>() - value.leading_zeros() as usize / 8).max(1)
}

/// Append one quad to `buf`.
pub fn append_group_varint32<B: BufMut>(buf: &mut B, values: [u32; GROUP_SIZE]) {
    let widths = values.map(byte_width);
    let selector = widths
        .iter()
        .fold(0u8, |selector, width| (selector << 2) | (*width as u8 - 1));

    buf.put_u8(selector);
    for (value, width) in values.into_iter().zip(widths) {
        buf.put_uint_le(u64::from(value), width);
    }
}

/// Decode the quad at the start of `data`.
///
/// Returns the four values and the number of bytes consumed. Fails with
/// [`CorruptBlock`](cfile_error::CFileError::CorruptBlock) if `data` is shorter than the selector
/// byte implies.
pub fn decode_group_varint32(data: &[u8]) -> CFileResult<([u32; GROUP_SIZE], usize)> {
    let Some(&selector) = data.first() else {
        cfile_bail!(CorruptBlock: "expected a group varint selector, found end of block");
    };
    let len = quad_len(selector);
    if data.len() < len {
        cfile_bail!(
            CorruptBlock: "group varint quad with selector {selector:#010b} needs {len} bytes, only {} remain",
            data.len()
        );
    }

    let mut payload = &data[1..len];
    let mut values = [0u32; GROUP_SIZE];
    for (i, value) in values.iter_mut().enumerate() {
        let width = ((selector >> (6 - 2 * i)) & 0b11) as usize + 1;
        *value = payload.get_uint_le(width) as u32;
    }
    Ok((values, len))
}
