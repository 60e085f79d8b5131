use cfile_error::{CFileResult, cfile_bail, cfile_err};

use crate::block::BlockDecoder;
use crate::group_varint::{GROUP_SIZE, decode_group_varint32, quad_len};
use crate::header::BlockHeader;

/// Decodes a block produced by [`IntBlockBuilder`](super::IntBlockBuilder).
///
/// Values are decoded one quad at a time into a small buffer, so reads never allocate beyond the
/// caller's output vector.
pub struct IntBlockDecoder<'a> {
    data: &'a [u8],
    parsed: bool,
    count: usize,
    ordinal_pos_base: u32,
    /// Byte offset of the first quad.
    payload_start: usize,
    cursor: Cursor,
}

/// Read position within the payload, restored as a whole when a read fails.
#[derive(Clone, Copy)]
struct Cursor {
    /// Index of the next value to emit.
    cur_idx: usize,
    /// The most recently decoded quad, holding values `quad_idx..quad_idx + 4`.
    quad: [u32; GROUP_SIZE],
    quad_idx: usize,
    quad_loaded: bool,
    /// Byte offset and first value index of the quad after the loaded one.
    next_quad: usize,
    next_quad_idx: usize,
}

impl Cursor {
    fn at(payload_start: usize) -> Self {
        Self {
            cur_idx: 0,
            quad: [0; GROUP_SIZE],
            quad_idx: 0,
            quad_loaded: false,
            next_quad: payload_start,
            next_quad_idx: 0,
        }
    }
}

impl<'a> IntBlockDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            parsed: false,
            count: 0,
            ordinal_pos_base: 0,
            payload_start: 0,
            cursor: Cursor::at(0),
        }
    }

    fn ensure_parsed(&self) -> CFileResult<()> {
        if !self.parsed {
            cfile_bail!(InvalidState: "int block header has not been parsed");
        }
        Ok(())
    }

    /// Decode the quad at byte `offset`, which holds values starting at `idx`.
    fn load_quad(&mut self, offset: usize, idx: usize) -> CFileResult<()> {
        let rest = self.data.get(offset..).unwrap_or_default();
        let (quad, len) = decode_group_varint32(rest)?;
        self.cursor.quad = quad;
        self.cursor.quad_idx = idx;
        self.cursor.quad_loaded = true;
        self.cursor.next_quad = offset + len;
        self.cursor.next_quad_idx = idx + GROUP_SIZE;
        Ok(())
    }

    /// Byte offset of the quad starting with value `target`, found by walking selector bytes
    /// from the closest known quad.
    fn quad_offset(&self, target: usize) -> CFileResult<usize> {
        let (mut offset, mut idx) = if self.cursor.next_quad_idx <= target {
            (self.cursor.next_quad, self.cursor.next_quad_idx)
        } else {
            (self.payload_start, 0)
        };
        while idx < target {
            let Some(&selector) = self.data.get(offset) else {
                cfile_bail!(CorruptBlock: "int block ends before the quad holding value {idx}");
            };
            let len = quad_len(selector);
            if offset + len > self.data.len() {
                cfile_bail!(
                    CorruptBlock: "quad at byte {offset} needs {len} bytes, int block has {}",
                    self.data.len()
                );
            }
            offset += len;
            idx += GROUP_SIZE;
        }
        Ok(offset)
    }

    /// Emit values up to index `end`, loading quads as the cursor crosses into them.
    fn read_values(&mut self, end: usize, out: &mut Vec<u32>) -> CFileResult<()> {
        while self.cursor.cur_idx < end {
            let Cursor {
                cur_idx,
                quad_idx,
                quad_loaded,
                next_quad,
                next_quad_idx,
                ..
            } = self.cursor;
            if !quad_loaded || cur_idx >= quad_idx + GROUP_SIZE {
                self.load_quad(next_quad, next_quad_idx)?;
            }
            let offset = self.cursor.cur_idx - self.cursor.quad_idx;
            let take = (GROUP_SIZE - offset).min(end - self.cursor.cur_idx);
            out.extend_from_slice(&self.cursor.quad[offset..offset + take]);
            self.cursor.cur_idx += take;
        }
        Ok(())
    }
}

impl BlockDecoder for IntBlockDecoder<'_> {
    type Value = u32;

    fn parse_header(&mut self) -> CFileResult<()> {
        let (header, len) = BlockHeader::read(self.data)?;
        self.count = header.count as usize;
        self.ordinal_pos_base = header.ordinal_pos_base;
        self.payload_start = len;
        self.cursor = Cursor::at(len);
        self.parsed = true;
        Ok(())
    }

    fn count(&self) -> usize {
        self.count
    }

    fn ordinal_pos(&self) -> u32 {
        self.ordinal_pos_base + self.cursor.cur_idx as u32
    }

    fn has_next(&self) -> bool {
        self.cursor.cur_idx < self.count
    }

    fn seek_to_position_in_block(&mut self, idx: usize) -> CFileResult<()> {
        self.ensure_parsed()?;
        if idx >= self.count {
            cfile_bail!(
                "cannot seek to value {idx} of an int block holding {}",
                self.count
            );
        }

        let target = idx - idx % GROUP_SIZE;
        if !(self.cursor.quad_loaded && self.cursor.quad_idx == target) {
            let offset = self.quad_offset(target)?;
            self.load_quad(offset, target)?;
        }
        self.cursor.cur_idx = idx;
        Ok(())
    }

    fn get_next_values(&mut self, n: usize, out: &mut Vec<u32>) -> CFileResult<usize> {
        self.ensure_parsed()?;
        let n = n.min(self.count - self.cursor.cur_idx);
        out.reserve(n);

        let start_len = out.len();
        let start = self.cursor;
        if let Err(err) = self.read_values(self.cursor.cur_idx + n, out) {
            out.truncate(start_len);
            self.cursor = start;
            return Err(cfile_err!(Context: "failed to read int block values", err));
        }
        Ok(n)
    }
}
