use bytes::BytesMut;
use cfile_error::{CFileResult, cfile_bail};

use crate::block::{AddOutcome, BlockBuilder};
use crate::group_varint::{GROUP_SIZE, append_group_varint32, byte_width};
use crate::header::BlockHeader;
use crate::options::WriterOptions;

/// Builds a block of `u32` values encoded with group varint.
pub struct IntBlockBuilder<'a> {
    options: &'a WriterOptions,
    values: Vec<u32>,
    /// Sum of the encoded widths of `values`.
    value_bytes: usize,
    buffer: BytesMut,
    finished: bool,
}

impl<'a> IntBlockBuilder<'a> {
    pub fn new(options: &'a WriterOptions) -> Self {
        Self {
            options,
            values: Vec::new(),
            value_bytes: 0,
            buffer: BytesMut::new(),
            finished: false,
        }
    }

    /// Size of a block holding `count` values whose widths sum to `value_bytes`.
    fn block_size(count: usize, value_bytes: usize) -> usize {
        let quads = count.div_ceil(GROUP_SIZE);
        // Every quad carries a selector, and every padding slot a single zero byte.
        let padding = quads * GROUP_SIZE - count;
        BlockHeader::MAX_LEN + quads + value_bytes + padding
    }
}

impl BlockBuilder for IntBlockBuilder<'_> {
    type Value<'v> = u32;

    fn add<'v>(&mut self, values: &[Self::Value<'v>]) -> CFileResult<AddOutcome> {
        if self.finished {
            cfile_bail!(InvalidState: "cannot add to a finished int block without a reset");
        }

        let limit = self.options.add_limit(values.len());
        let mut accepted = 0;
        for &value in &values[..limit] {
            let width = byte_width(value);
            let grown = Self::block_size(self.values.len() + 1, self.value_bytes + width);
            if !self.values.is_empty() && grown > self.options.block_size {
                break;
            }
            self.values.push(value);
            self.value_bytes += width;
            accepted += 1;
        }

        let full = accepted < limit || self.is_full();
        if accepted < values.len() {
            log::trace!(
                "Int block accepted {accepted} of {} values (full: {full})",
                values.len()
            );
        }
        Ok(AddOutcome { accepted, full })
    }

    fn count(&self) -> usize {
        self.values.len()
    }

    fn is_full(&self) -> bool {
        self.estimated_size() >= self.options.block_size
    }

    fn estimated_size(&self) -> usize {
        Self::block_size(self.values.len(), self.value_bytes)
    }

    fn finish(&mut self, ordinal_pos_base: u32) -> CFileResult<&[u8]> {
        if self.finished {
            cfile_bail!(InvalidState: "int block already finished, reset before finishing again");
        }
        let header = BlockHeader::try_new(self.values.len(), ordinal_pos_base)?;

        self.buffer.clear();
        self.buffer.reserve(self.estimated_size());
        header.write(&mut self.buffer);
        for chunk in self.values.chunks(GROUP_SIZE) {
            let mut quad = [0u32; GROUP_SIZE];
            quad[..chunk.len()].copy_from_slice(chunk);
            append_group_varint32(&mut self.buffer, quad);
        }
        self.finished = true;

        log::debug!(
            "Finished int block of {} values at ordinal {ordinal_pos_base}: {} bytes",
            self.values.len(),
            self.buffer.len()
        );
        Ok(&self.buffer[..])
    }

    fn reset(&mut self) {
        self.values.clear();
        self.value_bytes = 0;
        self.buffer.clear();
        self.finished = false;
    }
}
