use bytes::{BufMut, BytesMut};
use cfile_error::{CFileResult, cfile_bail};

use super::OFFSET_SIZE;
use crate::block::{AddOutcome, BlockBuilder};
use crate::header::BlockHeader;
use crate::options::WriterOptions;

/// Builds a block of byte strings.
///
/// Values are copied on [`add`](BlockBuilder::add), so callers may drop their strings as soon as
/// the call returns.
pub struct StringBlockBuilder<'a> {
    options: &'a WriterOptions,
    /// End offset of every value within `values`.
    offsets: Vec<u32>,
    values: BytesMut,
    buffer: BytesMut,
    finished: bool,
}

impl<'a> StringBlockBuilder<'a> {
    pub fn new(options: &'a WriterOptions) -> Self {
        Self {
            options,
            offsets: Vec::new(),
            values: BytesMut::new(),
            buffer: BytesMut::new(),
            finished: false,
        }
    }

    fn block_size(count: usize, value_bytes: usize) -> usize {
        BlockHeader::MAX_LEN + count * OFFSET_SIZE + value_bytes
    }
}

impl BlockBuilder for StringBlockBuilder<'_> {
    type Value<'v> = &'v [u8];

    fn add<'v>(&mut self, values: &[Self::Value<'v>]) -> CFileResult<AddOutcome> {
        if self.finished {
            cfile_bail!(InvalidState: "cannot add to a finished string block without a reset");
        }

        let limit = self.options.add_limit(values.len());
        let mut accepted = 0;
        for value in &values[..limit] {
            let Ok(end) = u32::try_from(self.values.len() + value.len()) else {
                if self.offsets.is_empty() {
                    cfile_bail!(
                        "string of {} bytes does not fit in a single block",
                        value.len()
                    );
                }
                break;
            };
            let grown = Self::block_size(self.offsets.len() + 1, end as usize);
            if !self.offsets.is_empty() && grown > self.options.block_size {
                break;
            }
            self.offsets.push(end);
            self.values.extend_from_slice(value);
            accepted += 1;
        }

        let full = accepted < limit || self.is_full();
        if accepted < values.len() {
            log::trace!(
                "String block accepted {accepted} of {} values (full: {full})",
                values.len()
            );
        }
        Ok(AddOutcome { accepted, full })
    }

    fn count(&self) -> usize {
        self.offsets.len()
    }

    fn is_full(&self) -> bool {
        self.estimated_size() >= self.options.block_size
    }

    fn estimated_size(&self) -> usize {
        Self::block_size(self.offsets.len(), self.values.len())
    }

    fn finish(&mut self, ordinal_pos_base: u32) -> CFileResult<&[u8]> {
        if self.finished {
            cfile_bail!(InvalidState: "string block already finished, reset before finishing again");
        }
        let header = BlockHeader::try_new(self.offsets.len(), ordinal_pos_base)?;

        self.buffer.clear();
        self.buffer.reserve(self.estimated_size());
        header.write(&mut self.buffer);
        for &end in &self.offsets {
            self.buffer.put_u32_le(end);
        }
        self.buffer.extend_from_slice(&self.values);
        self.finished = true;

        log::debug!(
            "Finished string block of {} values ({} value bytes) at ordinal {ordinal_pos_base}: {} bytes",
            self.offsets.len(),
            self.values.len(),
            self.buffer.len()
        );
        Ok(&self.buffer[..])
    }

    fn reset(&mut self) {
        self.offsets.clear();
        self.values.clear();
        self.buffer.clear();
        self.finished = false;
    }
}
