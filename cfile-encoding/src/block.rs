use cfile_error::CFileResult;

/// The result of offering a run of values to a [`BlockBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOutcome {
    /// How many values from the front of the run were accepted.
    pub accepted: usize,
    /// Whether the block has reached its size target. The caller should finish the block, reset
    /// the builder and offer the rest of the run again.
    pub full: bool,
}

/// Accumulates a run of values and encodes them into a single block.
pub trait BlockBuilder {
    /// The values accepted by [`add`](Self::add), borrowed for no longer than the call.
    type Value<'v>;

    /// Offer `values` to the block. Only a prefix may be accepted, callers advance their own
    /// cursor by [`AddOutcome::accepted`] and call again.
    fn add<'v>(&mut self, values: &[Self::Value<'v>]) -> CFileResult<AddOutcome>;

    /// Number of values accepted since construction or the last [`reset`](Self::reset).
    fn count(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Whether the block has reached its size target.
    fn is_full(&self) -> bool;

    /// Upper bound on the size of the block [`finish`](Self::finish) would produce now.
    fn estimated_size(&self) -> usize;

    /// Encode the accepted values into a block whose first value sits at `ordinal_pos_base`.
    ///
    /// The returned bytes stay valid until the builder is reset or dropped. Finishing twice
    /// without a reset is an error.
    fn finish(&mut self, ordinal_pos_base: u32) -> CFileResult<&[u8]>;

    /// Return the builder to its empty state, keeping its allocations for the next block.
    fn reset(&mut self);
}

/// Reads the values back out of a block produced by a [`BlockBuilder`].
///
/// A decoder starts unparsed; [`parse_header`](Self::parse_header) must succeed before values
/// can be read or sought.
pub trait BlockDecoder {
    type Value;

    /// Validate the block header and position the cursor at the first value.
    fn parse_header(&mut self) -> CFileResult<()>;

    /// Number of values in the block, zero until the header is parsed.
    fn count(&self) -> usize;

    /// Ordinal position of the value the next read returns.
    fn ordinal_pos(&self) -> u32;

    /// Whether any values remain after the cursor.
    fn has_next(&self) -> bool;

    /// Move the cursor to the `idx`-th value of the block, in either direction.
    fn seek_to_position_in_block(&mut self, idx: usize) -> CFileResult<()>;

    /// Append up to `n` values to `out`, advancing the cursor. Returns how many were appended,
    /// which is fewer than `n` only when the block runs out.
    fn get_next_values(&mut self, n: usize, out: &mut Vec<Self::Value>) -> CFileResult<usize>;
}
