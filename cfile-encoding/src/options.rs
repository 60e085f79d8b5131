/// Default target for the encoded size of one block.
pub const DEFAULT_BLOCK_SIZE: usize = 256 * 1024;

/// Options shared by every block builder writing a column.
///
/// Builders hold the options by reference and never mutate them, so a single value can be shared
/// by any number of builders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterOptions {
    /// Target encoded size of a block in bytes. A builder reports itself full once accepting
    /// another value would exceed this size.
    pub block_size: usize,
    /// Upper bound on the number of values a single `add` call accepts, if any. A limit of zero
    /// is treated as one so repeated calls always make progress.
    pub max_values_per_add: Option<usize>,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            max_values_per_add: None,
        }
    }
}

impl WriterOptions {
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_max_values_per_add(mut self, max_values_per_add: usize) -> Self {
        self.max_values_per_add = Some(max_values_per_add);
        self
    }

    /// How many of `requested` values one `add` call may look at.
    pub(crate) fn add_limit(&self, requested: usize) -> usize {
        self.max_values_per_add
            .map_or(requested, |max| requested.min(max.max(1)))
    }
}

#[cfg(test)]
mod test {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(None, 10, 10)]
    #[case(Some(4), 10, 4)]
    #[case(Some(4), 2, 2)]
    #[case(Some(0), 10, 1)]
    #[case(Some(0), 0, 0)]
    fn add_limit_clamps_requests(
        #[case] max_values_per_add: Option<usize>,
        #[case] requested: usize,
        #[case] limit: usize,
    ) {
        let options = WriterOptions {
            max_values_per_add,
            ..WriterOptions::default()
        };
        assert_eq!(options.add_limit(requested), limit);
    }
}
