//! Blocks of byte strings, encoded as a header, an offset table and the concatenated values.
//!
//! ```text
//! ┌────────────────────────────┬──────────────────────────┬──────────────────────────┐
//! │ header quad                │ end offsets              │ value bytes              │
//! │ (count, ordinal base, 0, 0)│ count x u32 little-endian│ concatenated, no padding │
//! └────────────────────────────┴──────────────────────────┴──────────────────────────┘
//! ```
//!
//! Value `i` spans `end[i - 1]..end[i]` of the value bytes, with `end[-1] = 0`, so any value can
//! be located in constant time.

mod builder;
mod decoder;

pub use builder::*;
pub use decoder::*;

/// Size of one entry of the offset table.
const OFFSET_SIZE: usize = size_of::<u32>();
