#![allow(clippy::cast_possible_truncation)]
//! Block encodings for CFile columns.
//!
//! A column is written as a sequence of blocks, each covering a contiguous run of ordinal
//! positions. This crate turns runs of values into self-describing blocks and reads them back
//! with sequential iteration and positional seeks:
//!
//! 1. [`IntBlockBuilder`] / [`IntBlockDecoder`] store `u32` values as group varint quads (see
//!    [`group_varint`]). Seeking walks the quad selectors and decodes a single quad.
//!
//! 2. [`StringBlockBuilder`] / [`StringBlockDecoder`] store byte strings behind a table of end
//!    offsets, so any value is located in constant time. Decoded strings borrow from the block.
//!
//! Every block starts with a [`BlockHeader`] carrying the value count and the ordinal position of
//! the first value. Builders are configured with a shared [`WriterOptions`], which bounds how
//! large a block may grow. Block framing, indexing and compression belong to the file layer and
//! are not handled here.
//!
//! # Writing
//!
//! ```
//! use cfile_encoding::{BlockBuilder, BlockDecoder, IntBlockBuilder, IntBlockDecoder, WriterOptions};
//!
//! let options = WriterOptions::default();
//! let mut builder = IntBlockBuilder::new(&options);
//! let values = [3, 1, 4, 1, 5, 9, 2, 6];
//! let mut rest = &values[..];
//! while !rest.is_empty() {
//!     let outcome = builder.add(rest)?;
//!     rest = &rest[outcome.accepted..];
//! }
//! let block = builder.finish(100)?;
//!
//! let mut decoder = IntBlockDecoder::new(block);
//! decoder.parse_header()?;
//! decoder.seek_to_position_in_block(5)?;
//! assert_eq!(decoder.ordinal_pos(), 105);
//!
//! let mut out = Vec::new();
//! decoder.get_next_values(2, &mut out)?;
//! assert_eq!(out, [9, 2]);
//! # Ok::<(), cfile_error::CFileError>(())
//! ```

pub use block::*;
pub use header::*;
pub use int_block::*;
pub use options::*;
pub use string_block::*;

mod block;
pub mod group_varint;
mod header;
mod int_block;
mod options;
mod string_block;
