//! Blocks of `u32` values, encoded as a header followed by group varint quads.
//!
//! ```text
//! ┌────────────────────────────┬────────┬────────┬─────┬──────────────────────┐
//! │ header quad                │ quad 0 │ quad 1 │ ... │ last quad, zero pad  │
//! │ (count, ordinal base, 0, 0)│        │        │     │ past `count`         │
//! └────────────────────────────┴────────┴────────┴─────┴──────────────────────┘
//! ```

mod builder;
mod decoder;

pub use builder::*;
pub use decoder::*;
