use bytes::BufMut;
use cfile_error::{CFileResult, cfile_bail, cfile_err};

use crate::group_varint::{MAX_QUAD_LEN, append_group_varint32, decode_group_varint32};

/// The header at the start of every block.
///
/// Written as a single group varint quad `(count, ordinal_pos_base, 0, 0)`; the trailing two
/// slots are reserved. An empty block starting at ordinal zero therefore has a 5-byte header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Number of values in the block.
    pub count: u32,
    /// Ordinal position of the first value of the block within its column.
    pub ordinal_pos_base: u32,
}

impl BlockHeader {
    /// Size of the smallest possible header.
    pub const MIN_LEN: usize = 5;
    /// Size of the largest possible header.
    pub const MAX_LEN: usize = MAX_QUAD_LEN;

    /// Create the header for a block of `count` values starting at `ordinal_pos_base`.
    ///
    /// Every ordinal position in the block must be representable as a `u32`.
    pub fn try_new(count: usize, ordinal_pos_base: u32) -> CFileResult<Self> {
        let count = u32::try_from(count)
            .map_err(|_| cfile_err!("block of {count} values exceeds the u32 count limit"))?;
        if ordinal_pos_base.checked_add(count).is_none() {
            cfile_bail!("ordinal positions of {count} values starting at {ordinal_pos_base} overflow u32");
        }
        Ok(Self {
            count,
            ordinal_pos_base,
        })
    }

    pub fn write<B: BufMut>(&self, buf: &mut B) {
        append_group_varint32(buf, [self.count, self.ordinal_pos_base, 0, 0]);
    }

    /// Parse the header at the start of `data`, returning it along with its encoded length.
    pub fn read(data: &[u8]) -> CFileResult<(Self, usize)> {
        if data.len() < Self::MIN_LEN {
            cfile_bail!(
                CorruptBlock: "block of {} bytes is shorter than the {}-byte minimum header",
                data.len(),
                Self::MIN_LEN
            );
        }
        let ([count, ordinal_pos_base, ..], len) = decode_group_varint32(data)?;
        if ordinal_pos_base.checked_add(count).is_none() {
            cfile_bail!(
                CorruptBlock: "header claims {count} values starting at ordinal {ordinal_pos_base}"
            );
        }
        Ok((
            Self {
                count,
                ordinal_pos_base,
            },
            len,
        ))
    }
}

#[cfg(test)]
mod test {
    use bytes::BytesMut;
    use cfile_error::ErrorKind;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, 0, 5)]
    #[case(10, 12345, 6)]
    #[case(70_000, u32::MAX - 70_000, 10)]
    fn header_round_trips(#[case] count: usize, #[case] base: u32, #[case] len: usize) {
        let header = BlockHeader::try_new(count, base).unwrap();
        let mut buf = BytesMut::new();
        header.write(&mut buf);
        assert_eq!(buf.len(), len);
        assert_eq!(BlockHeader::read(&buf).unwrap(), (header, len));
    }

    #[test]
    fn ordinal_overflow_is_rejected() {
        let err = BlockHeader::try_new(2, u32::MAX - 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[rstest]
    #[case(&[0x00, 0x00, 0x00, 0x00])]
    #[case(&[0x0c, 0x01, 0x02, 0x03, 0x04])]
    #[case(&[0x30, 0x02, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00])]
    fn short_or_inconsistent_header_is_corrupt(#[case] data: &[u8]) {
        let err = BlockHeader::read(data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptBlock);
    }
}
