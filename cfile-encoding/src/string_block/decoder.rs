use cfile_error::{CFileExpect, CFileResult, cfile_bail, cfile_err};

use super::OFFSET_SIZE;
use crate::block::BlockDecoder;
use crate::header::BlockHeader;

/// Decodes a block produced by [`StringBlockBuilder`](super::StringBlockBuilder).
///
/// Decoded values borrow from the block itself, so they remain valid after the decoder is
/// dropped or moved to another position.
pub struct StringBlockDecoder<'a> {
    data: &'a [u8],
    parsed: bool,
    count: usize,
    ordinal_pos_base: u32,
    offsets: &'a [u8],
    values: &'a [u8],
    cur_idx: usize,
}

impl<'a> StringBlockDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            parsed: false,
            count: 0,
            ordinal_pos_base: 0,
            offsets: &[],
            values: &[],
            cur_idx: 0,
        }
    }

    /// End offset of value `idx` within the value bytes.
    fn end_offset(&self, idx: usize) -> usize {
        let start = idx * OFFSET_SIZE;
        let bytes = self
            .offsets
            .get(start..start + OFFSET_SIZE)
            .and_then(|b| <[u8; OFFSET_SIZE]>::try_from(b).ok())
            .cfile_expect("offset table covers every value");
        u32::from_le_bytes(bytes) as usize
    }

    fn value(&self, idx: usize) -> CFileResult<&'a [u8]> {
        let start = if idx == 0 {
            0
        } else {
            self.end_offset(idx - 1)
        };
        let end = self.end_offset(idx);
        self.values.get(start..end).ok_or_else(|| {
            cfile_err!(
                CorruptBlock: "value {idx} spans {start}..{end} of a {}-byte string block",
                self.values.len()
            )
        })
    }
}

impl<'a> BlockDecoder for StringBlockDecoder<'a> {
    type Value = &'a [u8];

    fn parse_header(&mut self) -> CFileResult<()> {
        let (header, len) = BlockHeader::read(self.data)?;
        let count = header.count as usize;
        let body = &self.data[len..];
        let Some((offsets, values)) = count
            .checked_mul(OFFSET_SIZE)
            .and_then(|table_len| body.split_at_checked(table_len))
        else {
            cfile_bail!(
                CorruptBlock: "string block of {} bytes cannot hold offsets for {count} values",
                self.data.len()
            );
        };

        let total = offsets
            .last_chunk::<OFFSET_SIZE>()
            .map_or(0, |end| u32::from_le_bytes(*end) as usize);
        if total != values.len() {
            cfile_bail!(
                CorruptBlock: "string block offsets cover {total} bytes but {} follow the offset table",
                values.len()
            );
        }

        self.count = count;
        self.ordinal_pos_base = header.ordinal_pos_base;
        self.offsets = offsets;
        self.values = values;
        self.cur_idx = 0;
        self.parsed = true;
        Ok(())
    }

    fn count(&self) -> usize {
        self.count
    }

    fn ordinal_pos(&self) -> u32 {
        self.ordinal_pos_base + self.cur_idx as u32
    }

    fn has_next(&self) -> bool {
        self.cur_idx < self.count
    }

    fn seek_to_position_in_block(&mut self, idx: usize) -> CFileResult<()> {
        if !self.parsed {
            cfile_bail!(InvalidState: "string block header has not been parsed");
        }
        if idx >= self.count {
            cfile_bail!(
                "cannot seek to value {idx} of a string block holding {}",
                self.count
            );
        }
        self.cur_idx = idx;
        Ok(())
    }

    fn get_next_values(&mut self, n: usize, out: &mut Vec<&'a [u8]>) -> CFileResult<usize> {
        if !self.parsed {
            cfile_bail!(InvalidState: "string block header has not been parsed");
        }
        let n = n.min(self.count - self.cur_idx);
        out.reserve(n);
        let start_len = out.len();
        for idx in self.cur_idx..self.cur_idx + n {
            match self.value(idx) {
                Ok(value) => out.push(value),
                Err(err) => {
                    out.truncate(start_len);
                    return Err(cfile_err!(Context: "failed to read string block values", err));
                }
            }
        }
        self.cur_idx += n;
        Ok(n)
    }
}

#[cfg(test)]
mod test {
    use cfile_error::ErrorKind;
    use rstest::rstest;

    use super::*;
    use crate::block::BlockBuilder;
    use crate::options::WriterOptions;
    use crate::string_block::StringBlockBuilder;

    const ORDINAL_POS_BASE: u32 = 12345;
    const COUNT: usize = 10;

    fn expected(i: usize) -> String {
        format!("hello {i}")
    }

    fn encode() -> Vec<u8> {
        let owned: Vec<String> = (0..COUNT).map(expected).collect();
        let values: Vec<&[u8]> = owned.iter().map(|s| s.as_bytes()).collect();

        let options = WriterOptions::default();
        let mut builder = StringBlockBuilder::new(&options);
        let mut rest = values.as_slice();
        while !rest.is_empty() {
            let outcome = builder.add(rest).unwrap();
            assert!(outcome.accepted > 0);
            rest = &rest[outcome.accepted..];
        }
        assert_eq!(builder.count(), COUNT);

        let block = builder.finish(ORDINAL_POS_BASE).unwrap();
        assert!(block.len() > COUNT * 2);
        block.to_vec()
    }

    #[test]
    fn iterates_then_seeks_backwards() {
        let block = encode();
        let mut decoder = StringBlockDecoder::new(&block);
        decoder.parse_header().unwrap();
        assert_eq!(decoder.count(), COUNT);
        assert_eq!(decoder.ordinal_pos(), ORDINAL_POS_BASE);
        assert!(decoder.has_next());

        let mut out = Vec::new();
        for i in 0..COUNT {
            assert_eq!(decoder.ordinal_pos(), ORDINAL_POS_BASE + i as u32);
            out.clear();
            assert_eq!(decoder.get_next_values(1, &mut out).unwrap(), 1);
            assert_eq!(out[0], expected(i).as_bytes());
        }
        assert!(!decoder.has_next());

        for i in (0..COUNT).rev() {
            decoder.seek_to_position_in_block(i).unwrap();
            assert_eq!(decoder.ordinal_pos(), ORDINAL_POS_BASE + i as u32);
        }

        out.clear();
        decoder.seek_to_position_in_block(0).unwrap();
        assert_eq!(decoder.get_next_values(COUNT, &mut out).unwrap(), COUNT);
        assert!(!decoder.has_next());
        for (i, value) in out.iter().enumerate() {
            assert_eq!(*value, expected(i).as_bytes());
        }
    }

    #[test]
    fn over_request_returns_the_remainder() {
        let block = encode();
        let mut decoder = StringBlockDecoder::new(&block);
        decoder.parse_header().unwrap();
        decoder.seek_to_position_in_block(7).unwrap();

        let mut out = Vec::new();
        assert_eq!(decoder.get_next_values(100, &mut out).unwrap(), 3);
        assert_eq!(out, [b"hello 7", b"hello 8", b"hello 9"]);
        assert_eq!(decoder.get_next_values(1, &mut out).unwrap(), 0);
    }

    #[test]
    fn values_outlive_the_decoder() {
        let block = encode();
        let mut out = Vec::new();
        {
            let mut decoder = StringBlockDecoder::new(&block);
            decoder.parse_header().unwrap();
            decoder.get_next_values(2, &mut out).unwrap();
        }
        assert_eq!(out, [b"hello 0", b"hello 1"]);
    }

    #[test]
    fn empty_block_decodes() {
        let options = WriterOptions::default();
        let mut builder = StringBlockBuilder::new(&options);
        let block = builder.finish(3).unwrap();

        let mut decoder = StringBlockDecoder::new(block);
        decoder.parse_header().unwrap();
        assert_eq!(decoder.count(), 0);
        assert!(!decoder.has_next());
        assert_eq!(decoder.ordinal_pos(), 3);
        let err = decoder.seek_to_position_in_block(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn reads_before_parse_are_invalid() {
        let block = encode();
        let mut decoder = StringBlockDecoder::new(&block);
        let err = decoder.get_next_values(1, &mut Vec::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[rstest]
    #[case::short_header(&[0x00, 0x01])]
    #[case::missing_offsets(&[0x00, 0x02, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00])]
    #[case::offsets_past_end(&[0x00, 0x01, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00, b'a'])]
    #[case::trailing_bytes(&[0x00, 0x00, 0x00, 0x00, 0x00, b'a'])]
    fn malformed_block_is_corrupt(#[case] block: &[u8]) {
        let err = StringBlockDecoder::new(block).parse_header().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptBlock);
    }

    #[test]
    fn decreasing_offsets_are_corrupt() {
        let block = [
            0x00, 0x02, 0x00, 0x00, 0x00, // header
            0x02, 0x00, 0x00, 0x00, //
            0x01, 0x00, 0x00, 0x00, //
            b'a',
        ];
        let mut decoder = StringBlockDecoder::new(&block);
        decoder.parse_header().unwrap();
        decoder.seek_to_position_in_block(1).unwrap();
        let err = decoder.get_next_values(1, &mut Vec::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptBlock);
    }

    #[test]
    fn failed_read_leaves_cursor_and_output_untouched() {
        let block = [
            0x00, 0x02, 0x64, 0x00, 0x00, // header, base 100
            0x02, 0x00, 0x00, 0x00, //
            0x01, 0x00, 0x00, 0x00, //
            b'a',
        ];
        let mut decoder = StringBlockDecoder::new(&block);
        decoder.parse_header().unwrap();

        let mut out = Vec::new();
        let err = decoder.get_next_values(2, &mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptBlock);
        assert!(
            err.to_string()
                .starts_with("failed to read string block values: corrupt block")
        );
        assert!(out.is_empty());
        assert_eq!(decoder.ordinal_pos(), 100);
        assert!(decoder.has_next());
    }
}
