#![no_main]

use cfile_encoding::{BlockDecoder, StringBlockDecoder};
use libfuzzer_sys::{Corpus, fuzz_target};

fuzz_target!(|data: &[u8]| -> Corpus {
    let mut decoder = StringBlockDecoder::new(data);
    if decoder.parse_header().is_err() {
        return Corpus::Reject;
    }

    let count = decoder.count();
    let mut sequential = Vec::new();
    while decoder.has_next() {
        if decoder.get_next_values(5, &mut sequential).is_err() {
            return Corpus::Keep;
        }
    }
    assert_eq!(sequential.len(), count);

    // Seeking must land on the same value sequential iteration produced.
    let mut out = Vec::with_capacity(1);
    for (idx, expected) in sequential.iter().enumerate().rev() {
        out.clear();
        decoder.seek_to_position_in_block(idx).unwrap();
        decoder.get_next_values(1, &mut out).unwrap();
        assert_eq!(out[0], *expected);
    }
    Corpus::Keep
});
