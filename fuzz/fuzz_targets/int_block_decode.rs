#![no_main]

use cfile_encoding::{BlockDecoder, IntBlockDecoder};
use libfuzzer_sys::{Corpus, fuzz_target};

fuzz_target!(|data: &[u8]| -> Corpus {
    let mut decoder = IntBlockDecoder::new(data);
    if decoder.parse_header().is_err() {
        return Corpus::Reject;
    }

    // Any sequence of reads and seeks must either succeed or report an error.
    let count = decoder.count();
    let mut out = Vec::new();
    while decoder.has_next() {
        let before = (out.len(), decoder.ordinal_pos());
        match decoder.get_next_values(7, &mut out) {
            Ok(n) => assert!(n > 0 && n <= 7 && out.len() == before.0 + n),
            Err(_) => {
                // A failed read appends nothing and leaves the cursor in place.
                assert_eq!((out.len(), decoder.ordinal_pos()), before);
                break;
            }
        }
    }
    for idx in [count.saturating_sub(1), count / 2, 0] {
        if decoder.seek_to_position_in_block(idx).is_ok() {
            let before = out.len();
            match decoder.get_next_values(3, &mut out) {
                Ok(n) => assert!(n <= 3 && n <= count - idx && out.len() == before + n),
                Err(_) => assert_eq!(out.len(), before),
            }
        }
    }
    assert!(out.len() <= count + 9);
    Corpus::Keep
});
