#![no_main]

use libfuzzer_sys::fuzz_target;
use rechunkrs::{ChunkRule, Identity, Rechunker};

fuzz_target!(|input: (u8, u8, bool, Vec<u8>, Vec<u8>)| {
    let (first, other, multiples, cuts, data) = input;
    let Ok(rule) = ChunkRule::new(first as usize, other as usize) else {
        return;
    };
    let rule = rule.with_multiples(multiples);

    // Split the data at fuzzer-chosen points
    let mut pieces = Vec::new();
    let mut start = 0;
    for cut in cuts {
        let end = (start + cut as usize).min(data.len());
        pieces.push(&data[start..end]);
        start = end;
    }
    pieces.push(&data[start..]);

    let whole = Rechunker::new(rule, Identity).rechunk([&data]).unwrap();
    let split = Rechunker::new(rule, Identity).rechunk(pieces).unwrap();

    // Verify: bytes survive in order
    assert_eq!(whole.concat(), data);
    assert_eq!(split.concat(), data);

    // Verify: single units do not depend on the split
    if !multiples {
        assert_eq!(whole, split);
    }

    // Verify: every chunk before the last obeys the rule
    let body = &split[..split.len().saturating_sub(1)];
    let skip = usize::from(rule.has_first() && data.len() >= rule.first_length());
    if skip == 1 {
        assert_eq!(split[0].len(), rule.first_length());
    }
    for chunk in body.iter().skip(skip) {
        if multiples {
            assert_eq!(chunk.len() % rule.other_length(), 0);
        } else {
            assert_eq!(chunk.len(), rule.other_length());
        }
    }
});
