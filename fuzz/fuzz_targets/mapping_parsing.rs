// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Docno mapping parsing under adversarial input.
//!
//! A mapping file may be truncated, bit-flipped or not a mapping at all.
//! The loader must answer with an error, and anything it accepts must be a
//! real bijection.

#![no_main]

use docstore::{DocnoMapping, LookupStrategy};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(mapping) = DocnoMapping::from_bytes(data, LookupStrategy::BinarySearch) else {
        return;
    };

    for (docno, docid) in mapping.iter() {
        assert!(!docid.is_empty());
        assert_eq!(mapping.docid(docno.get()), Some(docid));
        assert_eq!(mapping.docno(docid), Some(docno));
    }
    assert_eq!(mapping.docid(0), None);

    // Whatever was accepted survives a write and reload
    let reloaded = DocnoMapping::from_bytes(&mapping.to_bytes(), LookupStrategy::BinarySearch)
        .expect("re-encoded mapping must load");
    assert!(mapping.iter().eq(reloaded.iter()));
});
