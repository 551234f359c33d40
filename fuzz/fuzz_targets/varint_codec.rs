// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for LEB128 varints.
//!
//! File tables and docid lengths in both on-disk formats are varint
//! prefixed, so the decoder sees whatever bytes a damaged file holds.

#![no_main]

use docstore::binary::{decode_varint, encode_varint, MAX_VARINT_BYTES};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Garbage must come back as Err, never a panic
    let Ok((value, consumed)) = decode_varint(data) else {
        return;
    };
    assert!(consumed >= 1 && consumed <= data.len().min(MAX_VARINT_BYTES));

    let mut reencoded = Vec::new();
    encode_varint(value, &mut reencoded);
    let (redecoded, reconsumed) =
        decode_varint(&reencoded).expect("re-encoded varint must decode");
    assert_eq!(value, redecoded);
    assert_eq!(reconsumed, reencoded.len());

    // Canonical encodings are never longer than what we read
    assert!(reencoded.len() <= consumed);
});
