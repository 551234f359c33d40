// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Split scanning against arbitrary bytes and cut points.
//!
//! Scanning a byte range must terminate, stay inside the data, and only
//! report records that start inside the range and carry both tags.

#![no_main]

use std::io::Cursor;

use arbitrary::Arbitrary;
use docstore::{Delimiters, RecordScanner};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    start: u16,
    len: u16,
    short_tags: bool,
    data: &'a [u8],
}

fuzz_target!(|input: Input<'_>| {
    let delimiters = if input.short_tags {
        Delimiters::new("aab", "Z").expect("non-empty tags")
    } else {
        Delimiters::trec()
    };
    let total = input.data.len() as u64;
    let start = (input.start as u64).min(total);
    let end = (start + input.len as u64).min(total);

    let mut cursor = Cursor::new(input.data);
    cursor.set_position(start);
    let mut scanner = RecordScanner::new(cursor, start, end, &delimiters);

    let mut last_end = start;
    while let Some(record) = scanner.next_record().expect("in-memory reads cannot fail") {
        assert!(record.offset >= start && record.offset < end);
        assert!(record.offset >= last_end, "records overlap");
        assert!(record.end() <= total);
        assert!(record.bytes.starts_with(delimiters.start()));
        assert!(record.bytes.ends_with(delimiters.end()));
        let at = record.offset as usize;
        assert_eq!(&input.data[at..at + record.len()], record.bytes.as_slice());
        last_end = record.end();
    }
});
