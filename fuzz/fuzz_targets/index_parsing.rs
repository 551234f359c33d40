// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Forward index parsing under adversarial input.
//!
//! Counts that claim more entries than the payload holds, file ids past the
//! file table, blocks out of order: all of it must be rejected at load time
//! so fetches never index out of bounds.

#![no_main]

use docstore::forward::{Entries, IndexTable};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(table) = IndexTable::decode(data) else {
        return;
    };

    match &table.entries {
        Entries::Single(entries) => {
            assert_eq!(table.files.len(), 1);
            assert_eq!(Some(entries.len() as u32), table.doc_count);
        }
        Entries::Blocked(blocks) => {
            if let Some(first) = blocks.first() {
                assert_eq!(first.docno, 1);
            }
            for block in blocks {
                assert!((block.file_id as usize) < table.files.len());
            }
            for pair in blocks.windows(2) {
                assert!(pair[0].docno < pair[1].docno);
            }
        }
    }

    let reloaded = IndexTable::decode(&table.encode()).expect("re-encoded index must load");
    assert_eq!(reloaded, table);
});
