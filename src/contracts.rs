// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Runtime contracts for the build pipeline.
//!
//! Debug-mode assertions over structures the builders produce. They:
//!
//! 1. Are **zero-cost in release builds** (use `debug_assert!`)
//! 2. Catch a broken builder at the point it goes wrong, not at fetch time
//!
//! User-facing validation (duplicate docids, count mismatches) returns
//! errors elsewhere. What is checked here can only fail through a bug.
//!
//! | Contract                      | Holds after                          |
//! |-------------------------------|--------------------------------------|
//! | `check_docids_unique`         | `DocnoMappingBuilder::push`          |
//! | `check_blocks_well_formed`    | forward index block layout           |
//! | `check_splits_cover_file`     | `split::partition`                   |
//! | `check_records_in_split`      | `RecordScanner` over one split       |

// ============================================================================
// COMPILE-TIME ASSERTIONS
// ============================================================================

const _: () = {
    // A block's record count must fit the derivation bound and u32 docnos
    assert!(crate::binary::MAX_BLOCK_SIZE >= 1);
    assert!(crate::binary::MAX_BLOCK_SIZE as u64 <= u32::MAX as u64);
};

use std::collections::HashSet;

use crate::forward::Block;
use crate::split::FileSplit;
use crate::types::Record;

// ============================================================================
// MAPPING CONTRACTS
// ============================================================================

/// No docid appears twice.
#[inline]
pub fn check_docids_unique(docids: &[String]) {
    if cfg!(debug_assertions) {
        let mut seen = HashSet::with_capacity(docids.len());
        for (i, docid) in docids.iter().enumerate() {
            debug_assert!(
                seen.insert(docid.as_str()),
                "Contract violation: docid '{}' repeated at docno {}",
                docid,
                i + 1
            );
        }
    }
}

// ============================================================================
// FORWARD INDEX CONTRACTS
// ============================================================================

/// Blocks start at docno 1, ascend, hold at most `block_size` records each,
/// and together cover exactly `total` records.
#[inline]
pub fn check_blocks_well_formed(blocks: &[Block], total: usize, block_size: u32) {
    if total == 0 {
        debug_assert!(blocks.is_empty(), "Contract violation: blocks for an empty index");
        return;
    }
    debug_assert_eq!(
        blocks.first().map(|b| b.docno),
        Some(1),
        "Contract violation: first block must start at docno 1"
    );
    for pair in blocks.windows(2) {
        let span = pair[1].docno.saturating_sub(pair[0].docno);
        debug_assert!(
            span >= 1 && span <= block_size,
            "Contract violation: block at docno {} spans {} records (block size {})",
            pair[0].docno,
            span,
            block_size
        );
    }
    if let Some(last) = blocks.last() {
        debug_assert!(
            (last.docno as usize) <= total && total - last.docno as usize + 1 <= block_size as usize,
            "Contract violation: last block at docno {} cannot end at docno {} (block size {})",
            last.docno,
            total,
            block_size
        );
    }
}

// ============================================================================
// SCANNER CONTRACTS
// ============================================================================

/// Splits of one file are contiguous and cover `[0, file_len)`.
#[inline]
pub fn check_splits_cover_file(splits: &[FileSplit], file_len: u64) {
    debug_assert_eq!(
        splits.first().map(|s| s.start),
        Some(0),
        "Contract violation: first split must start at 0"
    );
    debug_assert_eq!(
        splits.last().map(|s| s.end),
        Some(file_len),
        "Contract violation: last split must end at file length {}",
        file_len
    );
    for pair in splits.windows(2) {
        debug_assert_eq!(
            pair[0].end, pair[1].start,
            "Contract violation: gap or overlap between {} and {}",
            pair[0], pair[1]
        );
    }
}

/// Every record begins inside the split and records do not overlap.
#[inline]
pub fn check_records_in_split(records: &[Record], split: FileSplit) {
    for record in records {
        debug_assert!(
            record.offset >= split.start && record.offset < split.end,
            "Contract violation: record at {} outside {}",
            record.offset,
            split
        );
    }
    for pair in records.windows(2) {
        debug_assert!(
            pair[0].end() <= pair[1].offset,
            "Contract violation: record at {} overlaps record at {}",
            pair[0].offset,
            pair[1].offset
        );
    }
}
