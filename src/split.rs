// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Byte-range splits: the unit of parallel scanning.
//!
//! Splits are cut at fixed byte offsets with no regard for record
//! boundaries. The scanner's overscan rule makes that safe, so partitioning
//! never has to read the file.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A contiguous byte range `[start, end)` of one corpus file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileSplit {
    pub file_id: u32,
    pub start: u64,
    pub end: u64,
}

impl FileSplit {
    pub fn new(file_id: u32, start: u64, end: u64) -> Self {
        debug_assert!(start <= end, "split start {} after end {}", start, end);
        Self {
            file_id,
            start,
            end,
        }
    }

    /// A split covering the whole file, whatever its (decompressed) size.
    pub fn whole(file_id: u32) -> Self {
        Self::new(file_id, 0, u64::MAX)
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn is_whole_file(&self) -> bool {
        self.start == 0 && self.end == u64::MAX
    }
}

impl fmt::Display for FileSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_whole_file() {
            write!(f, "file {} [whole]", self.file_id)
        } else {
            write!(f, "file {} [{}, {})", self.file_id, self.start, self.end)
        }
    }
}

/// Cut a file of `file_len` bytes into splits of at most `split_size` bytes.
///
/// An empty file still gets one (empty) split so every file appears in the
/// plan. `split_size` of 0 is treated as "one split per file".
pub fn partition(file_id: u32, file_len: u64, split_size: u64) -> Vec<FileSplit> {
    if split_size == 0 || file_len <= split_size {
        return vec![FileSplit::new(file_id, 0, file_len)];
    }

    let count = file_len.div_ceil(split_size);
    (0..count)
        .map(|i| {
            let start = i * split_size;
            let end = (start + split_size).min(file_len);
            FileSplit::new(file_id, start, end)
        })
        .collect()
}
