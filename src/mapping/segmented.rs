// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! O(1) docid → docno for segmented docids.
//!
//! Web-crawl collections name documents `<segment>-<sequence>`, e.g.
//! `clueweb09-en0000-00-00017`: segment `clueweb09-en0000-00`, sequence 17.
//! When every segment occupies one contiguous docno run and its sequences
//! count up by one, a docid's docno is arithmetic:
//!
//! ```text
//! docno = segment.first_docno + (sequence - segment.first_sequence)
//! ```
//!
//! The table is only built if the whole mapping satisfies that shape.
//! Lookups still confirm the hit against the stored docid, so zero-padding
//! differences ("x-07" vs "x-7") resolve to not-found rather than a wrong
//! docno.

use std::collections::HashMap;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy)]
struct Segment {
    first_docno: u32,
    first_sequence: u64,
    count: u32,
}

/// Per-segment starting docno and sequence.
#[derive(Debug, Clone, Default)]
pub(crate) struct SegmentTable {
    segments: HashMap<String, Segment>,
}

/// Split at the last '-' into (segment, sequence). The sequence must be all
/// ASCII digits.
pub(crate) fn split_docid(docid: &str) -> Option<(&str, u64)> {
    let (segment, sequence) = docid.rsplit_once('-')?;
    if segment.is_empty() || sequence.is_empty() || !sequence.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    Some((segment, sequence.parse().ok()?))
}

impl SegmentTable {
    /// Build from docids in docno order (`docids[0]` has docno 1).
    pub(crate) fn build<S: AsRef<str>>(docids: &[S]) -> Result<Self> {
        let mut segments: HashMap<String, Segment> = HashMap::new();
        let mut current: Option<(&str, u64)> = None;

        for (index, docid) in docids.iter().enumerate() {
            let docid = docid.as_ref();
            let docno = index as u32 + 1;
            let (segment, sequence) = split_docid(docid).ok_or_else(|| {
                Error::config(format!(
                    "segmented lookup: docid '{}' (docno {}) is not <segment>-<sequence>",
                    docid, docno
                ))
            })?;

            match current {
                Some((prev_segment, prev_sequence)) if prev_segment == segment => {
                    if prev_sequence.checked_add(1) != Some(sequence) {
                        return Err(Error::config(format!(
                            "segmented lookup: docid '{}' (docno {}) breaks the sequence of segment '{}' (previous {})",
                            docid, docno, segment, prev_sequence
                        )));
                    }
                    if let Some(entry) = segments.get_mut(segment) {
                        entry.count += 1;
                    }
                }
                _ => {
                    if segments.contains_key(segment) {
                        return Err(Error::config(format!(
                            "segmented lookup: segment '{}' reappears at docno {} after other segments",
                            segment, docno
                        )));
                    }
                    segments.insert(
                        segment.to_string(),
                        Segment {
                            first_docno: docno,
                            first_sequence: sequence,
                            count: 1,
                        },
                    );
                }
            }
            current = Some((segment, sequence));
        }

        Ok(Self { segments })
    }

    /// Candidate docno for `docid`; the caller verifies it.
    pub(crate) fn lookup(&self, docid: &str) -> Option<u32> {
        let (segment, sequence) = split_docid(docid)?;
        let entry = self.segments.get(segment)?;
        let delta = sequence.checked_sub(entry.first_sequence)?;
        if delta >= entry.count as u64 {
            return None;
        }
        Some(entry.first_docno + delta as u32)
    }

    pub(crate) fn len(&self) -> usize {
        self.segments.len()
    }
}
