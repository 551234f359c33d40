// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Parallel scan passes.
//!
//! Both passes scan every split independently with rayon. `par_iter` over
//! the split plan followed by an indexed `collect` hands the per-split
//! results back in plan order, so the sequential fan-in afterwards sees the
//! corpus in canonical order no matter which worker finished first.
//!
//! Splits share nothing while scanning: each opens its own file handle and
//! the only cross-thread traffic is the progress bar.

use std::path::Path;

use indicatif::ProgressBar;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::docid::DocidExtractor;
use crate::error::{Error, Result};
use crate::forward::IndexEntry;
use crate::mapping::DocnoMapping;
use crate::scanner::{Delimiters, RecordScanner};
use crate::split::FileSplit;

use super::Corpus;

/// Record counts for one split or a whole pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Records with a docid
    pub records: u64,
    /// Complete records without a docid
    pub skipped: u64,
    /// Start tags that hit end of stream
    pub truncated: u64,
}

impl ScanStats {
    fn add(&mut self, other: ScanStats) {
        self.records += other.records;
        self.skipped += other.skipped;
        self.truncated += other.truncated;
    }
}

/// Docids of one split, in offset order.
#[derive(Debug)]
pub struct SplitDocids {
    pub split: FileSplit,
    pub docids: Vec<String>,
    pub stats: ScanStats,
}

/// Scan one split, calling `visit(docid, offset, length)` per record with a
/// docid.
fn scan_docids<F>(
    path: &Path,
    split: FileSplit,
    delimiters: &Delimiters,
    extractor: &dyn DocidExtractor,
    mut visit: F,
) -> Result<ScanStats>
where
    F: FnMut(String, u64, u64) -> Result<()>,
{
    let mut scanner =
        RecordScanner::open(path, split, delimiters).map_err(|e| Error::open(path, e))?;
    let mut stats = ScanStats::default();

    while let Some(record) = scanner.next_record()? {
        match extractor.docid(&record.bytes) {
            Some(docid) => {
                stats.records += 1;
                visit(docid, record.offset, record.len() as u64)?;
            }
            None => stats.skipped += 1,
        }
    }
    stats.truncated = scanner.truncated();

    if stats.skipped > 0 {
        warn!(
            path = %path.display(),
            %split,
            skipped = stats.skipped,
            "records without a docid were skipped"
        );
    }
    debug!(%split, records = stats.records, "scanned split");
    Ok(stats)
}

/// Mapping pass: docids per split, in plan order.
pub fn collect_docids(
    corpus: &Corpus,
    splits: &[FileSplit],
    delimiters: &Delimiters,
    extractor: &dyn DocidExtractor,
    progress: &ProgressBar,
) -> Result<Vec<SplitDocids>> {
    splits
        .par_iter()
        .map(|&split| -> Result<SplitDocids> {
            let path = corpus.path(split.file_id);
            let mut docids = Vec::new();
            let stats = scan_docids(&path, split, delimiters, extractor, |docid, _, _| {
                docids.push(docid);
                Ok(())
            })?;
            progress.inc(1);
            Ok(SplitDocids {
                split,
                docids,
                stats,
            })
        })
        .collect()
}

/// Entries of one split, plus docids the mapping does not know.
struct SplitEntries {
    entries: Vec<IndexEntry>,
    stats: ScanStats,
    unmapped: u64,
    first_unmapped: Option<String>,
}

/// Index pass: one entry per record, docnos resolved through `mapping`.
///
/// Entries come back in plan order; the forward index builder sorts and
/// verifies them. Unknown docids do not stop the pass: when they change the
/// record count the error is `CountMismatch`, otherwise `UnmappedDocid`.
pub fn collect_entries(
    corpus: &Corpus,
    splits: &[FileSplit],
    delimiters: &Delimiters,
    extractor: &dyn DocidExtractor,
    mapping: &DocnoMapping,
    progress: &ProgressBar,
) -> Result<(Vec<IndexEntry>, ScanStats)> {
    let per_split: Vec<SplitEntries> = splits
        .par_iter()
        .map(|&split| -> Result<SplitEntries> {
            let path = corpus.path(split.file_id);
            let mut entries = Vec::new();
            let mut unmapped = 0u64;
            let mut first_unmapped = None;
            let stats = scan_docids(&path, split, delimiters, extractor, |docid, offset, length| {
                match mapping.docno(&docid) {
                    Some(docno) => entries.push(IndexEntry {
                        docno,
                        file_id: split.file_id,
                        offset,
                        length,
                    }),
                    None => {
                        unmapped += 1;
                        if first_unmapped.is_none() {
                            first_unmapped = Some(docid);
                        }
                    }
                }
                Ok(())
            })?;
            progress.inc(1);
            Ok(SplitEntries {
                entries,
                stats,
                unmapped,
                first_unmapped,
            })
        })
        .collect::<Result<_>>()?;

    let mut total = ScanStats::default();
    let mut unmapped = 0u64;
    let mut first_unmapped = None;
    let mut entries = Vec::with_capacity(per_split.iter().map(|s| s.entries.len()).sum());
    for split in per_split {
        total.add(split.stats);
        unmapped += split.unmapped;
        if first_unmapped.is_none() {
            first_unmapped = split.first_unmapped;
        }
        entries.extend(split.entries);
    }

    if let Some(docid) = first_unmapped {
        let indexed = entries.len() + unmapped as usize;
        if indexed != mapping.len() {
            return Err(Error::CountMismatch {
                mapping: mapping.len(),
                indexed,
            });
        }
        return Err(Error::UnmappedDocid(docid));
    }
    Ok((entries, total))
}

/// Sum of per-split stats.
pub fn total_stats(splits: &[SplitDocids]) -> ScanStats {
    let mut total = ScanStats::default();
    for split in splits {
        total.add(split.stats);
    }
    total
}
