// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Delimited record scanner.
//!
//! Given a split `[start, end)` and a start/end tag pair, the scanner yields
//! every record whose start tag begins inside the split, reading past `end`
//! to finish the last one. A start tag that begins at or after `end` belongs
//! to the next split, which finds it on its own by scanning forward from its
//! own `start`. Overscan forward, never look backward: every record comes
//! out of exactly one split and no split needs to know about any other.
//!
//! # Algorithm
//!
//! ```text
//!   searching for start tag        copying until end tag
//!  ┌──────────────────────────┐   ┌───────────────────────────┐
//!  │ feed byte to start       │   │ append byte to record     │
//!  │ matcher; nothing buffered│──▶│ feed byte to end matcher  │──▶ emit record
//!  │ stop when candidate start│   │ EOF: drop fragment,       │
//!  │ >= end or at EOF         │   │ count as truncated        │
//!  └──────────────────────────┘   └───────────────────────────┘
//! ```
//!
//! The split boundary is only consulted while searching for a start tag:
//! scanning stops once the earliest byte the current partial match could
//! start at (`position - matched`) is at or past `end`. With no partial
//! match that is simply `position >= end`. A partial match that straddles
//! `end` keeps going, because the tag it may complete began inside the split.
//!
//! Positions come from a running byte counter, never from the source, so
//! compressed streams scan the same way plain files do.

mod matcher;
mod source;

pub use matcher::{find, TagMatcher};
pub use source::{ByteSource, Compression, READ_BUFFER_SIZE};

use std::io::{self, BufRead};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::split::FileSplit;
use crate::types::Record;

/// Validated start/end tag pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    start: Vec<u8>,
    end: Vec<u8>,
}

impl Delimiters {
    /// Both tags must be non-empty.
    pub fn new(start: impl AsRef<[u8]>, end: impl AsRef<[u8]>) -> Result<Self> {
        let start = start.as_ref().to_vec();
        let end = end.as_ref().to_vec();
        if start.is_empty() {
            return Err(Error::config("record start tag is empty"));
        }
        if end.is_empty() {
            return Err(Error::config("record end tag is empty"));
        }
        Ok(Self { start, end })
    }

    /// TREC-style `<DOC>` / `</DOC>`
    pub fn trec() -> Self {
        Self {
            start: b"<DOC>".to_vec(),
            end: b"</DOC>".to_vec(),
        }
    }

    pub fn start(&self) -> &[u8] {
        &self.start
    }

    pub fn end(&self) -> &[u8] {
        &self.end
    }
}

/// Pull-style scanner over one split.
pub struct RecordScanner<R> {
    reader: R,
    /// Bytes consumed from the underlying stream, as an absolute position.
    pos: u64,
    end: u64,
    start_matcher: TagMatcher,
    end_matcher: TagMatcher,
    done: bool,
    truncated: u64,
    buf: Vec<u8>,
}

impl RecordScanner<ByteSource> {
    /// Open the file behind `split` and position a scanner at its start.
    ///
    /// Seekable files seek straight to `split.start`; compressed streams
    /// read and discard up to it.
    pub fn open(path: &Path, split: FileSplit, delimiters: &Delimiters) -> io::Result<Self> {
        let mut source = ByteSource::open(path)?;
        let reached = if split.start > 0 {
            source.skip_to(split.start)?
        } else {
            0
        };
        debug!(
            path = %path.display(),
            %split,
            seekable = source.is_seekable(),
            "opening split"
        );
        Ok(RecordScanner::new(source, reached, split.end, delimiters))
    }

    /// Cross-check the running counter against the OS position. Only
    /// meaningful for seekable sources; always true for streams.
    pub fn position_consistent(&mut self) -> bool {
        let counted = self.pos;
        match self.reader.stream_position() {
            Some(actual) => actual == counted,
            None => true,
        }
    }
}

impl<R: BufRead> RecordScanner<R> {
    /// Scanner over `reader`, which is positioned at byte `start`.
    pub fn new(reader: R, start: u64, end: u64, delimiters: &Delimiters) -> Self {
        Self {
            reader,
            pos: start,
            end,
            start_matcher: TagMatcher::new(delimiters.start()),
            end_matcher: TagMatcher::new(delimiters.end()),
            done: false,
            truncated: 0,
            buf: Vec::new(),
        }
    }

    /// Current position of the running counter.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Number of start tags that ran into end of stream without an end tag.
    pub fn truncated(&self) -> u64 {
        self.truncated
    }

    /// Next complete record, or `None` at end of split.
    pub fn next_record(&mut self) -> io::Result<Option<Record>> {
        if self.done {
            return Ok(None);
        }

        if !self.seek_start_tag()? {
            self.done = true;
            return Ok(None);
        }

        let tag_len = self.start_matcher.len() as u64;
        let offset = self.pos - tag_len;
        self.buf.clear();
        self.buf.extend_from_slice(self.start_matcher.tag());

        if !self.copy_through_end_tag()? {
            self.truncated += 1;
            self.done = true;
            warn!(
                offset,
                bytes = self.buf.len(),
                "record start tag without end tag before end of stream; dropping fragment"
            );
            self.buf.clear();
            return Ok(None);
        }

        Ok(Some(Record {
            offset,
            bytes: std::mem::take(&mut self.buf),
        }))
    }

    /// Advance until a start tag completes. False at end of split or stream.
    fn seek_start_tag(&mut self) -> io::Result<bool> {
        self.start_matcher.reset();
        loop {
            if self.candidate_start() >= self.end {
                return Ok(false);
            }

            let chunk = self.reader.fill_buf()?;
            if chunk.is_empty() {
                return Ok(false);
            }

            let mut consumed = 0;
            let mut found = false;
            for &byte in chunk {
                if self.pos - self.start_matcher.matched() as u64 >= self.end {
                    break;
                }
                consumed += 1;
                self.pos += 1;
                if self.start_matcher.advance(byte) {
                    found = true;
                    break;
                }
            }
            self.reader.consume(consumed);

            if found {
                return Ok(true);
            }
        }
    }

    /// Copy bytes into the record buffer until the end tag completes.
    /// False if the stream ends first.
    fn copy_through_end_tag(&mut self) -> io::Result<bool> {
        self.end_matcher.reset();
        loop {
            let chunk = self.reader.fill_buf()?;
            if chunk.is_empty() {
                return Ok(false);
            }

            let mut consumed = 0;
            let mut found = false;
            for &byte in chunk {
                consumed += 1;
                if self.end_matcher.advance(byte) {
                    found = true;
                    break;
                }
            }
            self.buf.extend_from_slice(&chunk[..consumed]);
            self.pos += consumed as u64;
            self.reader.consume(consumed);

            if found {
                return Ok(true);
            }
        }
    }

    /// Earliest position the pending start-tag match could begin at.
    #[inline]
    fn candidate_start(&self) -> u64 {
        self.pos - self.start_matcher.matched() as u64
    }
}

impl<R: BufRead> Iterator for RecordScanner<R> {
    type Item = io::Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Scan one split of `path` into memory.
///
/// Returns the records and the number of truncated fragments dropped.
pub fn scan_split(
    path: &Path,
    split: FileSplit,
    delimiters: &Delimiters,
) -> io::Result<(Vec<Record>, u64)> {
    let mut scanner = RecordScanner::open(path, split, delimiters)?;
    let mut records = Vec::new();
    while let Some(record) = scanner.next_record()? {
        records.push(record);
    }
    debug_assert!(scanner.position_consistent());
    crate::contracts::check_records_in_split(&records, split);
    Ok((records, scanner.truncated()))
}
