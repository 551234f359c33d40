// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Docid extraction from raw records.
//!
//! Both build passes and the fetch path must agree on which records have a
//! docid and what it is, so they all go through one `DocidExtractor`.

use crate::error::{Error, Result};
use crate::scanner::find;

/// Pulls the natural identifier out of a record's bytes.
pub trait DocidExtractor: Send + Sync {
    /// `None` when the record carries no usable docid.
    fn docid(&self, record: &[u8]) -> Option<String>;
}

/// Docid = trimmed text between the first `start`/`end` tag pair.
///
/// ```text
/// <DOC>
/// <DOCNO> clueweb09-en0000-00-00017 </DOCNO>   →  "clueweb09-en0000-00-00017"
/// ...
/// </DOC>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDocidExtractor {
    start: Vec<u8>,
    end: Vec<u8>,
}

impl TagDocidExtractor {
    pub fn new(start: impl AsRef<[u8]>, end: impl AsRef<[u8]>) -> Result<Self> {
        let start = start.as_ref().to_vec();
        let end = end.as_ref().to_vec();
        if start.is_empty() || end.is_empty() {
            return Err(Error::config("docid tags must be non-empty"));
        }
        Ok(Self { start, end })
    }
}

impl Default for TagDocidExtractor {
    fn default() -> Self {
        Self {
            start: b"<DOCNO>".to_vec(),
            end: b"</DOCNO>".to_vec(),
        }
    }
}

impl DocidExtractor for TagDocidExtractor {
    fn docid(&self, record: &[u8]) -> Option<String> {
        let open = find(record, &self.start)? + self.start.len();
        let close = open + find(&record[open..], &self.end)?;
        let text = std::str::from_utf8(&record[open..close]).ok()?.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }
}
