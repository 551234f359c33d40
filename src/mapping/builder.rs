// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Sequential docno assignment.
//!
//! The builder is the single point where numbering happens. Parallel scans
//! produce per-split docid lists; the caller feeds them in split order and
//! the builder hands out 1, 2, 3, ... with no shared counter anywhere.

use std::collections::HashMap;

use crate::binary::MAX_DOCID_LEN;
use crate::error::{Error, Result};
use crate::types::Docno;

use super::{DocnoMapping, LookupStrategy};

/// Assigns docnos in push order.
#[derive(Debug, Default)]
pub struct DocnoMappingBuilder {
    docids: Vec<String>,
    seen: HashMap<String, u32>,
}

impl DocnoMappingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            docids: Vec::with_capacity(capacity),
            seen: HashMap::with_capacity(capacity),
        }
    }

    /// Assign the next docno to `docid`.
    pub fn push(&mut self, docid: impl Into<String>) -> Result<Docno> {
        let docid = docid.into();
        let position = self.docids.len();
        let docno = Docno::from_index(position).ok_or(Error::TooManyDocuments(position + 1))?;

        if docid.is_empty() {
            return Err(Error::EmptyDocid {
                position: docno.get() as u64,
            });
        }
        if docid.len() > MAX_DOCID_LEN {
            return Err(Error::DocidTooLong {
                position: docno.get() as u64,
                len: docid.len(),
                max: MAX_DOCID_LEN,
            });
        }
        if let Some(&first) = self.seen.get(&docid) {
            return Err(Error::DuplicateDocid {
                docid,
                first,
                second: docno.get(),
            });
        }

        self.seen.insert(docid.clone(), docno.get());
        self.docids.push(docid);
        Ok(docno)
    }

    /// Push every docid in order.
    pub fn extend<I, S>(&mut self, docids: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for docid in docids {
            self.push(docid)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.docids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docids.is_empty()
    }

    /// Freeze into a queryable mapping.
    pub fn finish(self, strategy: LookupStrategy) -> Result<DocnoMapping> {
        crate::contracts::check_docids_unique(&self.docids);
        DocnoMapping::from_docids(self.docids, strategy)
    }
}
