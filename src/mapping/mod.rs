// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Docno mapping: dense docnos 1..=N ↔ docids.
//!
//! Docnos are handed out in scan order over the whole corpus (files sorted
//! by path, records by offset). The mapping is built once per snapshot and
//! never changes afterwards, so it is a plain array plus one lookup
//! structure for the reverse direction.
//!
//! # Persisted payload (inside a `DCNO` frame)
//!
//! ```text
//! N: u32 LE
//! N × { len: varint, docid: [u8; len] }    // docid of docno 1, 2, ..., N
//! ```
//!
//! # Reverse lookup
//!
//! | Strategy       | Cost      | Requirement                                   |
//! |----------------|-----------|-----------------------------------------------|
//! | `BinarySearch` | O(log N)  | none                                          |
//! | `Segmented`    | O(1)      | `<segment>-<sequence>` docids, contiguous     |
//!
//! Both give identical answers; the strategy is chosen at load time.

pub mod builder;
mod segmented;

pub use builder::DocnoMappingBuilder;

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::binary::{encode_string, frame, unframe, write_atomic, ByteReader, FileKind, MAX_DOCID_LEN};
use crate::error::{Error, Result};
use crate::types::Docno;

use segmented::SegmentTable;

const KIND: &str = "docno mapping";

/// How `docno(docid)` is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStrategy {
    #[default]
    BinarySearch,
    Segmented,
}

impl fmt::Display for LookupStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupStrategy::BinarySearch => write!(f, "binary_search"),
            LookupStrategy::Segmented => write!(f, "segmented"),
        }
    }
}

impl FromStr for LookupStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "binary_search" | "binary-search" | "binary" => Ok(LookupStrategy::BinarySearch),
            "segmented" => Ok(LookupStrategy::Segmented),
            other => Err(format!(
                "unknown lookup strategy '{}' (expected binary_search or segmented)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
enum ReverseLookup {
    /// Docnos ordered by docid
    Sorted(Vec<u32>),
    Segmented(SegmentTable),
}

/// Immutable docno ↔ docid table.
#[derive(Debug, Clone)]
pub struct DocnoMapping {
    /// Slot 0 is reserved and holds an empty string.
    docids: Vec<String>,
    reverse: ReverseLookup,
}

impl DocnoMapping {
    /// Build from docids in docno order (`docids[0]` gets docno 1).
    ///
    /// Fails on empty or duplicate docids, or, for `Segmented`, when the
    /// docids do not have the segmented shape.
    pub fn from_docids(docids: Vec<String>, strategy: LookupStrategy) -> Result<Self> {
        if docids.len() > u32::MAX as usize - 1 {
            return Err(Error::TooManyDocuments(docids.len()));
        }
        if let Some(index) = docids.iter().position(|d| d.is_empty()) {
            return Err(Error::EmptyDocid {
                position: index as u64 + 1,
            });
        }
        if let Some(index) = docids.iter().position(|d| d.len() > MAX_DOCID_LEN) {
            return Err(Error::DocidTooLong {
                position: index as u64 + 1,
                len: docids[index].len(),
                max: MAX_DOCID_LEN,
            });
        }

        let mut slots = Vec::with_capacity(docids.len() + 1);
        slots.push(String::new());
        slots.extend(docids);

        let reverse = match strategy {
            LookupStrategy::BinarySearch => ReverseLookup::Sorted(sorted_permutation(&slots)?),
            LookupStrategy::Segmented => {
                let table = SegmentTable::build(&slots[1..])?;
                debug!(segments = table.len(), "built segment table");
                ReverseLookup::Segmented(table)
            }
        };

        Ok(Self {
            docids: slots,
            reverse,
        })
    }

    /// Load a persisted mapping.
    pub fn open(path: &Path, strategy: LookupStrategy) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| Error::open(path, e))?;
        let mapping = Self::from_bytes(&bytes, strategy)?;
        info!(
            path = %path.display(),
            documents = mapping.len(),
            %strategy,
            "loaded docno mapping"
        );
        Ok(mapping)
    }

    /// Parse a framed mapping.
    pub fn from_bytes(bytes: &[u8], strategy: LookupStrategy) -> Result<Self> {
        let docids = decode_payload(bytes).map_err(|e| Error::corrupt(KIND, e))?;
        Self::from_docids(docids, strategy)
    }

    /// Framed bytes as written by `write`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend_from_slice(&(self.len() as u32).to_le_bytes());
        for docid in &self.docids[1..] {
            encode_string(docid, &mut payload);
        }
        frame(FileKind::DocnoMapping, 0, &payload)
    }

    /// Persist atomically.
    pub fn write(&self, path: &Path) -> Result<()> {
        write_atomic(path, &self.to_bytes())?;
        info!(path = %path.display(), documents = self.len(), "wrote docno mapping");
        Ok(())
    }

    /// Write `docno\tdocid` lines.
    pub fn write_text<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for (docno, docid) in self.iter() {
            writeln!(w, "{}\t{}", docno, docid)?;
        }
        Ok(())
    }

    /// Docid of `docno`; `None` for 0 and anything past the last docno.
    #[inline]
    pub fn docid(&self, docno: u32) -> Option<&str> {
        if docno == 0 {
            return None;
        }
        self.docids.get(docno as usize).map(String::as_str)
    }

    /// Docno of `docid`, or `None` if the corpus has no such record.
    pub fn docno(&self, docid: &str) -> Option<Docno> {
        let raw = match &self.reverse {
            ReverseLookup::Sorted(sorted) => {
                let pos = sorted
                    .binary_search_by(|&d| self.docids[d as usize].as_str().cmp(docid))
                    .ok()?;
                sorted[pos]
            }
            ReverseLookup::Segmented(table) => {
                let candidate = table.lookup(docid)?;
                if self.docid(candidate)? != docid {
                    return None;
                }
                candidate
            }
        };
        Docno::new(raw)
    }

    pub fn strategy(&self) -> LookupStrategy {
        match self.reverse {
            ReverseLookup::Sorted(_) => LookupStrategy::BinarySearch,
            ReverseLookup::Segmented(_) => LookupStrategy::Segmented,
        }
    }

    /// Number of documents (N).
    pub fn len(&self) -> usize {
        self.docids.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Highest docno, `None` for an empty mapping.
    pub fn last_docno(&self) -> Option<Docno> {
        Docno::new(self.len() as u32)
    }

    /// `(docno, docid)` in docno order.
    pub fn iter(&self) -> impl Iterator<Item = (Docno, &str)> + '_ {
        self.docids[1..]
            .iter()
            .enumerate()
            .filter_map(|(i, docid)| Some((Docno::from_index(i)?, docid.as_str())))
    }
}

/// Docnos 1..=N ordered by docid, rejecting duplicates.
fn sorted_permutation(slots: &[String]) -> Result<Vec<u32>> {
    let mut sorted: Vec<u32> = (1..slots.len() as u32).collect();
    sorted.par_sort_unstable_by(|&a, &b| slots[a as usize].cmp(&slots[b as usize]));

    if let Some(pair) = sorted
        .windows(2)
        .find(|pair| slots[pair[0] as usize] == slots[pair[1] as usize])
    {
        let (first, second) = (pair[0].min(pair[1]), pair[0].max(pair[1]));
        return Err(Error::DuplicateDocid {
            docid: slots[first as usize].clone(),
            first,
            second,
        });
    }
    Ok(sorted)
}

fn decode_payload(bytes: &[u8]) -> io::Result<Vec<String>> {
    let (_, payload) = unframe(FileKind::DocnoMapping, bytes)?;
    let mut reader = ByteReader::new(payload);
    let count = reader.read_u32("document count")? as usize;
    // Every docid takes at least one length byte
    if count > reader.remaining() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "document count {} exceeds payload size {}",
                count,
                reader.remaining()
            ),
        ));
    }
    let mut docids = Vec::with_capacity(count);
    for _ in 0..count {
        docids.push(reader.read_string(MAX_DOCID_LEN, "docid")?);
    }
    reader.finish("docids")?;
    Ok(docids)
}
