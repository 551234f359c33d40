// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Core value types: docnos, records and documents.

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Dense, 1-based document number.
///
/// Zero is not representable. Encodings downstream of this crate (gap-coded
/// postings, gamma codes) cannot store zero, so docnos start at 1 and the
/// slot at index 0 of every docno-indexed table stays unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Docno(NonZeroU32);

impl Docno {
    /// The first docno of every collection.
    pub const FIRST: Docno = Docno(NonZeroU32::MIN);

    /// Returns `None` for 0.
    #[inline]
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Docno)
    }

    /// Docno for the zero-based position `index` in scan order.
    #[inline]
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index + 1).ok().and_then(Docno::new)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Zero-based position (docno - 1).
    #[inline]
    pub fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }

    /// The following docno, or `None` on overflow.
    #[inline]
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Docno)
    }
}

impl fmt::Display for Docno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Docno> for u32 {
    fn from(docno: Docno) -> u32 {
        docno.get()
    }
}

impl TryFrom<u32> for Docno {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Docno::new(value).ok_or_else(|| "docno 0 is reserved".to_string())
    }
}

/// A raw tag-delimited record as found by the scanner.
///
/// `bytes` runs from the first byte of the start tag through the last byte
/// of the end tag. `offset` is the position of the start tag in the
/// (uncompressed) stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub offset: u64,
    pub bytes: Vec<u8>,
}

impl Record {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Byte position just past the end tag.
    pub fn end(&self) -> u64 {
        self.offset + self.bytes.len() as u64
    }
}

/// A record fetched through the forward index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub docno: Docno,
    pub docid: String,
    pub file_id: u32,
    pub offset: u64,
    pub bytes: Vec<u8>,
}

impl Document {
    /// Content as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}
