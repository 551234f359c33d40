// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Persisted forward index table.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ layout: u8            1 = single, 2 = blocked                    │
//! │ flags: u8             bit 0 = HAS_DOC_COUNT                      │
//! │ collection path       varint len + UTF-8                         │
//! │ file table            varint count, then varint len + UTF-8 each │
//! │ doc count: u32        present iff HAS_DOC_COUNT                  │
//! ├──────────────────────────────────────────────────────────────────┤
//! │ single:  N × { offset: u64, length: u32 }                        │
//! │ blocked: B: u32, B × { docno: u32, offset: u64, file_id: u32 }   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! File paths are relative to the collection path. The single layout always
//! carries the count since it needs N to know how many entries follow.

use std::io;

use serde::Serialize;

use crate::binary::{
    encode_string, encode_varint, frame, unframe, ByteReader, FileKind, MAX_PATH_LEN,
};

/// Flag: the document count is stored.
pub const HAS_DOC_COUNT: u8 = 0x01;

const SINGLE_ENTRY_SIZE: usize = 12;
const BLOCK_ENTRY_SIZE: usize = 16;

/// Entry granularity of a forward index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// One file, one `(offset, length)` per document.
    Single,
    /// Any number of files, one `(docno, offset, file)` per block of documents.
    Blocked,
}

impl Layout {
    fn marker(self) -> u8 {
        match self {
            Layout::Single => 1,
            Layout::Blocked => 2,
        }
    }

    fn from_marker(marker: u8) -> Option<Self> {
        match marker {
            1 => Some(Layout::Single),
            2 => Some(Layout::Blocked),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SingleEntry {
    pub offset: u64,
    pub length: u32,
}

/// First docno of a block and where its first record starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Block {
    pub docno: u32,
    pub offset: u64,
    pub file_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entries {
    Single(Vec<SingleEntry>),
    Blocked(Vec<Block>),
}

/// Decoded forward index file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTable {
    pub collection_path: String,
    pub files: Vec<String>,
    pub doc_count: Option<u32>,
    pub entries: Entries,
}

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

impl IndexTable {
    pub fn layout(&self) -> Layout {
        match self.entries {
            Entries::Single(_) => Layout::Single,
            Entries::Blocked(_) => Layout::Blocked,
        }
    }

    /// Number of entries (documents for single, blocks for blocked).
    pub fn entry_count(&self) -> usize {
        match &self.entries {
            Entries::Single(entries) => entries.len(),
            Entries::Blocked(blocks) => blocks.len(),
        }
    }

    /// Framed bytes.
    pub fn encode(&self) -> Vec<u8> {
        let flags = if self.doc_count.is_some() {
            HAS_DOC_COUNT
        } else {
            0
        };

        let mut out = Vec::with_capacity(64 + self.entry_count() * BLOCK_ENTRY_SIZE);
        out.push(self.layout().marker());
        out.push(flags);
        encode_string(&self.collection_path, &mut out);
        encode_varint(self.files.len() as u64, &mut out);
        for file in &self.files {
            encode_string(file, &mut out);
        }
        if let Some(count) = self.doc_count {
            out.extend_from_slice(&count.to_le_bytes());
        }

        match &self.entries {
            Entries::Single(entries) => {
                for entry in entries {
                    out.extend_from_slice(&entry.offset.to_le_bytes());
                    out.extend_from_slice(&entry.length.to_le_bytes());
                }
            }
            Entries::Blocked(blocks) => {
                out.extend_from_slice(&(blocks.len() as u32).to_le_bytes());
                for block in blocks {
                    out.extend_from_slice(&block.docno.to_le_bytes());
                    out.extend_from_slice(&block.offset.to_le_bytes());
                    out.extend_from_slice(&block.file_id.to_le_bytes());
                }
            }
        }

        frame(FileKind::ForwardIndex, 0, &out)
    }

    /// Parse and structurally validate framed bytes.
    pub fn decode(bytes: &[u8]) -> io::Result<Self> {
        let (_, payload) = unframe(FileKind::ForwardIndex, bytes)?;
        let mut r = ByteReader::new(payload);

        let marker = r.read_u8("layout marker")?;
        let layout = Layout::from_marker(marker)
            .ok_or_else(|| invalid(format!("Unknown layout marker {}", marker)))?;
        let flags = r.read_u8("flags")?;
        if flags & !HAS_DOC_COUNT != 0 {
            return Err(invalid(format!("Unknown flags {:#04x}", flags)));
        }

        let collection_path = r.read_string(MAX_PATH_LEN, "collection path")?;
        let file_count = r.read_varint("file count")? as usize;
        if file_count > r.remaining() {
            return Err(invalid(format!(
                "File count {} exceeds payload size",
                file_count
            )));
        }
        let mut files = Vec::with_capacity(file_count);
        for _ in 0..file_count {
            files.push(r.read_string(MAX_PATH_LEN, "file path")?);
        }

        let doc_count = if flags & HAS_DOC_COUNT != 0 {
            Some(r.read_u32("document count")?)
        } else {
            None
        };

        let entries = match layout {
            Layout::Single => {
                let count = doc_count
                    .ok_or_else(|| invalid("Single layout without document count".into()))?
                    as usize;
                if files.len() != 1 {
                    return Err(invalid(format!(
                        "Single layout needs exactly one file, found {}",
                        files.len()
                    )));
                }
                if count.saturating_mul(SINGLE_ENTRY_SIZE) != r.remaining() {
                    return Err(invalid(format!(
                        "Single layout: {} entries do not fill {} bytes",
                        count,
                        r.remaining()
                    )));
                }
                let mut entries = Vec::with_capacity(count);
                for _ in 0..count {
                    let offset = r.read_u64("entry offset")?;
                    let length = r.read_u32("entry length")?;
                    entries.push(SingleEntry { offset, length });
                }
                Entries::Single(entries)
            }
            Layout::Blocked => {
                let count = r.read_u32("block count")? as usize;
                if count.saturating_mul(BLOCK_ENTRY_SIZE) != r.remaining() {
                    return Err(invalid(format!(
                        "Blocked layout: {} blocks do not fill {} bytes",
                        count,
                        r.remaining()
                    )));
                }
                let mut blocks = Vec::with_capacity(count);
                for _ in 0..count {
                    let docno = r.read_u32("block docno")?;
                    let offset = r.read_u64("block offset")?;
                    let file_id = r.read_u32("block file id")?;
                    blocks.push(Block {
                        docno,
                        offset,
                        file_id,
                    });
                }
                Entries::Blocked(blocks)
            }
        };
        r.finish("index entries")?;

        let table = Self {
            collection_path,
            files,
            doc_count,
            entries,
        };
        table.validate()?;
        Ok(table)
    }

    /// Single tables hold one file and exactly `doc_count` entries. Block
    /// docnos start at 1 and ascend, file ids are in range, offsets ascend
    /// within a file.
    pub(crate) fn validate(&self) -> io::Result<()> {
        match &self.entries {
            Entries::Single(entries) => {
                if self.files.len() != 1 {
                    return Err(invalid(format!(
                        "Single layout needs exactly one file, found {}",
                        self.files.len()
                    )));
                }
                if self.doc_count.map(|c| c as usize) != Some(entries.len()) {
                    return Err(invalid(format!(
                        "Single layout has {} entries but document count {:?}",
                        entries.len(),
                        self.doc_count
                    )));
                }
                for (i, pair) in entries.windows(2).enumerate() {
                    if pair[1].offset < pair[0].offset.saturating_add(pair[0].length as u64) {
                        return Err(invalid(format!(
                            "Entry for docno {} overlaps docno {}",
                            i + 2,
                            i + 1
                        )));
                    }
                }
            }
            Entries::Blocked(blocks) => {
                if let Some(first) = blocks.first() {
                    if first.docno != 1 {
                        return Err(invalid(format!(
                            "First block starts at docno {}, expected 1",
                            first.docno
                        )));
                    }
                }
                for block in blocks {
                    if block.file_id as usize >= self.files.len() {
                        return Err(invalid(format!(
                            "Block at docno {} names file {} of {}",
                            block.docno,
                            block.file_id,
                            self.files.len()
                        )));
                    }
                }
                for pair in blocks.windows(2) {
                    let (a, b) = (pair[0], pair[1]);
                    let ordered = a.docno < b.docno
                        && (a.file_id < b.file_id || (a.file_id == b.file_id && a.offset < b.offset));
                    if !ordered {
                        return Err(invalid(format!(
                            "Block at docno {} is out of order after docno {}",
                            b.docno, a.docno
                        )));
                    }
                }
                if let (Some(count), Some(last)) = (self.doc_count, blocks.last()) {
                    if last.docno > count {
                        return Err(invalid(format!(
                            "Block docno {} beyond document count {}",
                            last.docno, count
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
