// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Forward index construction and verification.
//!
//! The index pass hands over one `IndexEntry` per record it saw, in any
//! order. Before anything is written the builder checks that the pass and
//! the docno mapping agree about the corpus; a disagreement means the corpus
//! changed between passes or the passes were configured differently, and
//! publishing an index then would serve wrong documents.

use std::path::Path;

use tracing::{debug, info};

use crate::binary::{write_atomic, MAX_BLOCK_SIZE, MAX_PATH_LEN};
use crate::error::{Error, Result};
use crate::mapping::DocnoMapping;
use crate::types::Docno;

use super::layout::{Block, Entries, IndexTable, SingleEntry};

/// Where one record lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub docno: Docno,
    pub file_id: u32,
    pub offset: u64,
    pub length: u64,
}

/// Builds and persists a forward index.
#[derive(Debug, Clone)]
pub struct ForwardIndexBuilder {
    block_size: u32,
    store_count: bool,
}

impl Default for ForwardIndexBuilder {
    fn default() -> Self {
        Self {
            block_size: 1,
            store_count: true,
        }
    }
}

impl ForwardIndexBuilder {
    /// `block_size` documents per entry, between 1 and `MAX_BLOCK_SIZE`.
    pub fn new(block_size: u32) -> Result<Self> {
        if block_size == 0 || block_size > MAX_BLOCK_SIZE {
            return Err(Error::config(format!(
                "block size {} out of range 1..={}",
                block_size, MAX_BLOCK_SIZE
            )));
        }
        Ok(Self {
            block_size,
            store_count: true,
        })
    }

    /// Whether to store the document count. Readers of an index without it
    /// derive the last docno by scanning the final block.
    pub fn store_count(mut self, store: bool) -> Self {
        self.store_count = store;
        self
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Verify `entries` against `mapping` and lay out the table.
    ///
    /// `files` are the corpus files relative to `collection_path`, indexed by
    /// `IndexEntry::file_id`.
    pub fn build(
        &self,
        mut entries: Vec<IndexEntry>,
        mapping: &DocnoMapping,
        collection_path: &Path,
        files: &[String],
    ) -> Result<IndexTable> {
        if entries.len() != mapping.len() {
            return Err(Error::CountMismatch {
                mapping: mapping.len(),
                indexed: entries.len(),
            });
        }

        let collection = collection_path.to_string_lossy();
        if let Some(path) = std::iter::once(&*collection)
            .chain(files.iter().map(String::as_str))
            .find(|p| p.len() > MAX_PATH_LEN)
        {
            return Err(Error::config(format!(
                "path of {} bytes exceeds the {} byte limit: {}...",
                path.len(),
                MAX_PATH_LEN,
                path.chars().take(64).collect::<String>()
            )));
        }

        entries.sort_unstable_by_key(|e| e.docno);
        verify_entries(&entries, files.len())?;

        let single = self.block_size == 1
            && files.len() == 1
            && self.store_count
            && entries.iter().all(|e| e.length <= u32::MAX as u64);

        let entries = if single {
            Entries::Single(
                entries
                    .iter()
                    .map(|e| SingleEntry {
                        offset: e.offset,
                        length: e.length as u32,
                    })
                    .collect(),
            )
        } else {
            Entries::Blocked(self.blocks(&entries))
        };

        let table = IndexTable {
            collection_path: collection.into_owned(),
            files: files.to_vec(),
            doc_count: self.store_count.then_some(mapping.len() as u32),
            entries,
        };
        debug!(
            layout = ?table.layout(),
            entries = table.entry_count(),
            block_size = self.block_size,
            "laid out forward index"
        );
        Ok(table)
    }

    /// Build and write atomically. Nothing is written if verification fails.
    pub fn write(
        &self,
        entries: Vec<IndexEntry>,
        mapping: &DocnoMapping,
        collection_path: &Path,
        files: &[String],
        output: &Path,
    ) -> Result<IndexTable> {
        let table = self.build(entries, mapping, collection_path, files)?;
        write_atomic(output, &table.encode())?;
        info!(
            path = %output.display(),
            layout = ?table.layout(),
            documents = mapping.len(),
            "wrote forward index"
        );
        Ok(table)
    }

    /// A block starts at the first record, at every file change, and every
    /// `block_size` records.
    fn blocks(&self, entries: &[IndexEntry]) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut in_block = 0u32;
        let mut current_file = None;
        for entry in entries {
            if current_file != Some(entry.file_id) || in_block == self.block_size {
                blocks.push(Block {
                    docno: entry.docno.get(),
                    offset: entry.offset,
                    file_id: entry.file_id,
                });
                in_block = 0;
                current_file = Some(entry.file_id);
            }
            in_block += 1;
        }
        crate::contracts::check_blocks_well_formed(&blocks, entries.len(), self.block_size);
        blocks
    }
}

/// Docnos are exactly 1..=N, file ids are in range and never go backwards,
/// and records within a file are disjoint and ascending.
fn verify_entries(entries: &[IndexEntry], file_count: usize) -> Result<()> {
    for (i, entry) in entries.iter().enumerate() {
        let expected = i as u64 + 1;
        if entry.docno.get() as u64 != expected {
            return Err(Error::InconsistentIndex(format!(
                "expected docno {} at position {}, found {}",
                expected, i, entry.docno
            )));
        }
        if entry.file_id as usize >= file_count {
            return Err(Error::InconsistentIndex(format!(
                "docno {} names file {} but the corpus has {} files",
                entry.docno, entry.file_id, file_count
            )));
        }
    }

    for pair in entries.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if b.file_id < a.file_id {
            return Err(Error::InconsistentIndex(format!(
                "docno {} is in file {} but docno {} is in earlier file {}",
                a.docno, a.file_id, b.docno, b.file_id
            )));
        }
        if b.file_id == a.file_id && b.offset < a.offset + a.length {
            return Err(Error::InconsistentIndex(format!(
                "docno {} at offset {} does not follow docno {} ending at {}",
                b.docno,
                b.offset,
                a.docno,
                a.offset + a.length
            )));
        }
    }
    Ok(())
}
