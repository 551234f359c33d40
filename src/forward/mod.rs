// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Forward index: random access to records by docno or docid.
//!
//! The index is a docno-sorted table of entries. An entry points at the
//! first byte of a record (or of the first record of a block) in one corpus
//! file. A fetch binary-searches the greatest entry at or below the
//! requested docno, opens that entry's file, and either reads exactly the
//! stored length (single layout) or scans forward record by record to the
//! requested docno (blocked layout).
//!
//! ```text
//!   docno 7
//!     │  partition_point over blocks
//!     ▼
//!   block { docno: 5, file: 1, offset: 9120 }
//!     │  open file 1, start scanning at 9120
//!     ▼
//!   record 5 → record 6 → record 7 ✓
//! ```
//!
//! A `ForwardIndex` only exists once loading succeeded, so there is no
//! half-loaded state to guard against. Lookups take `&self`, open their own
//! file handle, and share nothing mutable: the type is `Send + Sync`.

pub mod builder;
pub mod layout;

pub use builder::{ForwardIndexBuilder, IndexEntry};
pub use layout::{Block, Entries, IndexTable, Layout, SingleEntry, HAS_DOC_COUNT};

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::{debug, info};

use crate::binary::MAX_BLOCK_SIZE;
use crate::docid::{DocidExtractor, TagDocidExtractor};
use crate::error::{Error, Result};
use crate::mapping::DocnoMapping;
use crate::scanner::{ByteSource, Delimiters, RecordScanner};
use crate::split::FileSplit;
use crate::types::{Docno, Document};

const KIND: &str = "forward index";

/// Loaded forward index plus the mapping it was built against.
pub struct ForwardIndex {
    table: IndexTable,
    collection_path: PathBuf,
    files: Vec<PathBuf>,
    mapping: DocnoMapping,
    delimiters: Delimiters,
    extractor: Box<dyn DocidExtractor>,
    last_docno: OnceLock<u32>,
}

impl std::fmt::Debug for ForwardIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwardIndex")
            .field("collection_path", &self.collection_path)
            .field("files", &self.files.len())
            .field("layout", &self.table.layout())
            .field("documents", &self.mapping.len())
            .finish()
    }
}

impl ForwardIndex {
    /// Load with TREC delimiters and `<DOCNO>` docids.
    pub fn open(path: &Path, mapping: DocnoMapping) -> Result<Self> {
        Self::open_with(
            path,
            mapping,
            Delimiters::trec(),
            Box::new(TagDocidExtractor::default()),
        )
    }

    /// Load with the delimiters and docid extractor the corpus was built with.
    pub fn open_with(
        path: &Path,
        mapping: DocnoMapping,
        delimiters: Delimiters,
        extractor: Box<dyn DocidExtractor>,
    ) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| Error::open(path, e))?;
        let table = IndexTable::decode(&bytes).map_err(|e| Error::corrupt(KIND, e))?;
        let index = Self::from_table(table, mapping, delimiters, extractor)?;
        info!(
            path = %path.display(),
            layout = ?index.layout(),
            files = index.files.len(),
            documents = index.mapping.len(),
            "loaded forward index"
        );
        Ok(index)
    }

    /// Wrap an already decoded table.
    pub fn from_table(
        table: IndexTable,
        mapping: DocnoMapping,
        delimiters: Delimiters,
        extractor: Box<dyn DocidExtractor>,
    ) -> Result<Self> {
        table.validate().map_err(|e| Error::corrupt(KIND, e))?;
        if let Some(count) = table.doc_count {
            if count as usize != mapping.len() {
                return Err(Error::CountMismatch {
                    mapping: mapping.len(),
                    indexed: count as usize,
                });
            }
        }

        if let Entries::Blocked(blocks) = &table.entries {
            if let Some(last) = blocks.last() {
                if last.docno as usize > mapping.len() {
                    return Err(Error::InconsistentIndex(format!(
                        "block at docno {} but the mapping has {} documents",
                        last.docno,
                        mapping.len()
                    )));
                }
            }
        }

        let collection_path = PathBuf::from(&table.collection_path);
        let files = table
            .files
            .iter()
            .map(|f| collection_path.join(f))
            .collect();
        let last_docno = OnceLock::new();
        if let Some(count) = table.doc_count {
            let _ = last_docno.set(count);
        }

        Ok(Self {
            table,
            collection_path,
            files,
            mapping,
            delimiters,
            extractor,
            last_docno,
        })
    }

    /// Always 1.
    pub fn first_docno(&self) -> u32 {
        Docno::FIRST.get()
    }

    /// Highest docno in the index, 0 when empty.
    ///
    /// Comes from the stored count when present; otherwise derived once by
    /// scanning the last block to the end of its file, then cached.
    pub fn last_docno(&self) -> Result<u32> {
        if let Some(&last) = self.last_docno.get() {
            return Ok(last);
        }
        let derived = self.derive_last_docno()?;
        let _ = self.last_docno.set(derived);
        Ok(derived)
    }

    fn derive_last_docno(&self) -> Result<u32> {
        let block = match &self.table.entries {
            Entries::Single(entries) => return Ok(entries.len() as u32),
            Entries::Blocked(blocks) => match blocks.last() {
                Some(block) => *block,
                None => return Ok(0),
            },
        };

        let mut scanner = self.scanner_at(block.file_id, block.offset)?;
        let mut in_block = 0u32;
        while let Some(record) = scanner.next_record()? {
            if self.extractor.docid(&record.bytes).is_none() {
                continue;
            }
            in_block += 1;
            if in_block > MAX_BLOCK_SIZE {
                return Err(Error::InconsistentIndex(format!(
                    "last block at docno {} holds more than {} records",
                    block.docno, MAX_BLOCK_SIZE
                )));
            }
        }
        let last = block.docno + in_block.saturating_sub(1);
        debug!(last, "derived last docno from final block");
        Ok(last)
    }

    /// Record for `docno`, or `None` outside `[first_docno, last_docno]`.
    pub fn get_document(&self, docno: u32) -> Result<Option<Document>> {
        let Some(target) = Docno::new(docno) else {
            return Ok(None);
        };
        if docno > self.last_docno()? {
            return Ok(None);
        }
        let Some(docid) = self.mapping.docid(docno) else {
            return Ok(None);
        };

        let document = match &self.table.entries {
            Entries::Single(entries) => {
                let Some(&entry) = entries.get(target.index()) else {
                    return Ok(None);
                };
                self.read_exact_record(target, docid, entry)?
            }
            Entries::Blocked(blocks) => {
                let pos = blocks.partition_point(|b| b.docno <= docno);
                let Some(block) = pos.checked_sub(1).map(|i| blocks[i]) else {
                    return Ok(None);
                };
                self.scan_to_record(target, docid, block)?
            }
        };
        Ok(Some(document))
    }

    /// Record for `docid`, or `None` if the mapping does not know it.
    pub fn get_document_by_docid(&self, docid: &str) -> Result<Option<Document>> {
        match self.mapping.docno(docid) {
            Some(docno) => self.get_document(docno.get()),
            None => Ok(None),
        }
    }

    fn read_exact_record(&self, docno: Docno, docid: &str, entry: SingleEntry) -> Result<Document> {
        let path = self.file_path(0)?;
        let mut source = ByteSource::open(path).map_err(|e| Error::open(path, e))?;
        let reached = source.skip_to(entry.offset)?;
        if reached != entry.offset {
            return Err(Error::InconsistentIndex(format!(
                "docno {} starts at offset {} but {} ends at {}",
                docno,
                entry.offset,
                path.display(),
                reached
            )));
        }

        let mut bytes = vec![0u8; entry.length as usize];
        source.read_exact(&mut bytes)?;
        if !bytes.starts_with(self.delimiters.start()) {
            return Err(Error::InconsistentIndex(format!(
                "docno {} at offset {} of {} does not start with a record tag",
                docno,
                entry.offset,
                path.display()
            )));
        }
        let found = self.extractor.docid(&bytes);
        if found.as_deref() != Some(docid) {
            return Err(Error::InconsistentIndex(format!(
                "docno {} at offset {} of {} holds docid {:?} but the mapping says '{}'",
                docno,
                entry.offset,
                path.display(),
                found,
                docid
            )));
        }

        Ok(Document {
            docno,
            docid: docid.to_string(),
            file_id: 0,
            offset: entry.offset,
            bytes,
        })
    }

    fn scan_to_record(&self, docno: Docno, docid: &str, block: Block) -> Result<Document> {
        let mut scanner = self.scanner_at(block.file_id, block.offset)?;
        let mut current = block.docno;

        while let Some(record) = scanner.next_record()? {
            let Some(found) = self.extractor.docid(&record.bytes) else {
                continue;
            };
            if current == docno.get() {
                if found != docid {
                    return Err(Error::InconsistentIndex(format!(
                        "docno {} resolved to record '{}' but the mapping says '{}'",
                        docno, found, docid
                    )));
                }
                return Ok(Document {
                    docno,
                    docid: found,
                    file_id: block.file_id,
                    offset: record.offset,
                    bytes: record.bytes,
                });
            }
            current += 1;
        }

        Err(Error::InconsistentIndex(format!(
            "docno {} not found scanning from block at docno {} in file {}",
            docno, block.docno, block.file_id
        )))
    }

    fn scanner_at(&self, file_id: u32, offset: u64) -> Result<RecordScanner<ByteSource>> {
        let path = self.file_path(file_id)?;
        let split = FileSplit::new(file_id, offset, u64::MAX);
        RecordScanner::open(path, split, &self.delimiters).map_err(|e| Error::open(path, e))
    }

    fn file_path(&self, file_id: u32) -> Result<&Path> {
        self.files
            .get(file_id as usize)
            .map(PathBuf::as_path)
            .ok_or_else(|| {
                Error::corrupt(KIND, format!("file id {} out of range", file_id))
            })
    }

    /// Directory the file table is relative to.
    pub fn collection_path(&self) -> &Path {
        &self.collection_path
    }

    /// Corpus files, resolved against the collection path.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn layout(&self) -> Layout {
        self.table.layout()
    }

    pub fn table(&self) -> &IndexTable {
        &self.table
    }

    pub fn mapping(&self) -> &DocnoMapping {
        &self.mapping
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}
