// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Document-collection access for large tag-delimited corpora.
//!
//! Corpora packaged as multi-gigabyte flat files of `<DOC> ... </DOC>`
//! records are scanned in parallel byte-range splits, every record gets a
//! dense docno (1..=N) mapped both ways to its docid, and a forward index
//! makes any single record fetchable by seek and read.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌────────────────┐     ┌──────────────────┐
//! │  scanner/    │────▶│  mapping/      │────▶│  forward/        │
//! │ (splits →    │     │ (docid ↔ docno,│     │ (docno → file,   │
//! │  records)    │     │  builder)      │     │  offset; fetch)  │
//! └──────────────┘     └────────────────┘     └──────────────────┘
//!        │                     │                        │
//!        ▼                     ▼                        ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │ binary/  framing: magic, version, varints, CRC32 footer      │
//! └──────────────────────────────────────────────────────────────┘
//!        ▲
//! ┌──────┴───────────────────────────────────────────────────────┐
//! │ build/   corpus discovery, config, rayon passes, progress    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use docstore::{build, CorpusConfig, DocnoMapping, ForwardIndex, LookupStrategy};
//!
//! let config = CorpusConfig::default();
//! build::run_build("corpus/".as_ref(), "out/".as_ref(), &config)?;
//!
//! let mapping = DocnoMapping::open("out/docnos.dat".as_ref(), LookupStrategy::BinarySearch)?;
//! let index = ForwardIndex::open("out/index.dat".as_ref(), mapping)?;
//! let doc = index.get_document_by_docid("clueweb09-en0000-00-00017")?;
//! ```

pub mod binary;
pub mod build;
pub mod contracts;
pub mod docid;
pub mod error;
pub mod forward;
pub mod mapping;
pub mod scanner;
pub mod split;
pub mod testing;
mod types;

// Re-exports for public API
pub use build::{BuildSummary, Corpus, CorpusConfig};
pub use docid::{DocidExtractor, TagDocidExtractor};
pub use error::{Error, Result};
pub use forward::{ForwardIndex, ForwardIndexBuilder, IndexEntry, Layout};
pub use mapping::{DocnoMapping, DocnoMappingBuilder, LookupStrategy};
pub use scanner::{scan_split, ByteSource, Compression, Delimiters, RecordScanner};
pub use split::{partition, FileSplit};
pub use types::{Docno, Document, Record};
