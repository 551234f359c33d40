// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error type shared by the builders and loaders.
//!
//! Lookups never fail for a missing document: an unknown docid or an
//! out-of-range docno is `None`. Everything here is either a configuration
//! problem, a corrupt persisted file, a build that disagrees with itself, or
//! plain I/O.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for docstore operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    ConfigJson(#[from] serde_json::Error),

    #[error("Corrupt {kind} file: {detail}")]
    Corrupt { kind: &'static str, detail: String },

    #[error("Duplicate docid '{docid}' (docnos {first} and {second})")]
    DuplicateDocid {
        docid: String,
        first: u32,
        second: u32,
    },

    #[error("Empty docid for record {position}")]
    EmptyDocid { position: u64 },

    #[error("Docid of record {position} is {len} bytes, longer than the {max} byte limit")]
    DocidTooLong {
        position: u64,
        len: usize,
        max: usize,
    },

    #[error(
        "Docno count mismatch: mapping has {mapping} documents but the index pass saw {indexed}"
    )]
    CountMismatch { mapping: usize, indexed: usize },

    #[error("Inconsistent index: {0}")]
    InconsistentIndex(String),

    #[error("Docid '{0}' found during indexing is not in the docno mapping")]
    UnmappedDocid(String),

    #[error("Too many documents: {0} exceeds u32::MAX")]
    TooManyDocuments(usize),
}

/// Result type alias for docstore operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    pub(crate) fn corrupt(kind: &'static str, detail: impl std::fmt::Display) -> Self {
        Error::Corrupt {
            kind,
            detail: detail.to_string(),
        }
    }

    pub fn open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Open {
            path: path.into(),
            source,
        }
    }

    /// True for failures caused by the build passes disagreeing about the corpus.
    pub fn is_build_inconsistency(&self) -> bool {
        matches!(
            self,
            Error::CountMismatch { .. } | Error::InconsistentIndex(_) | Error::UnmappedDocid(_)
        )
    }
}
