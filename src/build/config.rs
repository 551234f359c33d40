// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Corpus configuration.
//!
//! Read from a JSON file where every field is optional:
//!
//! ```json
//! {
//!   "start_tag": "<DOC>",
//!   "end_tag": "</DOC>",
//!   "docid_start_tag": "<DOCNO>",
//!   "docid_end_tag": "</DOCNO>",
//!   "split_size": 67108864,
//!   "block_size": 1,
//!   "lookup": "binary_search",
//!   "extensions": ["trec", "trec.br", "trec.zst"]
//! }
//! ```
//!
//! Both build passes and every reader of the result must use the same tags;
//! otherwise the index pass sees a different corpus than the mapping pass.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::binary::MAX_BLOCK_SIZE;
use crate::docid::TagDocidExtractor;
use crate::error::{Error, Result};
use crate::mapping::LookupStrategy;
use crate::scanner::Delimiters;

/// 64 MiB
pub const DEFAULT_SPLIT_SIZE: u64 = 64 * 1024 * 1024;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CorpusConfig {
    pub start_tag: String,
    pub end_tag: String,
    pub docid_start_tag: String,
    pub docid_end_tag: String,
    /// Bytes per split for uncompressed files
    pub split_size: u64,
    /// Documents per forward index entry
    pub block_size: u32,
    pub lookup: LookupStrategy,
    /// File name suffixes to include; empty means every file
    pub extensions: Vec<String>,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            start_tag: "<DOC>".into(),
            end_tag: "</DOC>".into(),
            docid_start_tag: "<DOCNO>".into(),
            docid_end_tag: "</DOCNO>".into(),
            split_size: DEFAULT_SPLIT_SIZE,
            block_size: 1,
            lookup: LookupStrategy::BinarySearch,
            extensions: Vec::new(),
        }
    }
}

impl CorpusConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::open(path, e))?;
        let config: CorpusConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, tag) in [
            ("start_tag", &self.start_tag),
            ("end_tag", &self.end_tag),
            ("docid_start_tag", &self.docid_start_tag),
            ("docid_end_tag", &self.docid_end_tag),
        ] {
            if tag.is_empty() {
                return Err(Error::config(format!("{} must not be empty", name)));
            }
        }
        if self.split_size == 0 {
            return Err(Error::config("split_size must be positive"));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(Error::config(format!(
                "block_size {} out of range 1..={}",
                self.block_size, MAX_BLOCK_SIZE
            )));
        }
        if self.extensions.iter().any(|e| e.is_empty()) {
            return Err(Error::config("extensions must not contain an empty suffix"));
        }
        Ok(())
    }

    pub fn delimiters(&self) -> Result<Delimiters> {
        Delimiters::new(&self.start_tag, &self.end_tag)
    }

    pub fn extractor(&self) -> Result<TagDocidExtractor> {
        TagDocidExtractor::new(&self.docid_start_tag, &self.docid_end_tag)
    }

    /// Whether `file_name` passes the extension filter.
    pub fn includes(&self, file_name: &str) -> bool {
        self.extensions.is_empty()
            || self.extensions.iter().any(|ext| {
                file_name
                    .strip_suffix(ext.as_str())
                    .is_some_and(|stem| stem.ends_with('.'))
            })
    }
}
