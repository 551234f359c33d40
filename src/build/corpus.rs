// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Corpus discovery and split planning.
//!
//! The canonical order of a corpus is: files sorted by their path relative
//! to the collection root, then records by offset within each file. Docnos
//! follow that order, so discovery must be deterministic regardless of what
//! order the filesystem lists directories in.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::scanner::Compression;
use crate::split::{partition, FileSplit};

use super::CorpusConfig;

/// Sorted corpus files under one root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    root: PathBuf,
    files: Vec<String>,
}

impl Corpus {
    /// A single file, or every matching non-hidden file under a directory.
    pub fn discover(input: &Path, config: &CorpusConfig) -> Result<Self> {
        let input = fs::canonicalize(input).map_err(|e| Error::open(input, e))?;

        if input.is_file() {
            let root = input
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("/"));
            let name = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| Error::config(format!("not a file: {}", input.display())))?;
            return Ok(Self {
                root,
                files: vec![name],
            });
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&input)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));
        for entry in walker {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if !config.includes(&name) {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&input)
                .map_err(|e| Error::config(format!("{}: {}", entry.path().display(), e)))?;
            files.push(relative.to_string_lossy().into_owned());
        }
        files.sort();

        debug!(root = %input.display(), files = files.len(), "discovered corpus");
        Ok(Self { root: input, files })
    }

    /// Corpus from an explicit root and relative file list, kept in the
    /// given order.
    pub fn from_files(root: impl Into<PathBuf>, files: Vec<String>) -> Self {
        Self {
            root: root.into(),
            files,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Relative paths, indexed by file id.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn path(&self, file_id: u32) -> PathBuf {
        self.root.join(&self.files[file_id as usize])
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Cut every file into splits, in canonical order. Compressed files get
    /// one whole-file split each.
    pub fn plan_splits(&self, split_size: u64) -> Result<Vec<FileSplit>> {
        let mut splits = Vec::new();
        for file_id in 0..self.files.len() as u32 {
            let path = self.path(file_id);
            if !Compression::from_path(&path).is_splittable() {
                splits.push(FileSplit::whole(file_id));
                continue;
            }
            let len = fs::metadata(&path).map_err(|e| Error::open(&path, e))?.len();
            let file_splits = partition(file_id, len, split_size);
            crate::contracts::check_splits_cover_file(&file_splits, len);
            splits.extend(file_splits);
        }
        Ok(splits)
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}
