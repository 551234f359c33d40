// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation.
//! It provides canonical corpus fixtures to avoid duplication.

#![doc(hidden)]

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// A TREC-style record: `<DOC>`, `<DOCNO>`, `<TEXT>`, `</DOC>`.
pub fn trec_record(docid: &str, body: &str) -> Vec<u8> {
    format!(
        "<DOC>\n<DOCNO> {} </DOCNO>\n<TEXT>\n{}\n</TEXT>\n</DOC>",
        docid, body
    )
    .into_bytes()
}

/// Concatenate records, one per line, with some junk before the first.
pub fn trec_file(docids: &[&str]) -> Vec<u8> {
    let mut out = b"<!-- collection header -->\n".to_vec();
    for docid in docids {
        out.extend_from_slice(&trec_record(docid, &format!("Text of document {}.", docid)));
        out.push(b'\n');
    }
    out
}

/// Write `files` (relative name, contents) under `root`.
pub fn write_corpus(root: &Path, files: &[(&str, Vec<u8>)]) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(files.len());
    for (name, contents) in files {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        paths.push(path);
    }
    Ok(paths)
}

/// Brotli-compress `data`.
pub fn brotli_compress(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    {
        let mut writer = brotli::CompressorWriter::new(&mut out, 4096, 5, 22);
        writer.write_all(data)?;
        writer.flush()?;
    }
    Ok(out)
}

/// Zstd-compress `data`.
pub fn zstd_compress(data: &[u8]) -> io::Result<Vec<u8>> {
    zstd::stream::encode_all(data, 3)
}

/// ClueWeb-style docids: `segments` segments of `per_segment` documents.
pub fn segmented_docids(prefix: &str, segments: usize, per_segment: usize) -> Vec<String> {
    (0..segments)
        .flat_map(|s| (0..per_segment).map(move |i| format!("{}-{:02}-{:05}", prefix, s, i)))
        .collect()
}
