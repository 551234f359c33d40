// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Build pipeline: corpus → docno mapping → forward index.
//!
//! ```text
//!  discover ──▶ plan splits ──▶ mapping pass (parallel) ──▶ number (sequential)
//!                    │                                            │
//!                    │                                      docnos.dat
//!                    ▼                                            │
//!              index pass (parallel, docids → docnos) ◀───────────┘
//!                    │
//!                    ▼
//!            sort + verify ──▶ index.dat
//! ```
//!
//! Each phase logs at `info`; per-split detail is at `debug`. Progress bars
//! are drawn on stderr only when it is a terminal.

pub mod config;
pub mod corpus;
pub mod parallel;

use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::forward::{ForwardIndexBuilder, IndexTable, Layout};
use crate::mapping::{DocnoMapping, DocnoMappingBuilder};

pub use config::{CorpusConfig, DEFAULT_SPLIT_SIZE};
pub use corpus::Corpus;
pub use parallel::{collect_docids, collect_entries, total_stats, ScanStats, SplitDocids};

/// File name of the docno mapping inside a build output directory.
pub const MAPPING_FILE: &str = "docnos.dat";
/// File name of the forward index inside a build output directory.
pub const INDEX_FILE: &str = "index.dat";

/// What a full build produced.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub documents: usize,
    pub files: usize,
    pub splits: usize,
    pub stats: ScanStats,
    pub layout: Layout,
    pub mapping_path: PathBuf,
    pub index_path: PathBuf,
    pub mapping_bytes: u64,
    pub index_bytes: u64,
}

/// Create a progress style for the main progress bars
fn create_progress_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.cyan} {prefix:<12} [{bar:40.cyan/dim}] {pos}/{len} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("━━╸")
}

/// A bar under `multi` when stderr is a terminal, a hidden one otherwise.
fn progress_bar(multi: &MultiProgress, len: usize, prefix: &'static str) -> ProgressBar {
    if !atty::is(atty::Stream::Stderr) {
        return ProgressBar::hidden();
    }
    let bar = multi.add(ProgressBar::new(len as u64));
    bar.set_style(create_progress_style());
    bar.set_prefix(prefix);
    bar.set_message("splits...");
    bar
}

/// Mapping pass over a discovered corpus.
pub fn build_mapping(corpus: &Corpus, config: &CorpusConfig) -> Result<DocnoMapping> {
    build_mapping_with_progress(corpus, config, &MultiProgress::new())
}

fn build_mapping_with_progress(
    corpus: &Corpus,
    config: &CorpusConfig,
    multi: &MultiProgress,
) -> Result<DocnoMapping> {
    config.validate()?;
    let delimiters = config.delimiters()?;
    let extractor = config.extractor()?;
    let splits = corpus.plan_splits(config.split_size)?;
    info!(
        files = corpus.len(),
        splits = splits.len(),
        "mapping pass: scanning for docids"
    );

    let pb = progress_bar(multi, splits.len(), "Mapping");
    let per_split = collect_docids(corpus, &splits, &delimiters, &extractor, &pb)?;
    let stats = total_stats(&per_split);
    pb.finish_with_message(format!("{} documents", stats.records));

    let mut builder = DocnoMappingBuilder::with_capacity(stats.records as usize);
    for split in per_split {
        builder.extend(split.docids)?;
    }
    report_stats("mapping", stats);

    let mapping = builder.finish(config.lookup)?;
    info!(documents = mapping.len(), "mapping pass: docnos assigned");
    Ok(mapping)
}

/// Index pass over the same corpus, verified against `mapping`.
pub fn build_index(
    corpus: &Corpus,
    mapping: &DocnoMapping,
    config: &CorpusConfig,
) -> Result<(IndexTable, ScanStats)> {
    build_index_with_progress(corpus, mapping, config, &MultiProgress::new())
}

fn build_index_with_progress(
    corpus: &Corpus,
    mapping: &DocnoMapping,
    config: &CorpusConfig,
    multi: &MultiProgress,
) -> Result<(IndexTable, ScanStats)> {
    config.validate()?;
    let delimiters = config.delimiters()?;
    let extractor = config.extractor()?;
    let splits = corpus.plan_splits(config.split_size)?;
    info!(
        files = corpus.len(),
        splits = splits.len(),
        block_size = config.block_size,
        "index pass: recording offsets"
    );

    let pb = progress_bar(multi, splits.len(), "Indexing");
    let (entries, stats) =
        collect_entries(corpus, &splits, &delimiters, &extractor, mapping, &pb)?;
    pb.finish_with_message(format!("{} documents", stats.records));
    report_stats("index", stats);

    let table = ForwardIndexBuilder::new(config.block_size)?.build(
        entries,
        mapping,
        corpus.root(),
        corpus.files(),
    )?;
    Ok((table, stats))
}

fn report_stats(pass: &str, stats: ScanStats) {
    if stats.truncated > 0 {
        warn!(
            pass,
            truncated = stats.truncated,
            "records cut off by end of file were dropped"
        );
    }
    if stats.skipped > 0 {
        warn!(pass, skipped = stats.skipped, "records without a docid were skipped");
    }
}

/// Mapping only: discover `input`, number it, write `output`.
pub fn run_mapping(input: &Path, output: &Path, config: &CorpusConfig) -> Result<DocnoMapping> {
    let corpus = Corpus::discover(input, config)?;
    let mapping = build_mapping(&corpus, config)?;
    mapping.write(output)?;
    Ok(mapping)
}

/// Index only, against an existing mapping.
pub fn run_index(
    input: &Path,
    mapping_path: &Path,
    output: &Path,
    config: &CorpusConfig,
) -> Result<IndexTable> {
    let corpus = Corpus::discover(input, config)?;
    let mapping = DocnoMapping::open(mapping_path, config.lookup)?;
    let (table, _) = build_index(&corpus, &mapping, config)?;
    crate::binary::write_atomic(output, &table.encode())?;
    info!(path = %output.display(), layout = ?table.layout(), "wrote forward index");
    Ok(table)
}

/// Both passes. Writes `docnos.dat` and `index.dat` under `output_dir`.
///
/// The mapping is written first; the index only after it verified against
/// the mapping, so a failed build never leaves an index that disagrees with
/// the mapping next to it.
pub fn run_build(input: &Path, output_dir: &Path, config: &CorpusConfig) -> Result<BuildSummary> {
    config.validate()?;
    let corpus = Corpus::discover(input, config)?;
    if corpus.is_empty() {
        return Err(Error::config(format!(
            "no corpus files found under {}",
            input.display()
        )));
    }

    let multi = MultiProgress::new();
    let mapping = build_mapping_with_progress(&corpus, config, &multi)?;

    fs::create_dir_all(output_dir).map_err(|e| Error::open(output_dir, e))?;
    let mapping_path = output_dir.join(MAPPING_FILE);
    let index_path = output_dir.join(INDEX_FILE);

    // An index from an earlier build would not match the new mapping
    if index_path.exists() {
        fs::remove_file(&index_path)?;
    }
    let mapping_bytes = mapping.to_bytes();
    crate::binary::write_atomic(&mapping_path, &mapping_bytes)?;
    info!(path = %mapping_path.display(), documents = mapping.len(), "wrote docno mapping");

    let (table, stats) = build_index_with_progress(&corpus, &mapping, config, &multi)?;
    let index_bytes = table.encode();
    crate::binary::write_atomic(&index_path, &index_bytes)?;
    info!(path = %index_path.display(), layout = ?table.layout(), "wrote forward index");

    Ok(BuildSummary {
        documents: mapping.len(),
        files: corpus.len(),
        splits: corpus.plan_splits(config.split_size)?.len(),
        stats,
        layout: table.layout(),
        mapping_path,
        index_path,
        mapping_bytes: mapping_bytes.len() as u64,
        index_bytes: index_bytes.len() as u64,
    })
}

/// Human-readable byte count.
pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1024 * 1024 * 1024 {
        format!("{:.1} GB", bytes as f64 / 1024.0 / 1024.0 / 1024.0)
    } else if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / 1024.0 / 1024.0)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}
