// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the docstore command-line interface.
//!
//! `build` runs both passes over a corpus; `mapping` and `index` run them
//! one at a time. `lookup`, `fetch` and `dump` read the results, `inspect`
//! examines a built file, and `splits` shows how a corpus would be cut.

pub mod display;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use docstore::LookupStrategy;

#[derive(Parser)]
#[command(
    name = "docstore",
    about = "Docno mappings and forward indexes for tag-delimited corpora",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides applied on top of the corpus config file.
#[derive(Args, Debug, Default)]
pub struct CorpusArgs {
    /// JSON corpus config (tags, split size, block size, lookup, extensions)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Bytes per split for uncompressed files
    #[arg(long)]
    pub split_size: Option<u64>,

    /// Documents per forward index entry (1 stores every record's offset)
    #[arg(long)]
    pub block_size: Option<u32>,

    /// Reverse lookup strategy: binary_search or segmented
    #[arg(long)]
    pub lookup: Option<LookupStrategy>,

    /// Only include files with these suffixes (repeatable)
    #[arg(long = "ext")]
    pub extensions: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build docnos.dat and index.dat for a corpus
    Build {
        /// Corpus file or directory
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        corpus: CorpusArgs,
    },

    /// Build only the docno mapping
    Mapping {
        /// Corpus file or directory
        #[arg(short, long)]
        input: PathBuf,

        /// Output mapping file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        corpus: CorpusArgs,
    },

    /// Build only the forward index, against an existing mapping
    Index {
        /// Corpus file or directory
        #[arg(short, long)]
        input: PathBuf,

        /// Docno mapping built from the same corpus
        #[arg(short, long)]
        mapping: PathBuf,

        /// Output index file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        corpus: CorpusArgs,
    },

    /// Translate between docnos and docids
    Lookup {
        /// Docno mapping file
        mapping: PathBuf,

        #[command(flatten)]
        key: DocKey,

        /// Reverse lookup strategy
        #[arg(long, default_value_t = LookupStrategy::BinarySearch)]
        lookup: LookupStrategy,
    },

    /// Write one record's raw bytes to stdout
    Fetch {
        /// Forward index file
        index: PathBuf,

        /// Docno mapping the index was built against
        #[arg(short, long)]
        mapping: PathBuf,

        #[command(flatten)]
        key: DocKey,

        #[command(flatten)]
        corpus: CorpusArgs,
    },

    /// Show the structure of a docnos.dat or index.dat file
    Inspect {
        /// Path to a built file
        file: PathBuf,

        /// Print a JSON report instead of the box diagram
        #[arg(long)]
        json: bool,
    },

    /// Show how a corpus would be cut into splits
    Splits {
        /// Corpus file or directory
        input: PathBuf,

        #[command(flatten)]
        corpus: CorpusArgs,
    },

    /// Print a mapping as docno<TAB>docid lines
    Dump {
        /// Docno mapping file
        mapping: PathBuf,
    },
}

/// Exactly one of `--docno` and `--docid`.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct DocKey {
    /// Dense document number (1-based)
    #[arg(long)]
    pub docno: Option<u32>,

    /// External document identifier
    #[arg(long)]
    pub docid: Option<String>,
}
