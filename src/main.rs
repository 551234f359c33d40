// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use docstore::binary::{sniff_kind, unframe, FileKind, FrameFooter, FrameHeader};
use docstore::build::{self, format_bytes};
use docstore::forward::{Entries, IndexTable};
use docstore::{Corpus, CorpusConfig, DocnoMapping, ForwardIndex, LookupStrategy, Result};

mod cli;
use cli::display::{self, badge, dim, field, section_bot, section_mid, section_top, title_box};
use cli::{Cli, Commands, CorpusArgs, DocKey};

fn main() -> ExitCode {
    // Logs go to stderr; stdout carries fetched records and dumps
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Build {
            input,
            output,
            corpus,
        } => {
            let config = load_config(&corpus)?;
            let summary = build::run_build(&input, &output, &config)?;
            eprintln!(
                "✅ Build complete: {} documents in {} files ({} splits), {:?} layout",
                summary.documents, summary.files, summary.splits, summary.layout
            );
            eprintln!(
                "   {} ({})",
                summary.mapping_path.display(),
                format_bytes(summary.mapping_bytes)
            );
            eprintln!(
                "   {} ({})",
                summary.index_path.display(),
                format_bytes(summary.index_bytes)
            );
            if summary.stats.skipped > 0 || summary.stats.truncated > 0 {
                eprintln!(
                    "   ⚠ {} records without a docid, {} truncated records",
                    summary.stats.skipped, summary.stats.truncated
                );
            }
        }
        Commands::Mapping {
            input,
            output,
            corpus,
        } => {
            let config = load_config(&corpus)?;
            let mapping = build::run_mapping(&input, &output, &config)?;
            eprintln!(
                "✅ Mapping complete: {} documents → {}",
                mapping.len(),
                output.display()
            );
        }
        Commands::Index {
            input,
            mapping,
            output,
            corpus,
        } => {
            let config = load_config(&corpus)?;
            let table = build::run_index(&input, &mapping, &output, &config)?;
            eprintln!(
                "✅ Index complete: {} entries, {:?} layout → {}",
                table.entry_count(),
                table.layout(),
                output.display()
            );
        }
        Commands::Lookup {
            mapping,
            key,
            lookup,
        } => {
            let mapping = DocnoMapping::open(&mapping, lookup)?;
            return Ok(run_lookup(&mapping, &key));
        }
        Commands::Fetch {
            index,
            mapping,
            key,
            corpus,
        } => {
            let config = load_config(&corpus)?;
            let mapping = DocnoMapping::open(&mapping, config.lookup)?;
            let index = ForwardIndex::open_with(
                &index,
                mapping,
                config.delimiters()?,
                Box::new(config.extractor()?),
            )?;
            let document = match (&key.docno, &key.docid) {
                (Some(docno), _) => index.get_document(*docno)?,
                (None, Some(docid)) => index.get_document_by_docid(docid)?,
                (None, None) => None,
            };
            match document {
                Some(doc) => {
                    let mut stdout = io::stdout().lock();
                    stdout.write_all(&doc.bytes)?;
                    stdout.write_all(b"\n")?;
                }
                None => {
                    eprintln!("❌ {} not found", describe_key(&key));
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Inspect { file, json } => {
            return inspect(&file, json);
        }
        Commands::Splits { input, corpus } => {
            let config = load_config(&corpus)?;
            let corpus = Corpus::discover(&input, &config)?;
            let splits = corpus.plan_splits(config.split_size)?;
            let mut stdout = io::stdout().lock();
            for split in &splits {
                writeln!(stdout, "{}\t{}", corpus.files()[split.file_id as usize], split)?;
            }
            eprintln!("{} splits over {} files", splits.len(), corpus.len());
        }
        Commands::Dump { mapping } => {
            let mapping = DocnoMapping::open(&mapping, LookupStrategy::BinarySearch)?;
            let mut stdout = io::BufWriter::new(io::stdout().lock());
            mapping.write_text(&mut stdout)?;
            stdout.flush()?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Config file (or defaults) with command-line overrides applied.
fn load_config(args: &CorpusArgs) -> Result<CorpusConfig> {
    let mut config = match &args.config {
        Some(path) => CorpusConfig::load(path)?,
        None => CorpusConfig::default(),
    };
    if let Some(split_size) = args.split_size {
        config.split_size = split_size;
    }
    if let Some(block_size) = args.block_size {
        config.block_size = block_size;
    }
    if let Some(lookup) = args.lookup {
        config.lookup = lookup;
    }
    if !args.extensions.is_empty() {
        config.extensions = args.extensions.clone();
    }
    config.validate()?;
    Ok(config)
}

fn describe_key(key: &DocKey) -> String {
    match (&key.docno, &key.docid) {
        (Some(docno), _) => format!("docno {}", docno),
        (None, Some(docid)) => format!("docid '{}'", docid),
        (None, None) => "document".to_string(),
    }
}

fn run_lookup(mapping: &DocnoMapping, key: &DocKey) -> ExitCode {
    let found = match (&key.docno, &key.docid) {
        (Some(docno), _) => mapping.docid(*docno).map(str::to_string),
        (None, Some(docid)) => mapping.docno(docid).map(|d| d.to_string()),
        (None, None) => None,
    };
    match found {
        Some(value) => {
            println!("{}", value);
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("❌ {} not found", describe_key(key));
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// INSPECT
// ============================================================================

#[derive(Serialize)]
struct InspectReport {
    file: String,
    kind: &'static str,
    magic: String,
    version: u8,
    flags: u8,
    crc32: String,
    file_bytes: usize,
    payload_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    mapping: Option<MappingReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<IndexReport>,
}

#[derive(Serialize)]
struct MappingReport {
    documents: usize,
    first_docid: Option<String>,
    last_docid: Option<String>,
}

#[derive(Serialize)]
struct IndexReport {
    layout: docstore::Layout,
    collection_path: String,
    files: Vec<String>,
    stored_count: Option<u32>,
    entries: usize,
    first_block: Option<docstore::forward::Block>,
    last_block: Option<docstore::forward::Block>,
}

fn inspect(path: &Path, json: bool) -> Result<ExitCode> {
    let bytes = fs::read(path).map_err(|e| docstore::Error::open(path, e))?;
    let report = match build_report(path, &bytes) {
        Ok(report) => report,
        Err(e) => {
            if json {
                eprintln!("❌ {}", e);
            } else {
                section_top(&path.display().to_string());
                field("Status", &format!("{} {}", badge("ERR"), e));
                section_bot();
            }
            return Ok(ExitCode::FAILURE);
        }
    };

    if json {
        let out = to_json(&report)?;
        println!("{}", out);
    } else {
        print_report(&report);
    }
    Ok(ExitCode::SUCCESS)
}

/// Pretty JSON; failures surface as I/O errors, not config errors.
fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value).map_err(io::Error::from)?)
}

fn build_report(path: &Path, bytes: &[u8]) -> std::result::Result<InspectReport, String> {
    let kind = sniff_kind(bytes).ok_or("not a docno mapping or forward index (bad magic)")?;
    let (header, payload) = unframe(kind, bytes).map_err(|e| e.to_string())?;
    let footer = FrameFooter::read(kind, bytes).map_err(|e| e.to_string())?;

    let mut report = InspectReport {
        file: path.display().to_string(),
        kind: kind.name(),
        magic: String::from_utf8_lossy(&kind.magic()).into_owned(),
        version: header.version,
        flags: header.flags,
        crc32: format!("{:08x}", footer.crc32),
        file_bytes: bytes.len(),
        payload_bytes: payload.len(),
        mapping: None,
        index: None,
    };

    match kind {
        FileKind::DocnoMapping => {
            let mapping = DocnoMapping::from_bytes(bytes, LookupStrategy::BinarySearch)
                .map_err(|e| e.to_string())?;
            let last = mapping.len() as u32;
            report.mapping = Some(MappingReport {
                documents: mapping.len(),
                first_docid: mapping.docid(1).map(str::to_string),
                last_docid: mapping.docid(last).map(str::to_string),
            });
        }
        FileKind::ForwardIndex => {
            let table = IndexTable::decode(bytes).map_err(|e| e.to_string())?;
            let (first_block, last_block) = match &table.entries {
                Entries::Blocked(blocks) => (blocks.first().copied(), blocks.last().copied()),
                Entries::Single(_) => (None, None),
            };
            report.index = Some(IndexReport {
                layout: table.layout(),
                collection_path: table.collection_path.clone(),
                files: table.files.clone(),
                stored_count: table.doc_count,
                entries: table.entry_count(),
                first_block,
                last_block,
            });
        }
    }
    Ok(report)
}

fn print_report(report: &InspectReport) {
    title_box(&format!("{} ({})", report.kind.to_uppercase(), report.magic));

    section_top("FRAME");
    field("File", &display::truncate_path(&report.file, 50));
    field(
        "Magic",
        &format!("{} version {}", badge(&report.magic), report.version),
    );
    field("Flags", &format!("{:#04x}", report.flags));
    field(
        "Size",
        &format!(
            "{} {}",
            format_bytes(report.file_bytes as u64),
            dim(&format!(
                "(header {} + payload {} + footer {})",
                FrameHeader::SIZE,
                report.payload_bytes,
                FrameFooter::SIZE
            ))
        ),
    );
    field("Checksum", &format!("{} {}", badge("CRC"), report.crc32));

    if let Some(mapping) = &report.mapping {
        section_mid("DOCNOS");
        field("Documents", &mapping.documents.to_string());
        if let Some(first) = &mapping.first_docid {
            field("Docno 1", first);
        }
        if let Some(last) = &mapping.last_docid {
            field(&format!("Docno {}", mapping.documents), last);
        }
    }

    if let Some(index) = &report.index {
        let layout = match index.layout {
            docstore::Layout::Single => "SINGLE",
            docstore::Layout::Blocked => "BLOCKED",
        };
        section_mid("ENTRIES");
        field("Layout", &badge(layout));
        field("Entries", &index.entries.to_string());
        field(
            "Stored count",
            &index
                .stored_count
                .map_or_else(|| dim("absent (derived on load)"), |c| c.to_string()),
        );
        if let Some(block) = index.first_block {
            field(
                "First block",
                &format!("docno {} file {} @ {}", block.docno, block.file_id, block.offset),
            );
        }
        if let Some(block) = index.last_block {
            field(
                "Last block",
                &format!("docno {} file {} @ {}", block.docno, block.file_id, block.offset),
            );
        }

        section_mid("FILES");
        field(
            "Collection",
            &display::truncate_path(&index.collection_path, 50),
        );
        for (file_id, name) in index.files.iter().enumerate().take(20) {
            field(&format!("#{}", file_id), &display::truncate_path(name, 50));
        }
        if index.files.len() > 20 {
            field("", &dim(&format!("... {} more", index.files.len() - 20)));
        }
    }

    section_bot();
}
