//! Shared test utilities and fixtures.

#![allow(dead_code)]

use std::path::Path;

use docstore::build::{run_build, BuildSummary, INDEX_FILE, MAPPING_FILE};
use docstore::{CorpusConfig, DocnoMapping, ForwardIndex, LookupStrategy};
use tempfile::TempDir;

// Re-export canonical fixtures from docstore::testing
pub use docstore::testing::{
    brotli_compress, segmented_docids, trec_file, trec_record, write_corpus, zstd_compress,
};

// ============================================================================
// CORPORA
// ============================================================================

/// The three-document corpus used throughout: docids out of order so the
/// reverse lookup cannot lean on file order.
pub const ACB: [&str; 3] = ["A", "C", "B"];

/// A built corpus and the directories it lives in.
pub struct Built {
    pub corpus: TempDir,
    pub output: TempDir,
    pub summary: BuildSummary,
}

impl Built {
    pub fn mapping_path(&self) -> std::path::PathBuf {
        self.output.path().join(MAPPING_FILE)
    }

    pub fn index_path(&self) -> std::path::PathBuf {
        self.output.path().join(INDEX_FILE)
    }

    pub fn open(&self, strategy: LookupStrategy) -> ForwardIndex {
        open_index(self.output.path(), strategy)
    }
}

/// Write `files` into a fresh directory and build it with `config`.
pub fn build_corpus(files: &[(&str, Vec<u8>)], config: &CorpusConfig) -> Built {
    let corpus = TempDir::new().unwrap();
    write_corpus(corpus.path(), files).unwrap();
    let output = TempDir::new().unwrap();
    let summary = run_build(corpus.path(), output.path(), config)
        .unwrap_or_else(|e| panic!("build failed: {}", e));
    Built {
        corpus,
        output,
        summary,
    }
}

/// Load the mapping and index from a build output directory.
pub fn open_index(output: &Path, strategy: LookupStrategy) -> ForwardIndex {
    let mapping = DocnoMapping::open(&output.join(MAPPING_FILE), strategy).unwrap();
    ForwardIndex::open(&output.join(INDEX_FILE), mapping).unwrap()
}

/// Default config with a given block size and split size.
pub fn config(block_size: u32, split_size: u64) -> CorpusConfig {
    CorpusConfig {
        block_size,
        split_size,
        ..CorpusConfig::default()
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

/// Every docno in `1..=N` fetches a record carrying its own docid, and
/// every docid maps back to the docno it came from.
pub fn assert_index_consistent(index: &ForwardIndex) {
    let mapping = index.mapping();
    let n = mapping.len() as u32;
    assert_eq!(index.last_docno().unwrap(), n, "last docno");

    for docno in 1..=n {
        let docid = mapping.docid(docno).unwrap();
        assert_eq!(
            mapping.docno(docid).map(|d| d.get()),
            Some(docno),
            "docid '{}' does not map back to {}",
            docid,
            docno
        );
        let doc = index
            .get_document(docno)
            .unwrap()
            .unwrap_or_else(|| panic!("docno {} not fetchable", docno));
        assert_eq!(doc.docid, docid);
        assert!(doc.bytes.starts_with(b"<DOC>"));
        assert!(doc.bytes.ends_with(b"</DOC>"));
        let needle = format!("<DOCNO> {} </DOCNO>", docid);
        assert!(
            doc.text().contains(&needle),
            "docno {} fetched the wrong record",
            docno
        );
    }

    assert!(index.get_document(0).unwrap().is_none());
    assert!(index.get_document(n + 1).unwrap().is_none());
}
