//! Builds that must fail, and what they leave behind.

use std::fs;

use docstore::build::{run_build, run_index, run_mapping, INDEX_FILE, MAPPING_FILE};
use docstore::binary::MAX_DOCID_LEN;
use docstore::{CorpusConfig, DocnoMapping, Error, LookupStrategy};
use tempfile::TempDir;

use super::common::{config, trec_file, write_corpus};

#[test]
fn test_duplicate_docid_writes_nothing() {
    let corpus = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_corpus(
        corpus.path(),
        &[("a.trec", trec_file(&["A", "B"])), ("b.trec", trec_file(&["C", "A"]))],
    )
    .unwrap();

    let err = run_build(corpus.path(), out.path(), &CorpusConfig::default()).unwrap_err();
    match err {
        Error::DuplicateDocid {
            docid,
            first,
            second,
        } => {
            assert_eq!(docid, "A");
            assert_eq!((first, second), (1, 4));
        }
        other => panic!("expected DuplicateDocid, got {}", other),
    }
    assert!(!out.path().join(MAPPING_FILE).exists());
    assert!(!out.path().join(INDEX_FILE).exists());
}

#[test]
fn test_count_mismatch_leaves_no_index() {
    let corpus = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_corpus(corpus.path(), &[("a.trec", trec_file(&["A", "B", "C"]))]).unwrap();
    let mapping_path = out.path().join(MAPPING_FILE);
    let index_path = out.path().join(INDEX_FILE);
    run_mapping(corpus.path(), &mapping_path, &CorpusConfig::default()).unwrap();

    // The corpus changes between the passes
    write_corpus(corpus.path(), &[("a.trec", trec_file(&["A", "B"]))]).unwrap();
    let err = run_index(corpus.path(), &mapping_path, &index_path, &CorpusConfig::default())
        .unwrap_err();
    assert!(
        matches!(err, Error::CountMismatch { mapping: 3, indexed: 2 }),
        "got {}",
        err
    );
    assert!(err.is_build_inconsistency());
    assert!(!index_path.exists());
}

#[test]
fn test_unmapped_docid_leaves_no_index() {
    let corpus = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_corpus(corpus.path(), &[("a.trec", trec_file(&["A", "B"]))]).unwrap();
    let mapping_path = out.path().join(MAPPING_FILE);
    let index_path = out.path().join(INDEX_FILE);
    run_mapping(corpus.path(), &mapping_path, &config(2, 32)).unwrap();

    write_corpus(corpus.path(), &[("a.trec", trec_file(&["A", "Z"]))]).unwrap();
    let err = run_index(corpus.path(), &mapping_path, &index_path, &config(2, 32)).unwrap_err();
    assert!(matches!(err, Error::UnmappedDocid(ref d) if d == "Z"), "got {}", err);
    assert!(!index_path.exists());
}

#[test]
fn test_extra_record_reports_both_counts() {
    let corpus = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_corpus(corpus.path(), &[("a.trec", trec_file(&["A", "B"]))]).unwrap();
    let mapping_path = out.path().join(MAPPING_FILE);
    let index_path = out.path().join(INDEX_FILE);
    run_mapping(corpus.path(), &mapping_path, &config(2, 32)).unwrap();

    write_corpus(corpus.path(), &[("a.trec", trec_file(&["A", "B", "N"]))]).unwrap();
    let err = run_index(corpus.path(), &mapping_path, &index_path, &config(2, 32)).unwrap_err();
    assert!(
        matches!(err, Error::CountMismatch { mapping: 2, indexed: 3 }),
        "got {}",
        err
    );
    assert!(!index_path.exists());
}

#[test]
fn test_overlong_docid_writes_nothing() {
    let corpus = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let long = "L".repeat(MAX_DOCID_LEN + 904);
    write_corpus(corpus.path(), &[("a.trec", trec_file(&["A", &long]))]).unwrap();

    let err = run_build(corpus.path(), out.path(), &CorpusConfig::default()).unwrap_err();
    assert!(
        matches!(err, Error::DocidTooLong { position: 2, len, max } if len == long.len() && max == MAX_DOCID_LEN),
        "got {}",
        err
    );
    assert!(!out.path().join(MAPPING_FILE).exists());
    assert!(!out.path().join(INDEX_FILE).exists());
}

#[test]
fn test_longest_docid_survives_reload() {
    let corpus = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let longest = "L".repeat(MAX_DOCID_LEN);
    write_corpus(corpus.path(), &[("a.trec", trec_file(&["A", &longest]))]).unwrap();

    run_build(corpus.path(), out.path(), &CorpusConfig::default()).unwrap();
    let mapping =
        DocnoMapping::open(&out.path().join(MAPPING_FILE), LookupStrategy::BinarySearch).unwrap();
    assert_eq!(mapping.docid(2), Some(longest.as_str()));
    assert_eq!(mapping.docno(&longest).map(|d| d.get()), Some(2));
}

#[test]
fn test_invalid_config_rejected_before_scanning() {
    let corpus = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_corpus(corpus.path(), &[("a.trec", trec_file(&["A"]))]).unwrap();

    for bad in [config(0, 1024), config(1, 0), config(100_000, 1024)] {
        let err = run_build(corpus.path(), out.path(), &bad).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got {}", err);
    }
    assert!(fs::read_dir(out.path()).unwrap().next().is_none());
}

#[test]
fn test_missing_input_is_open_error() {
    let out = TempDir::new().unwrap();
    let missing = out.path().join("nowhere");
    let err = run_build(&missing, out.path(), &CorpusConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Open { .. }), "got {}", err);
}
