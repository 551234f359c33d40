//! Loading persisted mappings and indexes, intact and damaged.

use std::fs;

use docstore::build::{Corpus, INDEX_FILE, MAPPING_FILE};
use docstore::{CorpusConfig, DocnoMapping, Error, ForwardIndex, LookupStrategy};
use tempfile::TempDir;

use super::common::{build_corpus, config, trec_file, ACB};

#[test]
fn test_flipped_byte_rejected() {
    let built = build_corpus(&[("a.trec", trec_file(&ACB))], &config(2, 1024));
    let mapping = DocnoMapping::open(&built.mapping_path(), LookupStrategy::BinarySearch).unwrap();

    let mut bytes = fs::read(built.index_path()).unwrap();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0x40;
    fs::write(built.index_path(), &bytes).unwrap();

    let err = ForwardIndex::open(&built.index_path(), mapping).unwrap_err();
    assert!(matches!(err, Error::Corrupt { .. }), "got {}", err);
}

#[test]
fn test_truncated_mapping_rejected() {
    let built = build_corpus(&[("a.trec", trec_file(&ACB))], &CorpusConfig::default());
    let bytes = fs::read(built.mapping_path()).unwrap();
    for cut in [0, 4, bytes.len() / 2, bytes.len() - 1] {
        let err = DocnoMapping::from_bytes(&bytes[..cut], LookupStrategy::BinarySearch).unwrap_err();
        assert!(matches!(err, Error::Corrupt { .. }), "cut at {}: {}", cut, err);
    }
}

#[test]
fn test_files_swapped_rejected() {
    let built = build_corpus(&[("a.trec", trec_file(&ACB))], &CorpusConfig::default());

    let err = DocnoMapping::open(&built.index_path(), LookupStrategy::BinarySearch).unwrap_err();
    assert!(matches!(err, Error::Corrupt { .. }), "got {}", err);

    let mapping = DocnoMapping::open(&built.mapping_path(), LookupStrategy::BinarySearch).unwrap();
    let err = ForwardIndex::open(&built.mapping_path(), mapping).unwrap_err();
    assert!(matches!(err, Error::Corrupt { .. }), "got {}", err);
}

#[test]
fn test_index_from_another_corpus_rejected() {
    let three = build_corpus(&[("a.trec", trec_file(&ACB))], &CorpusConfig::default());
    let two = build_corpus(&[("a.trec", trec_file(&["A", "B"]))], &CorpusConfig::default());

    let mapping = DocnoMapping::open(&two.mapping_path(), LookupStrategy::BinarySearch).unwrap();
    let err = ForwardIndex::open(&three.index_path(), mapping).unwrap_err();
    assert!(
        matches!(err, Error::CountMismatch { mapping: 2, indexed: 3 }),
        "got {}",
        err
    );
}

#[test]
fn test_missing_files_are_open_errors() {
    let dir = TempDir::new().unwrap();
    let err = DocnoMapping::open(&dir.path().join(MAPPING_FILE), LookupStrategy::BinarySearch)
        .unwrap_err();
    assert!(matches!(err, Error::Open { .. }));

    let mapping = DocnoMapping::from_docids(vec!["A".into()], LookupStrategy::BinarySearch).unwrap();
    let err = ForwardIndex::open(&dir.path().join(INDEX_FILE), mapping).unwrap_err();
    assert!(matches!(err, Error::Open { .. }));
}

#[test]
fn test_last_docno_derived_without_stored_count() {
    let ids: Vec<String> = (1..=11).map(|i| format!("N{}", i)).collect();
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let built = build_corpus(
        &[("a.trec", trec_file(&refs[..6])), ("b.trec", trec_file(&refs[6..]))],
        &config(4, 1 << 20),
    );
    let mapping = DocnoMapping::open(&built.mapping_path(), LookupStrategy::BinarySearch).unwrap();

    // Re-lay the same entries without the stored count
    let corpus = Corpus::discover(built.corpus.path(), &CorpusConfig::default()).unwrap();
    let (table, _) = docstore::build::build_index(&corpus, &mapping, &config(4, 1 << 20)).unwrap();
    let docstore::forward::Entries::Blocked(blocks) = &table.entries else {
        panic!("expected blocked layout");
    };
    assert_eq!(
        blocks.iter().map(|b| b.docno).collect::<Vec<_>>(),
        [1, 5, 7, 11]
    );

    let uncounted = docstore::forward::IndexTable {
        doc_count: None,
        ..table.clone()
    };
    let path = built.output.path().join("uncounted.dat");
    fs::write(&path, uncounted.encode()).unwrap();

    let index = ForwardIndex::open(&path, mapping).unwrap();
    assert_eq!(index.table().doc_count, None);
    assert_eq!(index.last_docno().unwrap(), 11);
    assert_eq!(index.get_document(11).unwrap().unwrap().docid, "N11");
    assert!(index.get_document(12).unwrap().is_none());
}
