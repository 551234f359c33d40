//! Random access through the forward index.

use std::fs;

use docstore::build::{run_build, INDEX_FILE, MAPPING_FILE};
use docstore::{CorpusConfig, DocnoMapping, Error, ForwardIndex, LookupStrategy};
use rayon::prelude::*;
use tempfile::TempDir;

use super::common::{build_corpus, config, trec_file, trec_record, write_corpus};

#[test]
fn test_out_of_range_docnos() {
    let built = build_corpus(&[("a.trec", trec_file(&["A", "B"]))], &config(2, 1024));
    let index = built.open(LookupStrategy::BinarySearch);
    assert_eq!(index.first_docno(), 1);
    assert_eq!(index.last_docno().unwrap(), 2);
    assert!(index.get_document(0).unwrap().is_none());
    assert!(index.get_document(3).unwrap().is_none());
    assert!(index.get_document(u32::MAX).unwrap().is_none());
    assert!(index.get_document_by_docid("missing").unwrap().is_none());
}

#[test]
fn test_docid_fetch_matches_docno_fetch() {
    let ids: Vec<String> = (0..25).map(|i| format!("R{}", 100 - i)).collect();
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let built = build_corpus(
        &[("x.trec", trec_file(&refs[..10])), ("y.trec", trec_file(&refs[10..]))],
        &config(4, 64),
    );
    let index = built.open(LookupStrategy::BinarySearch);
    for (i, id) in ids.iter().enumerate() {
        let by_docid = index.get_document_by_docid(id).unwrap().unwrap();
        let by_docno = index.get_document(i as u32 + 1).unwrap().unwrap();
        assert_eq!(by_docid, by_docno);
        assert_eq!(by_docid.docno.get(), i as u32 + 1);
    }
}

#[test]
fn test_concurrent_fetches() {
    let ids: Vec<String> = (0..64).map(|i| format!("P-{:04}", i)).collect();
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let built = build_corpus(
        &[
            ("0.trec", trec_file(&refs[..20])),
            ("1.trec", trec_file(&refs[20..45])),
            ("2.trec", trec_file(&refs[45..])),
        ],
        &config(5, 256),
    );
    let index = built.open(LookupStrategy::BinarySearch);

    let fetched: Vec<String> = (1..=64u32)
        .into_par_iter()
        .map(|docno| index.get_document(docno).unwrap().unwrap().docid)
        .collect();
    assert_eq!(fetched, ids);
}

#[test]
fn test_custom_delimiters() {
    let corpus = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let data = b"<mediawiki>\n<page><id>w1</id>first</page>\n<page><id>w2</id>second</page>\n</mediawiki>\n";
    write_corpus(corpus.path(), &[("wiki.xml", data.to_vec())]).unwrap();

    let cfg = CorpusConfig {
        start_tag: "<page>".into(),
        end_tag: "</page>".into(),
        docid_start_tag: "<id>".into(),
        docid_end_tag: "</id>".into(),
        ..CorpusConfig::default()
    };
    run_build(corpus.path(), out.path(), &cfg).unwrap();

    let mapping =
        DocnoMapping::open(&out.path().join(MAPPING_FILE), LookupStrategy::BinarySearch).unwrap();
    let index = ForwardIndex::open_with(
        &out.path().join(INDEX_FILE),
        mapping.clone(),
        cfg.delimiters().unwrap(),
        Box::new(cfg.extractor().unwrap()),
    )
    .unwrap();
    let doc = index.get_document_by_docid("w2").unwrap().unwrap();
    assert_eq!(doc.bytes, b"<page><id>w2</id>second</page>");

    // Readers with the wrong tags notice instead of returning garbage
    let trec = ForwardIndex::open(&out.path().join(INDEX_FILE), mapping).unwrap();
    assert!(matches!(trec.get_document(1), Err(Error::InconsistentIndex(_))));
}

#[test]
fn test_replaced_docid_detected() {
    for block_size in [1, 3] {
        let built = build_corpus(&[("a.trec", trec_file(&["A", "B", "C"]))], &config(block_size, 1024));
        let index = built.open(LookupStrategy::BinarySearch);
        assert_eq!(
            index.get_document(2).unwrap().unwrap().bytes,
            trec_record("B", "Text of document B.")
        );

        // Same length, different docid in the second record
        fs::write(built.corpus.path().join("a.trec"), trec_file(&["A", "X", "C"])).unwrap();
        assert!(
            matches!(index.get_document(2), Err(Error::InconsistentIndex(_))),
            "block size {}",
            block_size
        );
        assert!(index.get_document(3).unwrap().is_some());
    }
}

#[test]
fn test_shifted_records_detected() {
    let built = build_corpus(&[("a.trec", trec_file(&["A", "B", "C"]))], &config(1, 1024));
    let index = built.open(LookupStrategy::BinarySearch);

    let mut data = trec_file(&["A", "B", "C"]);
    data.splice(0..0, b"shifted by some bytes".iter().copied());
    fs::write(built.corpus.path().join("a.trec"), &data).unwrap();
    assert!(matches!(index.get_document(3), Err(Error::InconsistentIndex(_))));
}

#[test]
fn test_removed_record_detected_by_block_scan() {
    let built = build_corpus(&[("a.trec", trec_file(&["A", "B", "C"]))], &config(3, 1024));
    let index = built.open(LookupStrategy::BinarySearch);

    fs::write(built.corpus.path().join("a.trec"), trec_file(&["A", "B"])).unwrap();
    assert!(index.get_document(2).unwrap().is_some());
    assert!(matches!(index.get_document(3), Err(Error::InconsistentIndex(_))));
}
