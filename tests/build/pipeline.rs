//! Both build passes end to end over plain corpora.

use std::fs;

use docstore::build::{run_build, run_index, run_mapping, INDEX_FILE, MAPPING_FILE};
use docstore::{CorpusConfig, Layout, LookupStrategy};
use tempfile::TempDir;

use super::common::{
    assert_index_consistent, build_corpus, config, trec_file, trec_record, write_corpus, ACB,
};

#[test]
fn test_three_documents_in_file_order() {
    let built = build_corpus(&[("a.trec", trec_file(&ACB))], &CorpusConfig::default());
    assert_eq!(built.summary.documents, 3);
    assert_eq!(built.summary.files, 1);
    assert_eq!(built.summary.layout, Layout::Single);

    let index = built.open(LookupStrategy::BinarySearch);
    let mapping = index.mapping();
    assert_eq!(mapping.docid(1), Some("A"));
    assert_eq!(mapping.docid(2), Some("C"));
    assert_eq!(mapping.docid(3), Some("B"));
    assert_eq!(mapping.docno("B").map(|d| d.get()), Some(3));
    assert_eq!(mapping.docid(0), None);
    assert_eq!(mapping.docid(4), None);
    assert_eq!(mapping.docno("D"), None);

    let doc = index.get_document(2).unwrap().unwrap();
    assert_eq!(doc.bytes, trec_record("C", "Text of document C."));
    assert_eq!(doc.docid, "C");
    assert_eq!(doc.file_id, 0);

    assert_index_consistent(&index);
}

#[test]
fn test_multi_file_blocked_for_every_block_size() {
    let files = [
        ("a.trec", trec_file(&["A", "C", "B"])),
        ("b/c.trec", trec_file(&["E", "D"])),
        ("z.trec", trec_file(&["F"])),
    ];
    for block_size in 1..=4 {
        let built = build_corpus(&files, &config(block_size, 1 << 20));
        assert_eq!(built.summary.layout, Layout::Blocked, "block size {}", block_size);
        assert_eq!(built.summary.documents, 6);

        let index = built.open(LookupStrategy::BinarySearch);
        assert_index_consistent(&index);

        // File order is sorted relative path, records by offset within
        let order: Vec<_> = (1..=6).map(|d| index.mapping().docid(d).unwrap()).collect();
        assert_eq!(order, ["A", "C", "B", "E", "D", "F"]);
        assert_eq!(index.get_document_by_docid("D").unwrap().unwrap().file_id, 1);
    }
}

#[test]
fn test_output_independent_of_split_size() {
    let corpus = TempDir::new().unwrap();
    let ids: Vec<String> = (0..40).map(|i| format!("DOC-{:03}", (i * 7) % 40)).collect();
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    write_corpus(
        corpus.path(),
        &[("one.trec", trec_file(&refs[..25])), ("two.trec", trec_file(&refs[25..]))],
    )
    .unwrap();

    let outputs: Vec<(Vec<u8>, Vec<u8>)> = [13u64, 100, 997, 1 << 26]
        .iter()
        .map(|&split_size| {
            let out = TempDir::new().unwrap();
            let summary = run_build(corpus.path(), out.path(), &config(3, split_size)).unwrap();
            assert_eq!(summary.documents, 40, "split size {}", split_size);
            (
                fs::read(out.path().join(MAPPING_FILE)).unwrap(),
                fs::read(out.path().join(INDEX_FILE)).unwrap(),
            )
        })
        .collect();

    for pair in outputs.windows(2) {
        assert_eq!(pair[0].0, pair[1].0, "mapping differs across split plans");
        assert_eq!(pair[0].1, pair[1].1, "index differs across split plans");
    }
}

#[test]
fn test_separate_passes_match_full_build() {
    let corpus = TempDir::new().unwrap();
    write_corpus(
        corpus.path(),
        &[("a.trec", trec_file(&["X", "Y"])), ("b.trec", trec_file(&["Z"]))],
    )
    .unwrap();
    let cfg = config(2, 64);

    let full = TempDir::new().unwrap();
    run_build(corpus.path(), full.path(), &cfg).unwrap();

    let split = TempDir::new().unwrap();
    let mapping_path = split.path().join("m.dat");
    let index_path = split.path().join("i.dat");
    let mapping = run_mapping(corpus.path(), &mapping_path, &cfg).unwrap();
    assert_eq!(mapping.len(), 3);
    let table = run_index(corpus.path(), &mapping_path, &index_path, &cfg).unwrap();
    assert_eq!(table.layout(), Layout::Blocked);

    assert_eq!(
        fs::read(full.path().join(MAPPING_FILE)).unwrap(),
        fs::read(&mapping_path).unwrap()
    );
    assert_eq!(
        fs::read(full.path().join(INDEX_FILE)).unwrap(),
        fs::read(&index_path).unwrap()
    );
}

#[test]
fn test_records_without_docid_are_skipped() {
    let mut data = trec_file(&["A", "B"]);
    data.extend_from_slice(b"<DOC>\n<TEXT>\nno identifier here\n</TEXT>\n</DOC>\n");
    data.extend_from_slice(&trec_record("C", "after the gap"));
    data.push(b'\n');

    for block_size in [1, 2, 4] {
        let built = build_corpus(&[("a.trec", data.clone())], &config(block_size, 1 << 20));
        assert_eq!(built.summary.documents, 3);
        assert_eq!(built.summary.stats.skipped, 1);

        let index = built.open(LookupStrategy::BinarySearch);
        assert_index_consistent(&index);
        let doc = index.get_document(3).unwrap().unwrap();
        assert_eq!(doc.bytes, trec_record("C", "after the gap"));
    }
}

#[test]
fn test_truncated_tail_is_dropped() {
    let mut data = trec_file(&["A", "B"]);
    data.extend_from_slice(b"<DOC>\n<DOCNO> CUT </DOCNO>\n<TEXT>\nnever closed");

    let built = build_corpus(&[("a.trec", data)], &config(1, 16));
    assert_eq!(built.summary.documents, 2);
    assert!(built.summary.stats.truncated >= 1);

    let index = built.open(LookupStrategy::BinarySearch);
    assert_eq!(index.mapping().docno("CUT"), None);
    assert_index_consistent(&index);
}

#[test]
fn test_segmented_lookup_over_built_corpus() {
    let ids = super::common::segmented_docids("clueweb09-en0000", 3, 4);
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let cfg = CorpusConfig {
        lookup: LookupStrategy::Segmented,
        ..config(2, 128)
    };
    let built = build_corpus(&[("seg.trec", trec_file(&refs))], &cfg);

    let index = built.open(LookupStrategy::Segmented);
    assert_index_consistent(&index);
    assert_eq!(
        index.mapping().docno("clueweb09-en0000-01-00002").map(|d| d.get()),
        Some(7)
    );
    assert_eq!(index.mapping().docno("clueweb09-en0000-01-00009"), None);
}

#[test]
fn test_rebuild_replaces_stale_outputs() {
    let corpus = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_corpus(corpus.path(), &[("a.trec", trec_file(&["A", "B", "C"]))]).unwrap();
    run_build(corpus.path(), out.path(), &CorpusConfig::default()).unwrap();

    write_corpus(corpus.path(), &[("a.trec", trec_file(&["Q"]))]).unwrap();
    let summary = run_build(corpus.path(), out.path(), &CorpusConfig::default()).unwrap();
    assert_eq!(summary.documents, 1);

    let index = super::common::open_index(out.path(), LookupStrategy::BinarySearch);
    assert_eq!(index.last_docno().unwrap(), 1);
    assert_eq!(index.get_document(1).unwrap().unwrap().docid, "Q");
}
