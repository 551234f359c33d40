//! Brotli and zstd corpus files: whole-file splits, same records as plain.

use docstore::{Layout, LookupStrategy};

use super::common::{
    assert_index_consistent, brotli_compress, build_corpus, config, trec_file, zstd_compress, ACB,
};

fn plain_and_compressed() -> Vec<(&'static str, Vec<u8>)> {
    let data = trec_file(&ACB);
    vec![
        ("plain.trec", data.clone()),
        ("brotli.trec.br", brotli_compress(&data).unwrap()),
        ("zstd.trec.zst", zstd_compress(&data).unwrap()),
    ]
}

#[test]
fn test_compressed_records_identical_to_plain() {
    let files = plain_and_compressed();
    let plain = build_corpus(&files[..1], &config(1, 8));
    let plain_index = plain.open(LookupStrategy::BinarySearch);

    for file in &files[1..] {
        let built = build_corpus(std::slice::from_ref(file), &config(1, 8));
        assert_eq!(built.summary.splits, 1, "{} must not be split", file.0);
        assert_eq!(built.summary.layout, Layout::Single);

        let index = built.open(LookupStrategy::BinarySearch);
        assert_index_consistent(&index);
        for docno in 1..=3 {
            let expected = plain_index.get_document(docno).unwrap().unwrap();
            let actual = index.get_document(docno).unwrap().unwrap();
            assert_eq!(actual.bytes, expected.bytes, "{} docno {}", file.0, docno);
            assert_eq!(actual.offset, expected.offset, "{} docno {}", file.0, docno);
        }
    }
}

#[test]
fn test_mixed_corpus_blocked() {
    let files = vec![
        ("a.trec", trec_file(&["A1", "A2", "A3"])),
        ("b.trec.br", brotli_compress(&trec_file(&["B1", "B2"])).unwrap()),
        ("c.trec.zst", zstd_compress(&trec_file(&["C1", "C2", "C3", "C4"])).unwrap()),
    ];
    for block_size in [1, 2, 3] {
        let built = build_corpus(&files, &config(block_size, 40));
        assert_eq!(built.summary.documents, 9);

        let index = built.open(LookupStrategy::BinarySearch);
        assert_index_consistent(&index);
        let doc = index.get_document_by_docid("C3").unwrap().unwrap();
        assert_eq!(doc.docno.get(), 8);
        assert_eq!(doc.file_id, 2);
    }
}
