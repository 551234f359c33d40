//! Forward index properties over corpora built on disk.

use docstore::build::run_build;
use docstore::LookupStrategy;
use proptest::prelude::*;
use tempfile::TempDir;

use super::common::{
    assert_index_consistent, brotli_compress, config, open_index, trec_file, write_corpus,
    zstd_compress,
};

#[derive(Debug, Clone, Copy)]
enum Packing {
    Plain,
    Brotli,
    Zstd,
}

fn packing() -> impl Strategy<Value = Packing> {
    prop_oneof![
        4 => Just(Packing::Plain),
        1 => Just(Packing::Brotli),
        1 => Just(Packing::Zstd),
    ]
}

/// 1 to 4 files of distinct docids, each with its own packing.
fn corpus() -> impl Strategy<Value = Vec<(Vec<String>, Packing)>> {
    prop::collection::hash_set("[A-Z][a-z0-9]{0,8}", 1..40).prop_flat_map(|set| {
        let docids: Vec<String> = set.into_iter().collect();
        let n = docids.len();
        (
            Just(docids),
            prop::collection::vec(0..=n, 0..3),
            prop::collection::vec(packing(), 4),
        )
            .prop_map(|(docids, mut cuts, packings)| {
                cuts.push(0);
                cuts.push(docids.len());
                cuts.sort_unstable();
                cuts.dedup();
                cuts.windows(2)
                    .zip(packings)
                    .map(|(w, packing)| (docids[w[0]..w[1]].to_vec(), packing))
                    .collect()
            })
    })
}

fn write_files(root: &std::path::Path, files: &[(Vec<String>, Packing)]) {
    let contents: Vec<(String, Vec<u8>)> = files
        .iter()
        .enumerate()
        .map(|(i, (docids, packing))| {
            let refs: Vec<&str> = docids.iter().map(String::as_str).collect();
            let data = trec_file(&refs);
            match packing {
                Packing::Plain => (format!("part-{}.trec", i), data),
                Packing::Brotli => (format!("part-{}.trec.br", i), brotli_compress(&data).unwrap()),
                Packing::Zstd => (format!("part-{}.trec.zst", i), zstd_compress(&data).unwrap()),
            }
        })
        .collect();
    let named: Vec<(&str, Vec<u8>)> = contents
        .iter()
        .map(|(name, data)| (name.as_str(), data.clone()))
        .collect();
    write_corpus(root, &named).unwrap();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Any corpus, split plan and block size: docnos follow file order and
    /// every docno fetches its own record.
    #[test]
    fn prop_every_record_fetchable(
        files in corpus(),
        block_size in 1u32..7,
        split_size in 8u64..400,
    ) {
        let dir = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_files(dir.path(), &files);

        let summary = run_build(dir.path(), out.path(), &config(block_size, split_size)).unwrap();
        let expected: Vec<&String> = files.iter().flat_map(|(ids, _)| ids).collect();
        prop_assert_eq!(summary.documents, expected.len());

        let index = open_index(out.path(), LookupStrategy::BinarySearch);
        for (i, docid) in expected.iter().enumerate() {
            prop_assert_eq!(index.mapping().docid(i as u32 + 1), Some(docid.as_str()));
        }
        assert_index_consistent(&index);
    }
}
