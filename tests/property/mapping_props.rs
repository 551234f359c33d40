//! Docno mapping properties.

use std::collections::HashSet;

use docstore::{DocnoMapping, DocnoMappingBuilder, Error, LookupStrategy};
use proptest::prelude::*;

use super::common::segmented_docids;

// ============================================================================
// STRATEGIES
// ============================================================================

/// Distinct non-empty docids in arbitrary order.
fn unique_docids() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[A-Za-z0-9_.-]{1,12}", 0..60)
        .prop_flat_map(|set| Just(set.into_iter().collect::<Vec<_>>()).prop_shuffle())
}

/// Segmented docids: a few segments with a few sequential documents each,
/// starting at an arbitrary sequence number.
fn segmented() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec((1usize..6, 0u64..1000), 1..5).prop_map(|segments| {
        segments
            .iter()
            .enumerate()
            .flat_map(|(s, &(count, start))| {
                (0..count as u64).map(move |i| format!("crawl-{:03}-{:05}", s, start + i))
            })
            .collect()
    })
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    /// docno(docid(n)) == n for every n, and docid(docno(d)) == d for
    /// every stored d.
    #[test]
    fn prop_mapping_is_bijection(docids in unique_docids()) {
        let mapping = DocnoMapping::from_docids(docids.clone(), LookupStrategy::BinarySearch).unwrap();
        prop_assert_eq!(mapping.len(), docids.len());

        for (i, docid) in docids.iter().enumerate() {
            let docno = i as u32 + 1;
            prop_assert_eq!(mapping.docid(docno), Some(docid.as_str()));
            prop_assert_eq!(mapping.docno(docid).map(|d| d.get()), Some(docno));
        }
        prop_assert_eq!(mapping.docid(0), None);
        prop_assert_eq!(mapping.docid(docids.len() as u32 + 1), None);
    }

    /// Persisting and reloading preserves every pair.
    #[test]
    fn prop_mapping_survives_bytes(docids in unique_docids()) {
        let mapping = DocnoMapping::from_docids(docids, LookupStrategy::BinarySearch).unwrap();
        let reloaded = DocnoMapping::from_bytes(&mapping.to_bytes(), LookupStrategy::BinarySearch).unwrap();
        prop_assert!(mapping.iter().eq(reloaded.iter()));
    }

    /// Absent docids are absent under both strategies.
    #[test]
    fn prop_unknown_docids_not_found(
        docids in segmented(),
        probes in prop::collection::vec("crawl-[0-9]{3}-[0-9]{1,6}", 0..20),
    ) {
        let binary = DocnoMapping::from_docids(docids.clone(), LookupStrategy::BinarySearch).unwrap();
        let segmented = DocnoMapping::from_docids(docids.clone(), LookupStrategy::Segmented).unwrap();
        let known: HashSet<&String> = docids.iter().collect();

        for probe in &probes {
            let expected = binary.docno(probe);
            prop_assert_eq!(expected.is_some(), known.contains(probe));
            prop_assert_eq!(segmented.docno(probe), expected);
        }
        for docid in &docids {
            prop_assert_eq!(segmented.docno(docid), binary.docno(docid));
        }
    }

    /// The builder rejects the first repeated docid and reports both docnos.
    #[test]
    fn prop_builder_reports_first_duplicate(
        docids in unique_docids().prop_filter("need two", |d| d.len() >= 2),
        pick in any::<prop::sample::Index>(),
    ) {
        let repeated = pick.index(docids.len());
        let mut builder = DocnoMappingBuilder::new();
        builder.extend(docids.iter().cloned()).unwrap();
        let err = builder.push(docids[repeated].clone()).unwrap_err();
        match err {
            Error::DuplicateDocid { first, second, .. } => {
                prop_assert_eq!(first, repeated as u32 + 1);
                prop_assert_eq!(second, docids.len() as u32 + 1);
            }
            other => prop_assert!(false, "unexpected error {}", other),
        }
        // The rejected docid did not consume a docno
        prop_assert_eq!(builder.len(), docids.len());
    }
}

#[test]
fn test_clueweb_shape_segmented() {
    let docids = segmented_docids("clueweb09-en0003", 4, 50);
    let mapping = DocnoMapping::from_docids(docids.clone(), LookupStrategy::Segmented).unwrap();
    for (i, docid) in docids.iter().enumerate() {
        assert_eq!(mapping.docno(docid).map(|d| d.get()), Some(i as u32 + 1));
    }
    // Same number, different padding
    assert_eq!(mapping.docno("clueweb09-en0003-02-17"), None);
}
