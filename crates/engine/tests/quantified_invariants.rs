//! Property tests for the quantified invariants of spec.md §8: count/range
//! consistency, strict-exclusive ordering, and empty-range handling, across
//! randomly generated key/value sets.

use proptest::collection::{hash_map, vec as pvec};
use proptest::prelude::*;
use sortkv_config::ConfigBag;
use sortkv_engine::{self as engine};
use tempfile::tempdir;

fn open(path: &std::path::Path) -> Box<dyn engine::Engine> {
    let mut bag = ConfigBag::new();
    bag.put_string("path", path.to_string_lossy().to_string());
    bag.put_uint64("size", 8 * 1024 * 1024);
    engine::open("sorted", bag).unwrap()
}

fn collect_between(db: &dyn engine::Engine, lo: &[u8], hi: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
    use sortkv_core::RangeBound;
    let mut out = Vec::new();
    db.get_range(
        &RangeBound::Key(lo.to_vec()),
        &RangeBound::Key(hi.to_vec()),
        &mut |k, v| {
            out.push((k.to_vec(), v.to_vec()));
            0
        },
    )
    .unwrap();
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    /// `count_all` always equals the number of distinct keys actually
    /// inserted, regardless of insertion order.
    #[test]
    fn count_all_matches_inserted_key_count(
        entries in hash_map(pvec(any::<u8>(), 1..12), pvec(any::<u8>(), 0..12), 1..60)
    ) {
        let dir = tempdir().unwrap();
        let db = open(&dir.path().join("p.pool"));
        for (k, v) in &entries {
            db.put(k, v).unwrap();
        }
        prop_assert_eq!(db.count_all().unwrap(), entries.len() as u64);
    }

    /// Every inserted key is reachable via `get`/`exists` with the value
    /// most recently `put` for it.
    #[test]
    fn put_then_get_returns_the_last_written_value(
        entries in pvec((pvec(any::<u8>(), 1..8), pvec(any::<u8>(), 0..8)), 1..80)
    ) {
        let dir = tempdir().unwrap();
        let db = open(&dir.path().join("p.pool"));
        let mut expected = std::collections::HashMap::new();
        for (k, v) in &entries {
            db.put(k, v).unwrap();
            expected.insert(k.clone(), v.clone());
        }
        for (k, v) in &expected {
            prop_assert!(db.exists(k).is_ok());
            let mut got = None;
            db.get(k, &mut |bytes| got = Some(bytes.to_vec())).unwrap();
            prop_assert_eq!(got.unwrap(), v.clone());
        }
    }

    /// `get_between(lo, hi)` yields keys in strictly ascending order with no
    /// duplicates, each satisfying `lo < k < hi`, and `count_between` agrees
    /// with the number of entries the callback-based scan actually saw.
    #[test]
    fn between_is_ordered_strictly_exclusive_and_duplicate_free(
        keys in pvec(pvec(any::<u8>(), 1..6), 1..40),
        lo in pvec(any::<u8>(), 0..6),
        hi in pvec(any::<u8>(), 0..6),
    ) {
        let dir = tempdir().unwrap();
        let db = open(&dir.path().join("p.pool"));
        let mut inserted = std::collections::HashSet::new();
        for k in &keys {
            db.put(k, b"v").unwrap();
            inserted.insert(k.clone());
        }

        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        let got = collect_between(db.as_ref(), &lo, &hi);

        for w in got.windows(2) {
            prop_assert!(w[0].0 < w[1].0);
        }
        let mut seen = std::collections::HashSet::new();
        for (k, _) in &got {
            prop_assert!(*k > lo && *k < hi);
            prop_assert!(seen.insert(k.clone()));
        }

        use sortkv_core::RangeBound;
        let counted = db
            .count_range(&RangeBound::Key(lo.clone()), &RangeBound::Key(hi.clone()))
            .unwrap();
        prop_assert_eq!(counted, got.len() as u64);

        let expected_count = inserted.iter().filter(|k| ***k > *lo.as_slice() && ***k < *hi.as_slice()).count();
        prop_assert_eq!(got.len(), expected_count);
    }

    /// `k1 >= k2` under the comparator always yields an empty, non-error
    /// range for `between(k1, k2)`.
    #[test]
    fn between_with_non_increasing_bounds_is_always_empty(
        keys in pvec(pvec(any::<u8>(), 1..6), 0..20),
        bound in pvec(any::<u8>(), 0..6),
    ) {
        let dir = tempdir().unwrap();
        let db = open(&dir.path().join("p.pool"));
        for k in &keys {
            db.put(k, b"v").unwrap();
        }
        prop_assert_eq!(collect_between(db.as_ref(), &bound, &bound), Vec::new());
    }
}
