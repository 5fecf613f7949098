//! Crate-level integration tests exercising the concrete scenarios and
//! reopen/crash round-trip properties from spec.md §8.

use sortkv::{ByteComparator, Comparator, ConfigBag, Db, RangeBound, Status};
use tempfile::tempdir;

fn open_sorted(path: &std::path::Path, size: u64) -> Db {
    let mut bag = ConfigBag::new();
    bag.put_string("path", path.to_string_lossy().to_string());
    bag.put_uint64("size", size);
    Db::open("sorted", bag).unwrap()
}

fn reopen_sorted(path: &std::path::Path) -> Db {
    let mut bag = ConfigBag::new();
    bag.put_string("path", path.to_string_lossy().to_string());
    Db::open("sorted", bag).unwrap()
}

fn collect_between(db: &Db, lo: &[u8], hi: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
    let mut out = Vec::new();
    db.get_between(lo, hi, &mut |k, v| {
        out.push((k.to_vec(), v.to_vec()));
        0
    })
    .unwrap();
    out
}

/// Scenario 1: ascending prefix family, then an insert that shifts the
/// qualifying set.
#[test]
fn scenario_prefix_family_between_scans() {
    let dir = tempdir().unwrap();
    let db = open_sorted(&dir.path().join("s1.pool"), 4 * 1024 * 1024);

    for (k, v) in [
        ("A", "1"),
        ("AB", "2"),
        ("AC", "3"),
        ("B", "4"),
        ("BB", "5"),
        ("BC", "6"),
    ] {
        db.put(k.as_bytes(), v.as_bytes()).unwrap();
    }

    let got = collect_between(&db, b"A", b"C");
    assert_eq!(
        got,
        vec![
            (b"AB".to_vec(), b"2".to_vec()),
            (b"AC".to_vec(), b"3".to_vec()),
            (b"B".to_vec(), b"4".to_vec()),
            (b"BB".to_vec(), b"5".to_vec()),
            (b"BC".to_vec(), b"6".to_vec()),
        ]
    );

    db.put(b"BD", b"7").unwrap();
    let got = collect_between(&db, b"AZ", b"BE");
    assert_eq!(
        got,
        vec![
            (b"B".to_vec(), b"4".to_vec()),
            (b"BB".to_vec(), b"5".to_vec()),
            (b"BC".to_vec(), b"6".to_vec()),
            (b"BD".to_vec(), b"7".to_vec()),
        ]
    );
}

/// Scenario 2: a multi-byte key sorts by raw byte value under the default
/// comparator, and `MAX_KEY` reaches it.
#[test]
fn scenario_multibyte_key_orders_by_raw_bytes() {
    let dir = tempdir().unwrap();
    let db = open_sorted(&dir.path().join("s2.pool"), 4 * 1024 * 1024);

    for (k, v) in [("B", "4"), ("BB", "5"), ("BC", "6"), ("BD", "7")] {
        db.put(k.as_bytes(), v.as_bytes()).unwrap();
    }
    db.put("记!".as_bytes(), b"RR").unwrap();

    let mut got = Vec::new();
    db.get_range(&RangeBound::Key(b"B".to_vec()), &RangeBound::Max, &mut |k, v| {
        got.push((k.to_vec(), v.to_vec()));
        0
    })
    .unwrap();

    assert_eq!(
        got,
        vec![
            (b"BB".to_vec(), b"5".to_vec()),
            (b"BC".to_vec(), b"6".to_vec()),
            (b"BD".to_vec(), b"7".to_vec()),
            ("记!".as_bytes().to_vec(), b"RR".to_vec()),
        ]
    );
}

/// Scenario 3: embedded NUL bytes distinguish keys from their prefixes.
#[test]
fn scenario_embedded_nul_byte_is_a_distinct_key() {
    let dir = tempdir().unwrap();
    let db = open_sorted(&dir.path().join("s3.pool"), 4 * 1024 * 1024);

    db.put(b"a", b"should_not_change").unwrap();
    db.put(b"a\0b", b"stuff").unwrap();

    assert!(db.exists(b"a").is_ok());
    assert!(db.exists(b"a\0b").is_ok());

    db.remove(b"a\0b").unwrap();
    assert_eq!(db.get(b"a").unwrap(), b"should_not_change");
    assert_eq!(db.get(b"a\0b").unwrap_err().status(), Status::NotFound);
}

/// Scenario 4 (scaled down from 4,000,000 to keep the suite fast): ascending
/// decimal-string keys survive a reopen with every `get` and the total
/// count intact.
#[test]
fn scenario_bulk_ascending_keys_survive_reopen() {
    const N: u64 = 4_000;
    let dir = tempdir().unwrap();
    let path = dir.path().join("s4.pool");
    {
        let db = open_sorted(&path, 16 * 1024 * 1024);
        for i in 1..=N {
            db.put(i.to_string().as_bytes(), i.to_string().as_bytes())
                .unwrap();
        }
    }
    let db = reopen_sorted(&path);
    assert_eq!(db.count_all().unwrap(), N);
    for i in 1..=N {
        assert_eq!(db.get(i.to_string().as_bytes()).unwrap(), i.to_string().as_bytes());
    }
}

/// Scenario 5: remove, replace, reopen.
#[test]
fn scenario_remove_then_replace_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("s5.pool");
    {
        let db = open_sorted(&path, 4 * 1024 * 1024);
        db.put(b"key1", b"value1").unwrap();
        db.put(b"key2", b"value2").unwrap();
        db.put(b"key3", b"value3").unwrap();
        db.remove(b"key2").unwrap();
        db.put(b"key3", b"VALUE3").unwrap();
    }
    let db = reopen_sorted(&path);
    assert_eq!(db.get(b"key1").unwrap(), b"value1");
    assert_eq!(db.get(b"key2").unwrap_err().status(), Status::NotFound);
    assert_eq!(db.get(b"key3").unwrap(), b"VALUE3");
    assert_eq!(db.count_all().unwrap(), 2);
}

/// Scenario 6: a comparator named differently from the persisted one is
/// refused on reopen, and the diagnostic names the expected comparator.
#[test]
fn scenario_comparator_mismatch_on_reopen() {
    #[derive(Debug)]
    struct OtherComparator;
    impl Comparator for OtherComparator {
        fn compare(&self, a: &[u8], b: &[u8]) -> std::cmp::Ordering {
            a.cmp(b)
        }
        fn name(&self) -> &str {
            "some-other-comparator"
        }
    }

    let dir = tempdir().unwrap();
    let path = dir.path().join("s6.pool");
    {
        let db = open_sorted(&path, 1024 * 1024);
        for k in ["A", "B", "C", "D"] {
            db.put(k.as_bytes(), b"x").unwrap();
        }
    }

    let mut bag = ConfigBag::new();
    bag.put_string("path", path.to_string_lossy().to_string());
    bag.put_comparator(std::sync::Arc::new(OtherComparator));
    let err = Db::open("sorted", bag).unwrap_err();
    assert_eq!(err.status(), Status::ComparatorMismatch);
    assert!(err.to_string().contains(sortkv::DEFAULT_COMPARATOR_NAME));
}

/// Invariant 5 / 8.1: reversed or equal bounds are an empty, successful
/// range rather than an error.
#[test]
fn between_with_reversed_bounds_is_empty_not_error() {
    let dir = tempdir().unwrap();
    let db = open_sorted(&dir.path().join("s7.pool"), 1024 * 1024);
    db.put(b"m", b"1").unwrap();

    assert_eq!(collect_between(&db, b"z", b"a"), Vec::new());
    assert_eq!(collect_between(&db, b"m", b"m"), Vec::new());
    assert_eq!(db.count_between(b"z", b"a").unwrap(), 0);
}

/// A clean close followed by reopen reproduces the exact listing (the §8
/// reopen round-trip property), independent of insertion order.
#[test]
fn reopen_round_trip_reproduces_full_listing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("s8.pool");
    let before = {
        let db = open_sorted(&path, 4 * 1024 * 1024);
        for k in ["delta", "alpha", "charlie", "bravo", "echo"] {
            db.put(k.as_bytes(), k.as_bytes()).unwrap();
        }
        db.remove(b"charlie").unwrap();
        collect_between(&db, b"", b"\u{10ffff}")
    };

    let after = {
        let db = reopen_sorted(&path);
        collect_between(&db, b"", b"\u{10ffff}")
    };
    assert_eq!(before, after);
    assert!(!after.iter().any(|(k, _)| k == b"charlie"));
}

#[test]
fn blackhole_engine_accepts_writes_and_rejects_range_queries() {
    let db = Db::open("blackhole", ConfigBag::new()).unwrap();
    db.put(b"a", b"1").unwrap();
    assert_eq!(db.count_all().unwrap(), 0);
    assert_eq!(
        db.get(b"a").unwrap_err().status(),
        Status::NotFound
    );
    assert_eq!(
        db.count_above(b"a").unwrap_err().status(),
        Status::NotSupported
    );
}

#[test]
fn unknown_engine_name_fails_without_touching_filesystem() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("should-not-exist.pool");
    let mut bag = ConfigBag::new();
    bag.put_string("path", path.to_string_lossy().to_string());
    bag.put_uint64("size", 1024 * 1024);

    let err = Db::open("no-such-engine", bag).unwrap_err();
    assert_eq!(err.status(), Status::WrongEngineName);
    assert!(!path.exists());
}

#[test]
fn default_comparator_is_used_when_none_supplied() {
    let cmp = ByteComparator;
    assert_eq!(cmp.name(), sortkv::DEFAULT_COMPARATOR_NAME);
}
