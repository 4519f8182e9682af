use feature_rank_core::record::CompoundKey;
use feature_rank_core::shuffle::{stage1_partition, stage2_partition, ShuffleStore};

fn key(label: &str, dimension: usize) -> CompoundKey {
    CompoundKey {
        label: label.to_string(),
        dimension,
    }
}

// ============================================================
// Partition functions
// ============================================================

#[test]
fn test_identical_keys_route_to_the_same_partition() {
    // Equal keys must compare equal and route identically no matter which
    // worker produced them
    assert_eq!(
        stage1_partition(&key("red", 3), 7),
        stage1_partition(&key("red", 3), 7)
    );
    assert_eq!(stage2_partition("white", 7), stage2_partition("white", 7));
}

#[test]
fn test_partitions_stay_in_range() {
    for partitions in [1, 2, 5, 16] {
        for dimension in 0..40 {
            let p = stage1_partition(&key("rose", dimension), partitions);
            assert!(p < partitions);
        }
    }
}

#[test]
fn test_distinct_dimensions_can_route_apart() {
    // Not a correctness requirement, but with one partition per key there
    // is no spreading at all; sanity-check the hash actually varies
    let partitions = 16;
    let routed: std::collections::HashSet<usize> = (0..64)
        .map(|dimension| stage1_partition(&key("red", dimension), partitions))
        .collect();
    assert!(routed.len() > 1);
}

// ============================================================
// Write-once attempt publication
// ============================================================

#[test]
fn test_store_commits_once_per_task() {
    let mut store = ShuffleStore::new(2);

    assert!(store.commit(0, 0, "first"));
    assert!(!store.commit(0, 1, "stale duplicate"));
    assert_eq!(store.committed_attempt(0), Some(0));
    assert!(!store.is_complete());

    assert!(store.commit(1, 2, "second"));
    assert!(store.is_complete());

    assert_eq!(store.into_outputs(), vec!["first", "second"]);
}

#[test]
fn test_store_tracks_committed_count() {
    let mut store = ShuffleStore::<u32>::new(3);
    assert_eq!(store.committed(), 0);

    store.commit(2, 0, 9);
    assert_eq!(store.committed(), 1);
    assert!(!store.is_complete());
}
