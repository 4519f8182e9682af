use feature_rank_core::aggregate::{FeatureMean, PartialAggregate};
use feature_rank_core::ranker::{rank_group, round_to};

fn agg(sum: f64, count: u64) -> PartialAggregate {
    PartialAggregate { sum, count }
}

// ============================================================
// Ordering
// ============================================================

#[test]
fn test_ranks_descending_by_mean() {
    let ranking = rank_group(
        "red".to_string(),
        vec![(0, agg(2.0, 1)), (1, agg(9.0, 1)), (2, agg(5.0, 1))],
        13,
        3,
    );

    let dims: Vec<usize> = ranking.features.iter().map(|f| f.dimension).collect();
    assert_eq!(dims, vec![1, 2, 0]);
}

#[test]
fn test_ties_broken_by_ascending_dimension() {
    let ranking = rank_group(
        "white".to_string(),
        vec![(2, agg(9.0, 1)), (0, agg(9.0, 1)), (1, agg(9.0, 1))],
        13,
        3,
    );

    let dims: Vec<usize> = ranking.features.iter().map(|f| f.dimension).collect();
    assert_eq!(dims, vec![0, 1, 2]);
}

#[test]
fn test_ordering_independent_of_arrival_order() {
    let forward = rank_group(
        "red".to_string(),
        vec![(0, agg(1.0, 1)), (1, agg(2.0, 1)), (2, agg(3.0, 1))],
        13,
        3,
    );
    let backward = rank_group(
        "red".to_string(),
        vec![(2, agg(3.0, 1)), (1, agg(2.0, 1)), (0, agg(1.0, 1))],
        13,
        3,
    );

    assert_eq!(forward, backward);
}

// ============================================================
// Selection and exclusion
// ============================================================

#[test]
fn test_truncates_to_top_k() {
    let ranking = rank_group(
        "red".to_string(),
        vec![(0, agg(2.0, 1)), (1, agg(9.0, 1)), (2, agg(5.0, 1))],
        1,
        3,
    );

    assert_eq!(
        ranking.features,
        vec![FeatureMean {
            dimension: 1,
            mean: 9.0,
        }]
    );
}

#[test]
fn test_zero_observation_dimensions_are_dropped() {
    let ranking = rank_group(
        "red".to_string(),
        vec![(0, agg(0.0, 0)), (1, agg(4.0, 2))],
        13,
        3,
    );

    assert_eq!(
        ranking.features,
        vec![FeatureMean {
            dimension: 1,
            mean: 2.0,
        }]
    );
}

#[test]
fn test_all_zero_group_ranks_empty() {
    let ranking = rank_group("red".to_string(), vec![(0, agg(0.0, 0))], 13, 3);

    assert!(ranking.features.is_empty());
}

// ============================================================
// Rounding
// ============================================================

#[test]
fn test_means_rounded_to_fixed_precision() {
    let ranking = rank_group("red".to_string(), vec![(0, agg(10.0, 3))], 13, 3);

    assert_eq!(ranking.features[0].mean, 3.333);
}

#[test]
fn test_ranking_uses_unrounded_means() {
    // 1.00049 and 1.0001 both round to 1.0 but must rank in true order
    let ranking = rank_group(
        "red".to_string(),
        vec![(0, agg(1.0001, 1)), (1, agg(1.00049, 1))],
        13,
        3,
    );

    let dims: Vec<usize> = ranking.features.iter().map(|f| f.dimension).collect();
    assert_eq!(dims, vec![1, 0]);
}

#[test]
fn test_round_to_three_decimals() {
    assert_eq!(round_to(2.71828, 3), 2.718);
    assert_eq!(round_to(5.0, 3), 5.0);
    assert_eq!(round_to(1.0005, 3), 1.001);
}
