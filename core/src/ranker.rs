use std::cmp::Ordering;

use crate::aggregate::{FeatureMean, PartialAggregate};

/// Ranked output for one group: its top dimensions by mean value
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRanking {
    pub label: String,
    pub features: Vec<FeatureMean>,
}

/// Ranks one group's complete set of per-dimension aggregates
///
/// Dimensions with no observations are dropped before ranking. Ordering is
/// descending by mean with ties broken by ascending dimension index, so the
/// result is identical regardless of the order aggregates arrived in.
/// Means are rounded to `decimals` places at emission; ranking itself uses
/// the unrounded values.
pub fn rank_group(
    label: String,
    aggregates: Vec<(usize, PartialAggregate)>,
    top_k: usize,
    decimals: u32,
) -> GroupRanking {
    let mut means: Vec<FeatureMean> = aggregates
        .into_iter()
        .filter_map(|(dimension, aggregate)| {
            aggregate.mean().map(|mean| FeatureMean { dimension, mean })
        })
        .collect();

    means.sort_by(|a, b| {
        b.mean
            .partial_cmp(&a.mean)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.dimension.cmp(&b.dimension))
    });
    means.truncate(top_k);

    for feature in &mut means {
        feature.mean = round_to(feature.mean, decimals);
    }

    GroupRanking {
        label,
        features: means,
    }
}

/// Rounds half away from zero to a fixed number of decimal places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
