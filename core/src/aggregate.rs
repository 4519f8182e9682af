use serde::{Deserialize, Serialize};

/// Running (sum, count) for one compound key
///
/// Merging two aggregates for the same key by adding both fields yields the
/// aggregate of the union of their inputs. That associativity/commutativity
/// is what makes out-of-order, partitioned and retried processing safe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialAggregate {
    pub sum: f64,
    pub count: u64,
}

impl PartialAggregate {
    /// Aggregate of a single observation
    pub fn observation(value: f64) -> Self {
        Self {
            sum: value,
            count: 1,
        }
    }

    /// Folds another aggregate for the same key into this one
    pub fn merge(&mut self, other: Self) {
        self.sum += other.sum;
        self.count += other.count;
    }

    /// Mean of the observations, or `None` when nothing was observed
    /// Zero-count aggregates produce no mean rather than a division by zero
    pub fn mean(&self) -> Option<f64> {
        if self.count > 0 {
            Some(self.sum / self.count as f64)
        } else {
            None
        }
    }
}

/// Derived per-dimension metric, defined only for count > 0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureMean {
    pub dimension: usize,
    pub mean: f64,
}
