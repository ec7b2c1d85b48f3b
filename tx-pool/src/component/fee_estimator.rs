//! Component F: the Fee Estimator. A bounded ring of recent per-block
//! fee medians (`spec.md` §4.F), rooted in `recentMedianFee`, exposing
//! the `(min, max)` recommendation.
//!
//! Open question (preserved verbatim, `spec.md` §9): the 75%-ile rule
//! used to derive each block's entry — implemented in
//! `crate::component::reorg` — and these floor/multiplier constants are
//! workarounds the source flags as worth revisiting; this spec keeps
//! them as-is because changing them would change observable fee
//! recommendations.

use std::collections::VecDeque;
use txpool_types::Currency;

/// A small fraction of native precision per kilobyte, used as the
/// absolute floor below which `FeeEstimation` never recommends going,
/// even with an empty ring.
pub const DEFAULT_MIN_ESTIMATION: Currency = Currency::new(1);
/// `min = max(minEstimation, recentMedianFee * minExtendMultiplier)`.
pub const DEFAULT_MIN_EXTEND_MULTIPLIER: u128 = 1;
/// `max = min * maxMultiplier`.
pub const DEFAULT_MAX_MULTIPLIER: u128 = 25;

pub struct FeeEstimator {
    depth: usize,
    recent_medians: VecDeque<Currency>,
    recent_median_fee: Currency,
    min_estimation: Currency,
    min_extend_multiplier: u128,
    max_multiplier: u128,
}

impl FeeEstimator {
    pub fn new(depth: usize) -> Self {
        FeeEstimator {
            depth,
            recent_medians: VecDeque::with_capacity(depth),
            recent_median_fee: Currency::ZERO,
            min_estimation: DEFAULT_MIN_ESTIMATION,
            min_extend_multiplier: DEFAULT_MIN_EXTEND_MULTIPLIER,
            max_multiplier: DEFAULT_MAX_MULTIPLIER,
        }
    }

    /// Restore a ring snapshot loaded from the persistent `FeeMedian`
    /// bucket at startup. Trims to the `depth` most-recent entries (the
    /// store may carry a few more if it wasn't pruned exactly in step
    /// with the in-memory ring) and recomputes `recentMedianFee` from
    /// what's restored, rather than trusting a stale persisted value.
    pub fn restore(depth: usize, recent_medians: Vec<Currency>) -> Self {
        let mut estimator = FeeEstimator::new(depth);
        let mut medians: VecDeque<Currency> = recent_medians.into();
        while medians.len() > depth {
            medians.pop_front();
        }
        estimator.recent_medians = medians;
        estimator.recompute();
        estimator
    }

    pub fn recent_medians(&self) -> Vec<Currency> {
        self.recent_medians.iter().copied().collect()
    }

    pub fn recent_median_fee(&self) -> Currency {
        self.recent_median_fee
    }

    /// Append one applied block's 75%-ile fee, trim to `depth` most
    /// recent entries, then recompute `recentMedianFee`.
    pub fn push_block_median(&mut self, median: Currency) {
        self.recent_medians.push_back(median);
        while self.recent_medians.len() > self.depth {
            self.recent_medians.pop_front();
        }
        self.recompute();
    }

    /// Undo one applied block's contribution on revert. Pops the most
    /// recently pushed entry (LIFO), matching the order reverts are
    /// processed in within a single consensus change.
    pub fn pop_one(&mut self) {
        self.recent_medians.pop_back();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.recent_median_fee = median_of(self.recent_medians.iter().copied().collect());
    }

    /// `FeeEstimation() -> (min, max)`.
    pub fn estimate(&self) -> (Currency, Currency) {
        let floor_extended = self.recent_median_fee * self.min_extend_multiplier;
        let min = std::cmp::max(self.min_estimation, floor_extended);
        let max = min * self.max_multiplier;
        (min, max)
    }
}

/// Median of a sorted copy of `values`: for an even count, the lower of
/// the two middle values, matching the integer-currency "median of a
/// sorted copy" the spec describes without specifying interpolation.
fn median_of(mut values: Vec<Currency>) -> Currency {
    if values.is_empty() {
        return Currency::ZERO;
    }
    values.sort();
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        values[mid - 1]
    } else {
        values[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ring_returns_the_floor() {
        let estimator = FeeEstimator::new(6);
        let (min, _max) = estimator.estimate();
        assert_eq!(min, DEFAULT_MIN_ESTIMATION);
    }

    #[test]
    fn ring_is_trimmed_to_configured_depth() {
        let mut estimator = FeeEstimator::new(3);
        for i in 1..=5u128 {
            estimator.push_block_median(Currency::new(i));
        }
        assert_eq!(estimator.recent_medians().len(), 3);
        assert_eq!(
            estimator.recent_medians(),
            vec![Currency::new(3), Currency::new(4), Currency::new(5)]
        );
    }

    #[test]
    fn fee_estimation_rises_with_congestion() {
        let mut estimator = FeeEstimator::new(6);
        let mut previous_min = Currency::ZERO;
        for i in 1..=6u128 {
            estimator.push_block_median(Currency::new(i * 10));
            let (min, _max) = estimator.estimate();
            assert!(min >= previous_min);
            previous_min = min;
        }
        assert!(previous_min > DEFAULT_MIN_ESTIMATION);
    }

    #[test]
    fn restore_recomputes_the_median_fee_instead_of_trusting_a_stale_value() {
        let medians = vec![Currency::new(10), Currency::new(20), Currency::new(30)];
        let estimator = FeeEstimator::restore(6, medians);
        assert_eq!(estimator.recent_median_fee(), Currency::new(20));
    }

    #[test]
    fn restore_trims_a_snapshot_larger_than_depth() {
        let medians = (1..=10u128).map(Currency::new).collect::<Vec<_>>();
        let estimator = FeeEstimator::restore(3, medians);
        assert_eq!(
            estimator.recent_medians(),
            vec![Currency::new(8), Currency::new(9), Currency::new(10)]
        );
    }

    #[test]
    fn pop_one_undoes_the_most_recent_push() {
        let mut estimator = FeeEstimator::new(6);
        estimator.push_block_median(Currency::new(5));
        estimator.push_block_median(Currency::new(10));
        estimator.pop_one();
        assert_eq!(estimator.recent_medians(), vec![Currency::new(5)]);
    }
}
