//! Coverage metrics and next-stimulus selection.
//!
//! All percentages are computed over count bins only. A bin's contribution
//! is capped at its goal scaled by the target, so overshooting one bin never
//! hides a hole in another.

use crate::alert::Severity;
use crate::bin::Bin;
use crate::config::{SelectMode, WeightMode};
use crate::model::CoverageModel;
use crate::range::RangeSet;
use crate::result::{CovError, CovResult};

/// Margin above the least-covered bin once every bin reached the target
const SATURATED_MARGIN: f64 = 0.001;

/// `ceil(target * goal / 100)`
#[inline]
fn scaled_goal(target: f64, goal: i64) -> i64 {
    (target * goal as f64 / 100.0).ceil() as i64
}

/// Selection weight of `bin` when bins below `ceiling` percent are eligible
fn selection_weight(bin: &Bin, mode: WeightMode, scale: f64, ceiling: f64) -> i64 {
    let goal = bin.goal() as f64;
    let count = bin.count();
    let weight = match mode {
        WeightMode::AtLeast => bin.goal(),
        WeightMode::Weight => bin.weight(),
        WeightMode::Remain => scaled_goal(ceiling, bin.goal()) - count,
        WeightMode::RemainExp => {
            let remaining = (ceiling * goal / 100.0 - count as f64).max(0.0);
            bin.weight().saturating_mul(remaining.powf(scale).ceil() as i64)
        }
        WeightMode::RemainScaled => scaled_goal(scale * ceiling, bin.goal()) - count,
        WeightMode::RemainWeight => bin
            .weight()
            .saturating_mul(scaled_goal(scale * ceiling, bin.goal()) - count),
    };
    weight.max(0)
}

impl CoverageModel {
    fn count_bins(&self) -> impl Iterator<Item = (usize, &Bin)> {
        self.store
            .iter()
            .enumerate()
            .filter(|(_, b)| b.kind().is_count())
    }

    /// Percentage of the target-scaled goals reached over all count bins.
    ///
    /// 100 when there is nothing to cover.
    #[must_use]
    pub fn percent_covered(&self, target: f64) -> f64 {
        let mut total_goal: i128 = 0;
        let mut total_count: i128 = 0;
        for (_, bin) in self.count_bins() {
            let cap = scaled_goal(target, bin.goal());
            total_goal += i128::from(cap);
            total_count += i128::from(bin.count().min(cap));
        }
        if total_goal == 0 {
            100.0
        } else {
            100.0 * total_count as f64 / total_goal as f64
        }
    }

    /// [`percent_covered`](Self::percent_covered) at the model's target
    #[must_use]
    pub fn cov(&self) -> f64 {
        self.percent_covered(self.settings.cov_target)
    }

    /// Sum of target-scaled goals over count bins
    #[must_use]
    pub fn total_cov_goal(&self, target: f64) -> i64 {
        self.count_bins()
            .map(|(_, b)| scaled_goal(target, b.goal()))
            .fold(0, i64::saturating_add)
    }

    /// Indices of count bins below `target` percent, in store order
    #[must_use]
    pub fn holes(&self, target: f64) -> Vec<usize> {
        self.count_bins()
            .filter(|(_, b)| b.percent() < target)
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of count bins below `target` percent
    #[must_use]
    pub fn count_holes(&self, target: f64) -> usize {
        self.count_bins().filter(|(_, b)| b.percent() < target).count()
    }

    /// No count bin is below `target` percent
    #[must_use]
    pub fn is_covered_at(&self, target: f64) -> bool {
        self.count_holes(target) == 0
    }

    /// No count bin is below the model's target
    #[must_use]
    pub fn is_covered(&self) -> bool {
        self.is_covered_at(self.settings.cov_target)
    }

    fn extreme_bin(&self, want_max: bool) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (i, bin) in self.count_bins() {
            let better = match best {
                None => true,
                Some((_, p)) if want_max => bin.percent() > p,
                Some((_, p)) => bin.percent() < p,
            };
            if better {
                best = Some((i, bin.percent()));
            }
        }
        best
    }

    /// Lowest coverage percentage among count bins
    #[must_use]
    pub fn min_cov(&self) -> Option<f64> {
        self.extreme_bin(false).map(|(_, p)| p)
    }

    /// Highest coverage percentage among count bins
    #[must_use]
    pub fn max_cov(&self) -> Option<f64> {
        self.extreme_bin(true).map(|(_, p)| p)
    }

    /// Lowest hit count among count bins
    #[must_use]
    pub fn min_count(&self) -> Option<i64> {
        self.count_bins().map(|(_, b)| b.count()).min()
    }

    /// Highest hit count among count bins
    #[must_use]
    pub fn max_count(&self) -> Option<i64> {
        self.count_bins().map(|(_, b)| b.count()).max()
    }

    fn no_count_bins(&mut self) -> CovError {
        self.fatal(CovError::empty_model("selection requires at least one count bin"))
    }

    /// First count bin with the lowest coverage; cached as the last index
    pub fn min_index(&mut self) -> CovResult<usize> {
        let Some((index, _)) = self.extreme_bin(false) else {
            return Err(self.no_count_bins());
        };
        self.last_index = Some(index);
        Ok(index)
    }

    /// First count bin with the highest coverage; cached as the last index
    pub fn max_index(&mut self) -> CovResult<usize> {
        let Some((index, _)) = self.extreme_bin(true) else {
            return Err(self.no_count_bins());
        };
        self.last_index = Some(index);
        Ok(index)
    }

    /// Round-robin over all bins regardless of kind or coverage
    pub fn inc_index(&mut self) -> CovResult<usize> {
        let len = self.store.len();
        if len == 0 {
            let err = CovError::empty_model("incremental selection on a model without bins");
            return Err(self.fatal(err));
        }
        let index = self.next_inc_index % len;
        self.next_inc_index = (index + 1) % len;
        self.last_index = Some(index);
        Ok(index)
    }

    /// Weighted random choice among count bins that are still eligible.
    ///
    /// Bins below the eligibility ceiling are weighted by the model's weight
    /// mode. The ceiling is the target while any bin is below it, tightened to
    /// `min + threshold` when thresholding is on. Once everything reached the
    /// target, only bins tied with the least-covered one stay eligible (or
    /// those within the threshold when thresholding is on).
    pub fn rand_index(&mut self, target: f64) -> CovResult<usize> {
        let Some((min_index, min_cov)) = self.extreme_bin(false) else {
            return Err(self.no_count_bins());
        };

        let settings = &self.settings;
        let ceiling = if settings.thresholding {
            let ceiling = min_cov + settings.threshold;
            if min_cov < target {
                ceiling.min(target)
            } else {
                ceiling
            }
        } else if min_cov < target {
            target
        } else {
            min_cov + SATURATED_MARGIN
        };

        let weights: Vec<i64> = self
            .store
            .iter()
            .map(|b| {
                if b.kind().is_count() && b.percent() < ceiling {
                    selection_weight(b, settings.weight_mode, settings.weight_scale, ceiling)
                } else {
                    0
                }
            })
            .collect();

        let index = match self.rng.weighted_discrete(&weights) {
            Some(index) if weights.get(index).is_some_and(|w| *w > 0) => index,
            Some(index) => {
                self.alerts.raise(
                    Severity::Warning,
                    format!("random source picked ineligible bin {index}, using bin {min_index}"),
                );
                min_index
            }
            None => min_index,
        };
        tracing::trace!(index, ceiling, "random bin selected");
        self.last_index = Some(index);
        Ok(index)
    }

    /// Select an index with the given policy
    pub fn next_index(&mut self, mode: SelectMode) -> CovResult<usize> {
        match mode {
            SelectMode::Random => self.rand_index(self.settings.cov_target),
            SelectMode::Increment => self.inc_index(),
            SelectMode::Minimum => self.min_index(),
        }
    }

    /// Region of the `n`-th (1-based) count bin below `target`.
    ///
    /// When there are fewer holes, an error alert is raised and the last
    /// bin's region is returned.
    pub fn hole_region(&mut self, n: usize, target: f64) -> CovResult<RangeSet> {
        let found = self
            .count_bins()
            .filter(|(_, b)| b.percent() < target)
            .nth(n.saturating_sub(1))
            .filter(|_| n > 0)
            .map(|(_, b)| b.region().clone());
        if let Some(region) = found {
            return Ok(region);
        }
        let Some(last) = self.store.bins().last().map(|b| b.region().clone()) else {
            let err = CovError::empty_model("hole lookup on a model without bins");
            return Err(self.fatal(err));
        };
        self.alerts.raise(
            Severity::Error,
            format!("coverage hole {n} below {target}% not found, using last bin {last}"),
        );
        Ok(last)
    }

    /// Uniform random point inside the bin at `index`
    fn point_in(&mut self, index: usize) -> CovResult<Vec<i64>> {
        let Some(ranges) = self.store.get(index).map(|b| b.region().ranges().to_vec()) else {
            let err = CovError::empty_model(format!("no bin at index {index}"));
            return Err(self.fatal(err));
        };
        let point: Vec<i64> = ranges
            .iter()
            .map(|r| self.rng.uniform_int(r.min, r.max))
            .collect();
        self.last_point = Some(point.clone());
        Ok(point)
    }

    /// Random point inside a bin chosen by [`rand_index`](Self::rand_index)
    pub fn rand_point(&mut self, target: f64) -> CovResult<Vec<i64>> {
        let index = self.rand_index(target)?;
        self.point_in(index)
    }

    /// Random point inside a bin chosen with the given policy
    pub fn next_point(&mut self, mode: SelectMode) -> CovResult<Vec<i64>> {
        let index = self.next_index(mode)?;
        self.point_in(index)
    }
}
