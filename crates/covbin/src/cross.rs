//! Cross-product bin generation.
//!
//! Given one bin list per dimension, crossing produces one bin for every
//! combination, enumerated with the last dimension varying fastest. Regions
//! are concatenated in dimension order.

use crate::bin::{Bin, BinKind, BinList};
use crate::range::RangeSet;
use crate::result::{CovError, CovResult};

/// Maximum number of non-empty dimensions in one cross
pub const MAX_CROSS_DIMS: usize = 20;

/// Builder for crossed bin lists
#[derive(Debug, Clone, Default)]
pub struct CrossBuilder {
    dims: Vec<BinList>,
    goal: i64,
    weight: i64,
}

impl CrossBuilder {
    /// Create an empty builder with goal and weight 0
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the next dimension
    #[must_use]
    pub fn dim(mut self, bins: BinList) -> Self {
        self.dims.push(bins);
        self
    }

    /// Minimum goal for crossed count bins
    #[must_use]
    pub fn goal(mut self, goal: i64) -> Self {
        self.goal = goal;
        self
    }

    /// Minimum weight for crossed count bins
    #[must_use]
    pub fn weight(mut self, weight: i64) -> Self {
        self.weight = weight;
        self
    }

    /// Generate the crossed bins
    pub fn build(&self) -> CovResult<BinList> {
        cross(&self.dims, self.goal, self.weight)
    }
}

/// Dimension lists that take part in a cross: trailing empty lists dropped
pub(crate) fn active_dims(dims: &[BinList]) -> CovResult<&[BinList]> {
    let end = dims.iter().rposition(|d| !d.is_empty()).map_or(0, |i| i + 1);
    if end > MAX_CROSS_DIMS {
        return Err(CovError::TooManyDimensions {
            count: end,
            max: MAX_CROSS_DIMS,
        });
    }
    Ok(&dims[..end])
}

/// Cross the given dimension lists.
///
/// The result has `product(len(dim))` bins. A crossed bin is illegal if any
/// constituent is illegal, else ignore if any is ignore, else count. Count
/// results get `max(goal, constituent goals)` and `max(weight, constituent
/// weights)`; ignore and illegal results get 0 for both.
pub fn cross(dims: &[BinList], goal: i64, weight: i64) -> CovResult<BinList> {
    let dims = active_dims(dims)?;
    if dims.is_empty() {
        return Ok(BinList::new());
    }

    let total = dims
        .iter()
        .try_fold(1usize, |acc, d| acc.checked_mul(d.len()))
        .ok_or(CovError::CrossOverflow)?;

    let mut out = BinList::new();
    out.try_reserve_exact(total)
        .map_err(|_| CovError::CrossOverflow)?;

    let mut digits = vec![0usize; dims.len()];
    for _ in 0..total {
        out.push(combine(dims, &digits, goal, weight));

        // mixed-radix increment, last dimension fastest
        for d in (0..digits.len()).rev() {
            digits[d] += 1;
            if digits[d] < dims[d].len() {
                break;
            }
            digits[d] = 0;
        }
    }
    Ok(out)
}

fn combine(dims: &[BinList], digits: &[usize], goal: i64, weight: i64) -> Bin {
    let mut region = RangeSet::default();
    let mut kind = BinKind::Count;
    let mut max_goal = goal;
    let mut max_weight = weight;

    for (list, &digit) in dims.iter().zip(digits) {
        let part = &list[digit];
        region.extend_from(part.region());
        kind = kind.combine(part.kind());
        if part.kind().is_count() {
            max_goal = max_goal.max(part.goal());
            max_weight = max_weight.max(part.weight());
        }
    }

    if kind.is_count() {
        Bin::new(region, kind, max_goal, max_weight)
    } else {
        Bin::new(region, kind, 0, 0)
    }
}
