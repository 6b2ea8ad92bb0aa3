//! Value-space regions.
//!
//! A [`RangeSet`] is a hyper-rectangle: one inclusive `[min, max]` interval
//! per dimension. A bin's region and a sampled point are compared dimension
//! by dimension.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One inclusive interval of a single dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    /// Lowest value in the interval
    pub min: i64,
    /// Highest value in the interval
    pub max: i64,
}

impl Range {
    /// Create a new interval
    #[inline]
    #[must_use]
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Interval covering exactly one value
    #[inline]
    #[must_use]
    pub const fn value(value: i64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// `min > max` marks the empty interval
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.min > self.max
    }

    /// Check if a value lies within the interval
    #[inline]
    #[must_use]
    pub const fn contains_value(self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Check if `other` lies entirely within this interval
    #[inline]
    #[must_use]
    pub const fn contains_range(self, other: Self) -> bool {
        self.min <= other.min && other.max <= self.max
    }

    /// Number of values in the interval (0 when empty)
    #[must_use]
    pub fn span(self) -> u128 {
        if self.is_empty() {
            0
        } else {
            (i128::from(self.max) - i128::from(self.min) + 1) as u128
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "({})", self.min)
        } else {
            write!(f, "({} to {})", self.min, self.max)
        }
    }
}

/// A region of the value space: one [`Range`] per dimension
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RangeSet(Vec<Range>);

impl RangeSet {
    /// Create a region from its per-dimension intervals
    #[must_use]
    pub fn new(ranges: Vec<Range>) -> Self {
        Self(ranges)
    }

    /// One-dimensional region
    #[must_use]
    pub fn single(min: i64, max: i64) -> Self {
        Self(vec![Range::new(min, max)])
    }

    /// Build a region from `(min, max)` pairs
    #[must_use]
    pub fn from_pairs(pairs: &[(i64, i64)]) -> Self {
        Self(pairs.iter().map(|&(min, max)| Range::new(min, max)).collect())
    }

    /// Region that covers exactly the given point
    #[must_use]
    pub fn from_point(point: &[i64]) -> Self {
        Self(point.iter().copied().map(Range::value).collect())
    }

    /// Number of dimensions
    #[inline]
    #[must_use]
    pub fn dims(&self) -> usize {
        self.0.len()
    }

    /// Per-dimension intervals
    #[inline]
    #[must_use]
    pub fn ranges(&self) -> &[Range] {
        &self.0
    }

    /// The null region: no dimensions, or any dimension with `min > max`
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0.is_empty() || self.0.iter().any(|r| r.is_empty())
    }

    /// Check if a sampled point lies within the region.
    ///
    /// A point of a different dimension count is never contained.
    #[must_use]
    pub fn contains_point(&self, point: &[i64]) -> bool {
        self.0.len() == point.len()
            && self
                .0
                .iter()
                .zip(point)
                .all(|(range, &value)| range.contains_value(value))
    }

    /// Check if `other` lies entirely within this region
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .zip(&other.0)
                .all(|(outer, inner)| outer.contains_range(*inner))
    }

    /// Append another region's dimensions after this one's
    pub fn extend_from(&mut self, other: &Self) {
        self.0.extend_from_slice(&other.0);
    }
}

impl From<Vec<Range>> for RangeSet {
    fn from(ranges: Vec<Range>) -> Self {
        Self(ranges)
    }
}

impl fmt::Display for RangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, range) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" x ")?;
            }
            write!(f, "{range}")?;
        }
        Ok(())
    }
}
