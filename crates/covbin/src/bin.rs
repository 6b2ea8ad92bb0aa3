//! Coverage bins.

use crate::range::RangeSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Percentage reported for bins with a negative goal.
///
/// Large enough that such bins never count as holes and never win a
/// minimum-coverage search.
pub const PERCENT_SENTINEL: f64 = f64::MAX;

/// What a hit on a bin means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BinKind {
    /// Hits count toward coverage
    #[default]
    Count,
    /// Hits are ignored
    Ignore,
    /// Hits are errors and decrement the bin's count
    Illegal,
}

impl BinKind {
    /// Signed amount added to a bin's count on every hit
    #[inline]
    #[must_use]
    pub const fn unit(self) -> i64 {
        match self {
            Self::Count => 1,
            Self::Ignore => 0,
            Self::Illegal => -1,
        }
    }

    /// Inverse of [`BinKind::unit`]
    #[must_use]
    pub const fn from_unit(unit: i64) -> Option<Self> {
        match unit {
            1 => Some(Self::Count),
            0 => Some(Self::Ignore),
            -1 => Some(Self::Illegal),
            _ => None,
        }
    }

    /// Kind of a crossed bin: illegal dominates ignore, ignore dominates count
    #[must_use]
    pub const fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Self::Illegal, _) | (_, Self::Illegal) => Self::Illegal,
            (Self::Ignore, _) | (_, Self::Ignore) => Self::Ignore,
            _ => Self::Count,
        }
    }

    /// Check if this is a count bin
    #[inline]
    #[must_use]
    pub const fn is_count(self) -> bool {
        matches!(self, Self::Count)
    }
}

impl fmt::Display for BinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Count => "count",
            Self::Ignore => "ignore",
            Self::Illegal => "illegal",
        })
    }
}

/// Coverage percentage of a bin with the given count and goal
#[must_use]
pub fn percent_for(count: i64, goal: i64) -> f64 {
    match goal {
        g if g > 0 => 100.0 * count as f64 / g as f64,
        0 => 100.0,
        _ => PERCENT_SENTINEL,
    }
}

/// One region of the value space plus its coverage state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    region: RangeSet,
    kind: BinKind,
    count: i64,
    goal: i64,
    weight: i64,
    name: String,
    percent: f64,
}

/// Ordered list of bins, as produced by the generators and the cross builder.
///
/// The empty list doubles as the null bin list returned for degenerate
/// generator input.
pub type BinList = Vec<Bin>;

impl Bin {
    /// Create an unnamed bin with a zero count
    #[must_use]
    pub fn new(region: RangeSet, kind: BinKind, goal: i64, weight: i64) -> Self {
        Self {
            region,
            kind,
            count: 0,
            goal,
            weight,
            name: String::new(),
            percent: percent_for(0, goal),
        }
    }

    /// Set the starting count
    #[must_use]
    pub fn with_count(mut self, count: i64) -> Self {
        self.count = count;
        self.refresh_percent();
        self
    }

    /// Set the bin name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Region covered by this bin
    #[inline]
    #[must_use]
    pub fn region(&self) -> &RangeSet {
        &self.region
    }

    /// Bin kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> BinKind {
        self.kind
    }

    /// Hit count (negative for illegal bins that were hit)
    #[inline]
    #[must_use]
    pub fn count(&self) -> i64 {
        self.count
    }

    /// Number of hits required for 100% coverage
    #[inline]
    #[must_use]
    pub fn goal(&self) -> i64 {
        self.goal
    }

    /// Relative weight used by weight-based selection
    #[inline]
    #[must_use]
    pub fn weight(&self) -> i64 {
        self.weight
    }

    /// Bin name (may be empty)
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Coverage percentage derived from count and goal
    #[inline]
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.percent
    }

    /// Check if a sampled point falls into this bin
    #[inline]
    #[must_use]
    pub fn contains_point(&self, point: &[i64]) -> bool {
        self.region.contains_point(point)
    }

    /// Same region, kind, goal, weight and name; counts may differ
    #[must_use]
    pub fn same_definition(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.goal == other.goal
            && self.weight == other.weight
            && self.name == other.name
            && self.region == other.region
    }

    /// Apply one hit: the count moves by the kind's unit
    pub(crate) fn hit(&mut self) {
        self.count += self.kind.unit();
        self.refresh_percent();
    }

    pub(crate) fn add_count(&mut self, count: i64) {
        self.count += count;
        self.refresh_percent();
    }

    /// Merge an identical bin definition into this one
    pub(crate) fn absorb(&mut self, count: i64, goal: i64, weight: i64) {
        self.count += count;
        self.goal += goal;
        self.weight += weight;
        self.refresh_percent();
    }

    pub(crate) fn reset_count(&mut self) {
        self.count = 0;
        self.refresh_percent();
    }

    pub(crate) fn set_goal_weight(&mut self, goal: i64, weight: i64) {
        self.goal = goal;
        self.weight = weight;
        self.refresh_percent();
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        name.clone_into(&mut self.name);
    }

    fn refresh_percent(&mut self) {
        self.percent = percent_for(self.count, self.goal);
    }
}

impl fmt::Display for Bin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.name.is_empty() {
            write!(f, "{} ", self.name)?;
        }
        write!(
            f,
            "{} {} count={} goal={} weight={}",
            self.kind, self.region, self.count, self.goal, self.weight
        )
    }
}
