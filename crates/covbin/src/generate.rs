//! Pure bin-list generators.
//!
//! None of these functions touch a model or raise alerts. Degenerate input
//! (`min > max`, a non-positive bin count, an empty value list) produces the
//! empty bin list, which every consumer treats as "nothing to add".

use crate::bin::{Bin, BinKind, BinList};
use crate::range::{Range, RangeSet};

/// Most bins a single generator call produces
pub const MAX_GENERATED_BINS: i64 = 1 << 16;

/// Split `[min, max]` into `num_bins` contiguous one-dimensional bins.
///
/// Bins are as equal as possible, with later bins taking the extra values.
/// When `num_bins` exceeds the number of values, each value gets its own bin.
/// At most [`MAX_GENERATED_BINS`] bins are produced; beyond that the range
/// is split into that many wider bins.
#[must_use]
pub fn make_range(min: i64, max: i64, num_bins: i64, goal: i64, weight: i64, kind: BinKind) -> BinList {
    if min > max || num_bins <= 0 {
        return BinList::new();
    }

    let size = i128::from(max) - i128::from(min) + 1;
    let mut remaining = size
        .min(i128::from(num_bins))
        .min(i128::from(MAX_GENERATED_BINS));
    let mut bins = BinList::with_capacity(usize::try_from(remaining).unwrap_or(0));
    let mut cur_min = i128::from(min);
    let max = i128::from(max);

    while remaining > 0 {
        let items = (max - cur_min + 1) / remaining;
        let cur_max = cur_min + items - 1;
        // cur_min/cur_max stay within [min, max], so the narrowing is lossless
        bins.push(Bin::new(
            RangeSet::single(cur_min as i64, cur_max as i64),
            kind,
            goal,
            weight,
        ));
        remaining -= 1;
        cur_min += items;
    }
    bins
}

/// One single-value bin per entry of `values`
#[must_use]
pub fn make_discrete(values: &[i64], goal: i64, weight: i64, kind: BinKind) -> BinList {
    values
        .iter()
        .map(|&v| Bin::new(RangeSet::new(vec![Range::value(v)]), kind, goal, weight))
        .collect()
}

/// Count bins splitting `[min, max]` into `num_bins`, goal 1 and weight 1
#[must_use]
pub fn gen_bin(min: i64, max: i64, num_bins: i64) -> BinList {
    make_range(min, max, num_bins, 1, 1, BinKind::Count)
}

/// One count bin per value of `[min, max]`, up to [`MAX_GENERATED_BINS`]
#[must_use]
pub fn gen_bins(min: i64, max: i64) -> BinList {
    let num_bins = if min > max {
        0
    } else {
        i64::try_from(i128::from(max) - i128::from(min) + 1).unwrap_or(i64::MAX)
    };
    gen_bin(min, max, num_bins)
}

/// One count bin per listed value, goal 1 and weight 1
#[must_use]
pub fn gen_values(values: &[i64]) -> BinList {
    make_discrete(values, 1, 1, BinKind::Count)
}

/// Ignore bins splitting `[min, max]` into `num_bins`
#[must_use]
pub fn ignore_bin(min: i64, max: i64, num_bins: i64) -> BinList {
    make_range(min, max, num_bins, 0, 0, BinKind::Ignore)
}

/// Illegal bins splitting `[min, max]` into `num_bins`
#[must_use]
pub fn illegal_bin(min: i64, max: i64, num_bins: i64) -> BinList {
    make_range(min, max, num_bins, 0, 0, BinKind::Illegal)
}

/// One ignore bin per listed value
#[must_use]
pub fn ignore_values(values: &[i64]) -> BinList {
    make_discrete(values, 0, 0, BinKind::Ignore)
}

/// One illegal bin per listed value
#[must_use]
pub fn illegal_values(values: &[i64]) -> BinList {
    make_discrete(values, 0, 0, BinKind::Illegal)
}
