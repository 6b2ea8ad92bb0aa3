//! Bin storage with insertion and merge policy.
//!
//! Bins are kept in insertion order. Sampling scans them front to back, so
//! earlier bins take precedence; insertion with merging enabled scans back
//! to front, so the most recent containing bin decides.

use crate::bin::{Bin, BinKind};
use crate::range::RangeSet;
use crate::result::{CovError, CovResult};

/// Storage grows in multiples of this many bins
pub const GROWTH_QUANTUM: usize = 32;

/// What [`BinStore::insert`] did with a bin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Stored as a new bin at this index
    Appended(usize),
    /// Folded into the identical bin at this index
    Merged(usize),
    /// Count bin inside an ignore/illegal bin, or a null region; not stored
    Suppressed,
    /// Ignore/illegal bin inside the ignore/illegal bin at this index; not stored
    SubsetDropped(usize),
}

/// Ordered, growable collection of bins sharing one dimension count
#[derive(Debug, Clone, Default)]
pub struct BinStore {
    bins: Vec<Bin>,
    dims: Option<usize>,
}

impl BinStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bins
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// Check if the store has no bins
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Dimension count, fixed by the first bin
    #[inline]
    #[must_use]
    pub fn dims(&self) -> Option<usize> {
        self.dims
    }

    /// Bin at `index`
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Bin> {
        self.bins.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Bin> {
        self.bins.get_mut(index)
    }

    /// All bins in store order
    #[inline]
    #[must_use]
    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    /// Iterate bins in store order
    pub fn iter(&self) -> std::slice::Iter<'_, Bin> {
        self.bins.iter()
    }

    /// Allocated capacity (always a multiple of [`GROWTH_QUANTUM`] once used)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bins.capacity()
    }

    /// Make room for at least `total` bins without further reallocation
    pub fn reserve_total(&mut self, total: usize) {
        if total > self.bins.capacity() {
            let target = total.div_ceil(GROWTH_QUANTUM) * GROWTH_QUANTUM;
            self.bins.reserve_exact(target - self.bins.len());
        }
    }

    /// Fix the dimension count, or check it against the fixed one
    pub fn check_dims(&mut self, dims: usize, context: &str) -> CovResult<()> {
        match self.dims {
            Some(expected) if expected != dims => {
                Err(CovError::dimension_mismatch(expected, dims, context))
            }
            Some(_) => Ok(()),
            None => {
                self.dims = Some(dims);
                Ok(())
            }
        }
    }

    /// Append a bin unconditionally, returning its index
    pub fn push(&mut self, bin: Bin) -> CovResult<usize> {
        self.check_dims(bin.region().dims(), "bin insertion")?;
        self.reserve_total(self.bins.len() + 1);
        self.bins.push(bin);
        Ok(self.bins.len() - 1)
    }

    /// Index of the most recently inserted bin whose region contains `region`
    #[must_use]
    pub fn find_containing(&self, region: &RangeSet) -> Option<usize> {
        self.bins.iter().rposition(|b| b.region().contains(region))
    }

    /// Index of the first bin with the same definition as `bin`
    #[must_use]
    pub fn find_exact(&self, bin: &Bin) -> Option<usize> {
        self.bins.iter().position(|b| b.same_definition(bin))
    }

    /// Insert a bin under the merge policy.
    ///
    /// With `merging` off the bin is always appended. With `merging` on, the
    /// most recently inserted bin containing the new region decides:
    ///
    /// | containing bin | incoming        | result                         |
    /// |----------------|-----------------|--------------------------------|
    /// | none           | any             | append                         |
    /// | count          | identical count | merge count, goal and weight   |
    /// | count          | anything else   | append                         |
    /// | ignore/illegal | count           | suppressed                     |
    /// | ignore/illegal | ignore/illegal  | dropped as a subset            |
    pub fn insert(&mut self, bin: Bin, merging: bool) -> CovResult<InsertOutcome> {
        if bin.region().is_null() {
            tracing::debug!(region = %bin.region(), "null region not stored");
            return Ok(InsertOutcome::Suppressed);
        }
        self.check_dims(bin.region().dims(), "bin insertion")?;

        if !merging {
            return self.push(bin).map(InsertOutcome::Appended);
        }

        let Some(index) = self.find_containing(bin.region()) else {
            return self.push(bin).map(InsertOutcome::Appended);
        };

        let found = &self.bins[index];
        let identical = found.region() == bin.region() && found.name() == bin.name();
        match (found.kind(), bin.kind()) {
            (BinKind::Count, BinKind::Count) if identical => {
                self.bins[index].absorb(bin.count(), bin.goal(), bin.weight());
                tracing::debug!(index, region = %bin.region(), "merged into existing bin");
                Ok(InsertOutcome::Merged(index))
            }
            (BinKind::Count, _) => self.push(bin).map(InsertOutcome::Appended),
            (_, BinKind::Count) => {
                tracing::debug!(index, region = %bin.region(), "count bin inside ignore/illegal bin suppressed");
                Ok(InsertOutcome::Suppressed)
            }
            _ => Ok(InsertOutcome::SubsetDropped(index)),
        }
    }

    /// Drop every bin and forget the dimension count
    pub fn clear(&mut self) {
        self.bins = Vec::new();
        self.dims = None;
    }

    /// Zero every bin's count, keeping the bins
    pub fn reset_counts(&mut self) {
        for bin in &mut self.bins {
            bin.reset_count();
        }
    }
}

impl<'a> IntoIterator for &'a BinStore {
    type Item = &'a Bin;
    type IntoIter = std::slice::Iter<'a, Bin>;

    fn into_iter(self) -> Self::IntoIter {
        self.bins.iter()
    }
}
