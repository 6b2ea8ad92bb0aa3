//! The coverage model: a bin store plus its policies and statistics.

use crate::alert::{AlertLog, AlertSink, Severity};
use crate::bin::{Bin, BinKind, BinList};
use crate::config::{
    validate_target, validate_threshold, validate_weight_mode, BinOptions, CountMode, IllegalMode,
    ModelSettings, WeightMode,
};
use crate::cross;
use crate::range::RangeSet;
use crate::result::{CovError, CovResult};
use crate::rng::{RandomSource, Seed, Xorshift64};
use crate::store::{BinStore, InsertOutcome};
use crate::vendor::{VendorCoverage, VendorHandle};

/// Name written for models that were never named
pub const UNNAMED_MODEL: &str = "Coverage_Model_Not_Named";

/// A functional coverage model
#[derive(Debug)]
pub struct CoverageModel {
    pub(crate) name: Option<String>,
    pub(crate) messages: Vec<String>,
    pub(crate) store: BinStore,
    pub(crate) settings: ModelSettings,
    pub(crate) rng: Box<dyn RandomSource>,
    pub(crate) alerts: AlertLog,
    vendor: Option<Box<dyn VendorCoverage>>,
    vendor_scope: Option<VendorHandle>,
    pub(crate) item_count: u64,
    pub(crate) last_index: Option<usize>,
    pub(crate) next_inc_index: usize,
    pub(crate) last_point: Option<Vec<i64>>,
}

impl Default for CoverageModel {
    fn default() -> Self {
        Self::new()
    }
}

impl CoverageModel {
    /// Create an unnamed model with default settings
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: None,
            messages: Vec::new(),
            store: BinStore::new(),
            settings: ModelSettings::default(),
            rng: Box::new(Xorshift64::default()),
            alerts: AlertLog::new(UNNAMED_MODEL),
            vendor: None,
            vendor_scope: None,
            item_count: 0,
            last_index: None,
            next_inc_index: 0,
            last_point: None,
        }
    }

    /// Create a named model, seeding its random source from the name
    #[must_use]
    pub fn named(name: &str) -> Self {
        let mut model = Self::new();
        model.set_name(name);
        model.init_seed(name);
        model
    }

    // ------------------------------------------------------------------
    // identity
    // ------------------------------------------------------------------

    /// Model name, if set
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name used in reports and the database
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED_MODEL)
    }

    /// Set the model name
    pub fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
        self.alerts.set_source(name);
        if let (Some(vendor), Some(scope)) = (&mut self.vendor, self.vendor_scope) {
            vendor.set_name(scope, name);
        }
    }

    /// Free-text messages stored with the model
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Append a message, one entry per line
    pub fn add_message(&mut self, message: &str) {
        if message.is_empty() {
            self.messages.push(String::new());
        } else {
            self.messages.extend(message.lines().map(str::to_string));
        }
    }

    /// Replace all messages with one
    pub fn set_message(&mut self, message: &str) {
        self.messages.clear();
        self.add_message(message);
    }

    // ------------------------------------------------------------------
    // settings
    // ------------------------------------------------------------------

    /// Current settings
    #[must_use]
    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// Replace all settings at once
    pub fn apply_settings(&mut self, settings: &ModelSettings) -> CovResult<()> {
        settings.validate().map_err(|e| self.fatal(e))?;
        self.settings = settings.clone();
        Ok(())
    }

    /// Set the random selection weighting
    pub fn set_weight_mode(&mut self, mode: WeightMode, scale: f64) -> CovResult<()> {
        validate_weight_mode(mode, scale).map_err(|e| self.fatal(e))?;
        self.settings.weight_mode = mode;
        self.settings.weight_scale = scale;
        Ok(())
    }

    /// Set illegal hit reporting
    pub fn set_illegal_mode(&mut self, mode: IllegalMode) {
        self.settings.illegal_mode = mode;
    }

    /// Set first-match or all-match counting
    pub fn set_count_mode(&mut self, mode: CountMode) {
        self.settings.count_mode = mode;
    }

    /// Enable thresholding at `percent`, or disable it with `None`
    pub fn set_threshold(&mut self, percent: Option<f64>) -> CovResult<()> {
        match percent {
            Some(p) => {
                validate_threshold(p).map_err(|e| self.fatal(e))?;
                self.settings.thresholding = true;
                self.settings.threshold = p;
            }
            None => self.settings.thresholding = false,
        }
        Ok(())
    }

    /// Enable or disable merging of identical bins
    pub fn set_merging(&mut self, merging: bool) {
        self.settings.merging = merging;
    }

    /// Set the coverage target percentage
    pub fn set_cov_target(&mut self, percent: f64) -> CovResult<()> {
        validate_target(percent).map_err(|e| self.fatal(e))?;
        self.settings.cov_target = percent;
        Ok(())
    }

    /// Coverage target percentage
    #[must_use]
    pub fn cov_target(&self) -> f64 {
        self.settings.cov_target
    }

    // ------------------------------------------------------------------
    // collaborators
    // ------------------------------------------------------------------

    /// Seed the random source from an integer
    pub fn set_seed(&mut self, value: i64) {
        self.rng.reseed(Seed::from_int(value));
    }

    /// Seed the random source from a string
    pub fn init_seed(&mut self, value: &str) {
        self.rng.reseed(Seed::from_name(value));
    }

    /// Current random state; see [`restore_seed`](Self::restore_seed)
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.rng.state()
    }

    /// Resume the random sequence from a value returned by [`seed`](Self::seed)
    pub fn restore_seed(&mut self, state: u64) {
        self.rng.reseed(Seed::from_u64(state));
    }

    /// Replace the random source
    pub fn set_random_source(&mut self, rng: Box<dyn RandomSource>) {
        self.rng = rng;
    }

    /// Forward alerts to `sink`
    pub fn set_alert_sink(&mut self, sink: Box<dyn AlertSink>) {
        self.alerts.set_sink(sink);
    }

    /// Alerts raised by this model
    #[must_use]
    pub fn alerts(&self) -> &AlertLog {
        &self.alerts
    }

    /// Mirror bins and hits into a simulator's coverage database
    pub fn set_vendor(&mut self, vendor: Box<dyn VendorCoverage>) {
        self.vendor = Some(vendor);
        self.vendor_scope = None;
    }

    pub(crate) fn fatal(&mut self, err: CovError) -> CovError {
        self.alerts.raise(Severity::Fatal, err.to_string());
        err
    }

    fn open_vendor_scope(&mut self, crossed: bool) {
        if self.vendor_scope.is_some() {
            return;
        }
        let name = self.display_name().to_string();
        if let Some(vendor) = &mut self.vendor {
            self.vendor_scope = if crossed {
                vendor.create_cross_scope(&name)
            } else {
                vendor.create_point_scope(&name)
            };
        }
    }

    // ------------------------------------------------------------------
    // population
    // ------------------------------------------------------------------

    /// Pre-allocate room for `total` bins
    pub fn set_bin_capacity(&mut self, total: usize) {
        self.store.reserve_total(total);
    }

    /// Insert a bin list.
    ///
    /// Count bins take `max(options, own)` goal and weight; ignore and
    /// illegal bins get 0 for both. With merging enabled the store's merge
    /// policy applies to each bin. A list whose bins disagree on dimension
    /// count is rejected before anything is inserted.
    pub fn add_bins(&mut self, options: &BinOptions, bins: BinList) -> CovResult<()> {
        if bins.is_empty() {
            return Ok(());
        }
        let mut widths = bins
            .iter()
            .filter(|b| !b.region().is_null())
            .map(|b| b.region().dims());
        if let Some(first) = widths.next() {
            let expected = self.store.dims().unwrap_or(first);
            if let Some(actual) = std::iter::once(first).chain(widths).find(|w| *w != expected) {
                let err = CovError::dimension_mismatch(expected, actual, "bin list");
                return Err(self.fatal(err));
            }
        }
        self.open_vendor_scope(false);
        self.store.reserve_total(self.store.len() + bins.len());
        for bin in bins {
            self.insert_bin(bin, options)?;
        }
        Ok(())
    }

    /// Cross the dimension lists and insert the result
    pub fn add_cross(&mut self, options: &BinOptions, dims: &[BinList]) -> CovResult<()> {
        let bins = cross::cross(dims, options.at_least, options.weight).map_err(|e| self.fatal(e))?;
        let Some(first) = bins.first() else {
            return Ok(());
        };
        let width = first.region().dims();
        if let Some(expected) = self.store.dims() {
            if expected != width {
                let err = CovError::dimension_mismatch(
                    expected,
                    width,
                    "cross coverage bins of different dimensions prohibited",
                );
                return Err(self.fatal(err));
            }
        }
        self.open_vendor_scope(true);
        self.store.reserve_total(self.store.len() + bins.len());
        for bin in bins {
            self.insert_bin(bin, options)?;
        }
        Ok(())
    }

    fn insert_bin(&mut self, mut bin: Bin, options: &BinOptions) -> CovResult<()> {
        let (goal, weight) = if bin.kind().is_count() {
            (options.at_least.max(bin.goal()), options.weight.max(bin.weight()))
        } else {
            (0, 0)
        };
        bin.set_goal_weight(goal, weight);
        if let Some(name) = &options.name {
            bin.set_name(name);
        }

        let region = bin.region().clone();
        let kind = bin.kind();
        let outcome = self
            .store
            .insert(bin, self.settings.merging)
            .map_err(|e| self.fatal(e))?;

        match outcome {
            InsertOutcome::Appended(index) => {
                if let (Some(vendor), Some(scope), Some(bin)) =
                    (&mut self.vendor, self.vendor_scope, self.store.get(index))
                {
                    vendor.add_bin(scope, bin.region(), bin.kind(), bin.goal(), bin.name());
                }
            }
            InsertOutcome::SubsetDropped(index) => {
                self.alerts.raise(
                    Severity::Error,
                    format!("{kind} bin {region} dropped: subset of prior bin {index}"),
                );
            }
            InsertOutcome::Merged(_) | InsertOutcome::Suppressed => {}
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // sampling
    // ------------------------------------------------------------------

    /// Record one sampled point
    pub fn record(&mut self, point: &[i64]) -> CovResult<()> {
        let Some(dims) = self.store.dims() else {
            let err = CovError::empty_model("record called before any bins were added");
            return Err(self.fatal(err));
        };
        if point.len() != dims {
            let err = CovError::dimension_mismatch(dims, point.len(), "record");
            return Err(self.fatal(err));
        }
        self.item_count += 1;

        let first_only = self.settings.count_mode == CountMode::First;
        if first_only {
            if let Some(index) = self.last_index {
                if self.store.get(index).is_some_and(|b| b.contains_point(point)) {
                    self.hit(index, point);
                    return Ok(());
                }
            }
        }

        let mut matched = false;
        for index in 0..self.store.len() {
            if !self.store.get(index).is_some_and(|b| b.contains_point(point)) {
                continue;
            }
            matched = true;
            self.hit(index, point);
            if first_only {
                self.last_index = Some(index);
                break;
            }
        }
        if !matched {
            tracing::trace!(?point, "sample matched no bin");
        }
        Ok(())
    }

    /// Record the point most recently produced by
    /// [`rand_point`](Self::rand_point) or [`next_point`](Self::next_point)
    pub fn record_last(&mut self) -> CovResult<()> {
        let Some(point) = self.last_point.clone() else {
            return Err(self.fatal(CovError::NoSelection));
        };
        self.record(&point)
    }

    fn hit(&mut self, index: usize, point: &[i64]) {
        let Some(bin) = self.store.get_mut(index) else {
            return;
        };
        bin.hit();
        if bin.kind() == BinKind::Illegal {
            let message = format!(
                "illegal bin {index} {} hit by {point:?} (count {})",
                bin.region(),
                bin.count()
            );
            match self.settings.illegal_mode {
                IllegalMode::On => self.alerts.raise(Severity::Error, message),
                IllegalMode::Failure => self.alerts.raise(Severity::Failure, message),
                IllegalMode::Off => {}
            }
        }
        if let (Some(vendor), Some(scope)) = (&mut self.vendor, self.vendor_scope) {
            vendor.inc_bin(scope, index);
        }
    }

    /// Drop all bins, messages and statistics; name and settings are kept
    pub fn clear(&mut self) {
        self.store.clear();
        self.messages.clear();
        self.item_count = 0;
        self.last_index = None;
        self.next_inc_index = 0;
        self.last_point = None;
    }

    /// Zero all counts, keeping the bins
    pub fn reset_counts(&mut self) {
        self.store.reset_counts();
        self.item_count = 0;
    }

    // ------------------------------------------------------------------
    // introspection
    // ------------------------------------------------------------------

    /// The bin store
    #[must_use]
    pub fn store(&self) -> &BinStore {
        &self.store
    }

    /// All bins in store order
    #[must_use]
    pub fn bins(&self) -> &[Bin] {
        self.store.bins()
    }

    /// Bin at `index`
    #[must_use]
    pub fn bin(&self, index: usize) -> Option<&Bin> {
        self.store.get(index)
    }

    /// Number of bins
    #[must_use]
    pub fn num_bins(&self) -> usize {
        self.store.len()
    }

    /// Dimension count, fixed by the first bin
    #[must_use]
    pub fn dims(&self) -> Option<usize> {
        self.store.dims()
    }

    /// Check if the model has no bins
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Number of `record` calls since the last clear or reset
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.item_count
    }

    /// Total illegal hits
    #[must_use]
    pub fn error_count(&self) -> i64 {
        -self
            .store
            .iter()
            .filter(|b| b.kind() == BinKind::Illegal && b.count() < 0)
            .map(Bin::count)
            .sum::<i64>()
    }

    /// Index cached by the last selection or first-match sample
    #[must_use]
    pub fn last_index(&self) -> Option<usize> {
        self.last_index
    }

    /// Region of the bin at [`last_index`](Self::last_index)
    #[must_use]
    pub fn last_region(&self) -> Option<&RangeSet> {
        self.last_index
            .and_then(|i| self.store.get(i))
            .map(Bin::region)
    }

    /// Point most recently produced by a point-selection call
    #[must_use]
    pub fn last_point(&self) -> Option<&[i64]> {
        self.last_point.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{gen_bin, gen_values, illegal_values, make_discrete, make_range};

    fn model_with(bins: BinList) -> CoverageModel {
        let mut model = CoverageModel::new();
        model.add_bins(&BinOptions::new(), bins).unwrap();
        model
    }

    #[test]
    fn test_record_counts_first_match() {
        let mut model = model_with(gen_bin(0, 9, 2));
        for v in [0, 1, 7] {
            model.record(&[v]).unwrap();
        }
        assert_eq!(model.bin(0).unwrap().count(), 2);
        assert_eq!(model.bin(1).unwrap().count(), 1);
        assert_eq!(model.item_count(), 3);
    }

    #[test]
    fn test_unmatched_sample_is_not_an_error() {
        let mut model = model_with(gen_values(&[1]));
        model.record(&[3]).unwrap();
        assert_eq!(model.bin(0).unwrap().count(), 0);
        assert_eq!(model.alerts().total(), 0);
    }

    #[test]
    fn test_point_dimension_mismatch_is_fatal() {
        let mut model = model_with(gen_values(&[1]));
        assert!(matches!(
            model.record(&[1, 2]),
            Err(CovError::DimensionMismatch { .. })
        ));
        assert_eq!(model.alerts().count(Severity::Fatal), 1);
    }

    #[test]
    fn test_record_on_empty_model_is_fatal() {
        let mut model = CoverageModel::new();
        assert!(matches!(model.record(&[1]), Err(CovError::EmptyModel { .. })));
    }

    #[test]
    fn test_illegal_hit_decrements_and_alerts() {
        let mut model = model_with(make_discrete(&[5], 0, 0, BinKind::Illegal));
        model.record(&[5]).unwrap();
        assert_eq!(model.bin(0).unwrap().count(), -1);
        assert_eq!(model.alerts().count(Severity::Error), 1);
        model.record(&[3]).unwrap();
        assert_eq!(model.bin(0).unwrap().count(), -1);
        assert_eq!(model.error_count(), 1);
    }

    #[test]
    fn test_illegal_modes() {
        let mut model = model_with(illegal_values(&[1]));
        model.set_illegal_mode(IllegalMode::Failure);
        model.record(&[1]).unwrap();
        assert_eq!(model.alerts().count(Severity::Failure), 1);
        model.set_illegal_mode(IllegalMode::Off);
        model.record(&[1]).unwrap();
        assert_eq!(model.alerts().total(), 1);
        assert_eq!(model.bin(0).unwrap().count(), -2);
    }

    #[test]
    fn test_add_bins_reconciles_goal_and_weight() {
        let mut bins = make_range(0, 1, 2, 3, 1, BinKind::Count);
        bins.extend(make_discrete(&[9], 7, 7, BinKind::Ignore));
        let mut model = CoverageModel::new();
        model
            .add_bins(&BinOptions::new().named("cp").at_least(2).weight(5), bins)
            .unwrap();
        let first = model.bin(0).unwrap();
        assert_eq!((first.goal(), first.weight(), first.name()), (3, 5, "cp"));
        let ignore = model.bin(2).unwrap();
        assert_eq!((ignore.goal(), ignore.weight()), (0, 0));
    }

    #[test]
    fn test_subset_drop_raises_error() {
        let mut model = CoverageModel::new();
        model.set_merging(true);
        model.add_bins(&BinOptions::new(), illegal_values(&[4])).unwrap();
        model.add_bins(&BinOptions::new(), illegal_values(&[4])).unwrap();
        assert_eq!(model.num_bins(), 1);
        assert_eq!(model.alerts().count(Severity::Error), 1);
    }

    #[test]
    fn test_empty_bin_list_is_a_no_op() {
        let mut model = CoverageModel::new();
        model.add_bins(&BinOptions::new(), BinList::new()).unwrap();
        assert!(model.is_empty());
        assert_eq!(model.dims(), None);
    }

    #[test]
    fn test_add_cross_dimension_mismatch_is_fatal() {
        let mut model = CoverageModel::new();
        model
            .add_cross(&BinOptions::new(), &[gen_values(&[1, 2]), gen_values(&[3])])
            .unwrap();
        let err = model
            .add_cross(
                &BinOptions::new(),
                &[gen_values(&[1]), gen_values(&[2]), gen_values(&[3])],
            )
            .unwrap_err();
        assert!(err.to_string().contains("different dimensions"));
        assert_eq!(model.num_bins(), 2);
    }

    #[test]
    fn test_mixed_dimension_list_inserts_nothing() {
        let mut bins = gen_values(&[1, 2]);
        bins.push(Bin::new(RangeSet::from_pairs(&[(0, 1), (0, 1)]), BinKind::Count, 1, 1));
        let mut model = CoverageModel::new();
        let err = model.add_bins(&BinOptions::new(), bins).unwrap_err();
        assert!(matches!(err, CovError::DimensionMismatch { expected: 1, actual: 2, .. }));
        assert!(model.is_empty());
        assert_eq!(model.dims(), None);
        assert_eq!(model.alerts().count(Severity::Fatal), 1);
    }

    #[test]
    fn test_list_must_match_existing_dimensions() {
        let mut model = model_with(gen_values(&[1]));
        let two_d = vec![Bin::new(RangeSet::from_pairs(&[(0, 1), (0, 1)]), BinKind::Count, 1, 1)];
        assert!(model.add_bins(&BinOptions::new(), two_d).is_err());
        assert_eq!(model.num_bins(), 1);
    }

    #[test]
    fn test_multi_line_message_is_stored_per_line() {
        let mut model = CoverageModel::new();
        model.add_message("line one\nline two");
        model.add_message("");
        assert_eq!(model.messages(), ["line one", "line two", ""]);
        model.set_message("only\r\nthis");
        assert_eq!(model.messages(), ["only", "this"]);
    }

    #[test]
    fn test_invalid_weight_scale_is_fatal() {
        let mut model = CoverageModel::new();
        assert!(model.set_weight_mode(WeightMode::RemainWeight, 0.25).is_err());
        assert_eq!(model.settings().weight_mode, WeightMode::AtLeast);
        assert_eq!(model.alerts().count(Severity::Fatal), 1);
        model.set_weight_mode(WeightMode::RemainWeight, 2.0).unwrap();
        assert_eq!(model.settings().weight_scale, 2.0);
    }

    #[test]
    fn test_clear_keeps_name_and_settings() {
        let mut model = CoverageModel::named("cp");
        model.set_merging(true);
        model.add_bins(&BinOptions::new(), gen_values(&[1])).unwrap();
        model.add_message("hello");
        model.record(&[1]).unwrap();
        model.clear();
        assert!(model.is_empty());
        assert!(model.messages().is_empty());
        assert_eq!(model.item_count(), 0);
        assert_eq!(model.name(), Some("cp"));
        assert!(model.settings().merging);
    }

    #[test]
    fn test_reset_counts_keeps_bins() {
        let mut model = model_with(gen_values(&[1, 2]));
        model.record(&[1]).unwrap();
        model.reset_counts();
        assert_eq!(model.num_bins(), 2);
        assert_eq!(model.bin(0).unwrap().count(), 0);
    }

    #[test]
    fn test_record_last_requires_selection() {
        let mut model = model_with(gen_values(&[1]));
        assert!(matches!(model.record_last(), Err(CovError::NoSelection)));
    }
}
