//! Model configuration.
//!
//! [`ModelSettings`] carries every model-level policy. It deserializes from
//! YAML or JSON with missing fields defaulted, so a settings file only needs
//! the keys it changes:
//!
//! ```yaml
//! weight_mode: remain_weight
//! weight_scale: 2.0
//! threshold: 5.0
//! merging: true
//! ```

use crate::result::{CovError, CovResult};
use serde::{Deserialize, Serialize};

/// How random selection weights eligible bins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightMode {
    /// Weight is the bin's goal
    #[default]
    AtLeast,
    /// Weight is the bin's weight
    Weight,
    /// Weight is the number of hits still needed
    Remain,
    /// Remaining hits raised to the scale, times the bin's weight
    RemainExp,
    /// Remaining hits against a scaled goal
    RemainScaled,
    /// Remaining hits against a scaled goal, times the bin's weight
    RemainWeight,
}

impl WeightMode {
    /// All modes in database ordinal order
    pub const ALL: [Self; 6] = [
        Self::AtLeast,
        Self::Weight,
        Self::Remain,
        Self::RemainExp,
        Self::RemainScaled,
        Self::RemainWeight,
    ];

    /// Check if the mode uses the weight scale
    #[must_use]
    pub const fn uses_scale(self) -> bool {
        matches!(self, Self::RemainExp | Self::RemainScaled | Self::RemainWeight)
    }
}

/// What an illegal-bin hit reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IllegalMode {
    /// Report an error
    #[default]
    On,
    /// Report a failure
    Failure,
    /// Count silently
    Off,
}

impl IllegalMode {
    /// All modes in database ordinal order
    pub const ALL: [Self; 3] = [Self::On, Self::Failure, Self::Off];
}

/// Which bins a sample increments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMode {
    /// Only the first matching bin
    #[default]
    First,
    /// Every matching bin
    All,
}

impl CountMode {
    /// All modes in database ordinal order
    pub const ALL: [Self; 2] = [Self::First, Self::All];
}

/// Index selection policy for [`next_index`](crate::CoverageModel::next_index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectMode {
    /// Weighted random among eligible bins
    #[default]
    Random,
    /// Round-robin over all bins
    Increment,
    /// Least-covered count bin
    Minimum,
}

/// Position of `value` in `all`
pub(crate) fn ordinal<T: PartialEq>(all: &[T], value: &T) -> usize {
    all.iter().position(|v| v == value).unwrap_or(0)
}

/// Model-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Random selection weighting
    pub weight_mode: WeightMode,
    /// Scale used by the remain-scaled modes
    pub weight_scale: f64,
    /// Illegal hit reporting
    pub illegal_mode: IllegalMode,
    /// First-match or all-match counting
    pub count_mode: CountMode,
    /// Enable thresholding in random selection
    pub thresholding: bool,
    /// How far above the least-covered bin a bin may be and still be chosen
    pub threshold: f64,
    /// Merge identical bins on insertion
    pub merging: bool,
    /// Coverage goal as a percentage of each bin's goal
    pub cov_target: f64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            weight_mode: WeightMode::AtLeast,
            weight_scale: 1.0,
            illegal_mode: IllegalMode::On,
            count_mode: CountMode::First,
            thresholding: false,
            threshold: 45.0,
            merging: false,
            cov_target: 100.0,
        }
    }
}

impl ModelSettings {
    /// Create default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set weight mode and scale
    #[must_use]
    pub const fn with_weight_mode(mut self, mode: WeightMode, scale: f64) -> Self {
        self.weight_mode = mode;
        self.weight_scale = scale;
        self
    }

    /// Set illegal mode
    #[must_use]
    pub const fn with_illegal_mode(mut self, mode: IllegalMode) -> Self {
        self.illegal_mode = mode;
        self
    }

    /// Set count mode
    #[must_use]
    pub const fn with_count_mode(mut self, mode: CountMode) -> Self {
        self.count_mode = mode;
        self
    }

    /// Enable thresholding at `percent`
    #[must_use]
    pub const fn with_threshold(mut self, percent: f64) -> Self {
        self.thresholding = true;
        self.threshold = percent;
        self
    }

    /// Enable or disable merging
    #[must_use]
    pub const fn with_merging(mut self, merging: bool) -> Self {
        self.merging = merging;
        self
    }

    /// Set coverage target
    #[must_use]
    pub const fn with_cov_target(mut self, percent: f64) -> Self {
        self.cov_target = percent;
        self
    }

    /// Check the settings for values the selector cannot work with
    pub fn validate(&self) -> CovResult<()> {
        validate_weight_mode(self.weight_mode, self.weight_scale)?;
        validate_threshold(self.threshold)?;
        validate_target(self.cov_target)
    }

    /// Parse settings from YAML
    pub fn from_yaml_str(text: &str) -> CovResult<Self> {
        let settings: Self = serde_yaml_ng::from_str(text).map_err(|e| CovError::Settings {
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from JSON
    pub fn from_json_str(text: &str) -> CovResult<Self> {
        let settings: Self = serde_json::from_str(text).map_err(|e| CovError::Settings {
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }
}

pub(crate) fn validate_weight_mode(mode: WeightMode, scale: f64) -> CovResult<()> {
    if mode.uses_scale() && !(scale.is_finite() && scale >= 1.0) {
        return Err(CovError::invalid_setting(format!(
            "weight scale {scale} must be at least 1.0 for {mode:?}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_threshold(percent: f64) -> CovResult<()> {
    if !(percent.is_finite() && percent >= 0.0) {
        return Err(CovError::invalid_setting(format!(
            "threshold {percent} must be a non-negative percentage"
        )));
    }
    Ok(())
}

pub(crate) fn validate_target(percent: f64) -> CovResult<()> {
    if !(percent.is_finite() && percent > 0.0) {
        return Err(CovError::invalid_setting(format!(
            "coverage target {percent} must be a positive percentage"
        )));
    }
    Ok(())
}

/// Options for [`add_bins`](crate::CoverageModel::add_bins) and
/// [`add_cross`](crate::CoverageModel::add_cross)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinOptions {
    /// Name given to every added bin; `None` keeps each bin's own name
    pub name: Option<String>,
    /// Minimum goal for added count bins
    pub at_least: i64,
    /// Minimum weight for added count bins
    pub weight: i64,
}

impl BinOptions {
    /// Options that keep each bin's own name, goal and weight
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Name the added bins
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the minimum goal
    #[must_use]
    pub const fn at_least(mut self, goal: i64) -> Self {
        self.at_least = goal;
        self
    }

    /// Set the minimum weight
    #[must_use]
    pub const fn weight(mut self, weight: i64) -> Self {
        self.weight = weight;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = ModelSettings::default();
        assert_eq!(s.weight_mode, WeightMode::AtLeast);
        assert_eq!(s.cov_target, 100.0);
        assert!(!s.merging);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_yaml_partial_settings() {
        let s = ModelSettings::from_yaml_str("weight_mode: remain_weight\nweight_scale: 2.0\nmerging: true\n")
            .unwrap();
        assert_eq!(s.weight_mode, WeightMode::RemainWeight);
        assert_eq!(s.weight_scale, 2.0);
        assert!(s.merging);
        assert_eq!(s.count_mode, CountMode::First);
    }

    #[test]
    fn test_json_settings() {
        let s = ModelSettings::from_json_str(r#"{"count_mode":"all","cov_target":90.0}"#).unwrap();
        assert_eq!(s.count_mode, CountMode::All);
        assert_eq!(s.cov_target, 90.0);
    }

    #[test]
    fn test_invalid_scale_rejected() {
        let s = ModelSettings::new().with_weight_mode(WeightMode::RemainScaled, 0.5);
        assert!(matches!(s.validate(), Err(CovError::InvalidSetting { .. })));
        let ok = ModelSettings::new().with_weight_mode(WeightMode::Remain, 0.5);
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_invalid_target_rejected() {
        assert!(ModelSettings::from_json_str(r#"{"cov_target":0.0}"#).is_err());
        assert!(ModelSettings::from_yaml_str("threshold: -1.0").is_err());
    }

    #[test]
    fn test_ordinals_follow_declaration_order() {
        assert_eq!(ordinal(&WeightMode::ALL, &WeightMode::RemainExp), 3);
        assert_eq!(ordinal(&IllegalMode::ALL, &IllegalMode::Off), 2);
        assert_eq!(ordinal(&CountMode::ALL, &CountMode::All), 1);
    }

    #[test]
    fn test_bin_options_builder() {
        let opts = BinOptions::new().named("cp").at_least(3).weight(2);
        assert_eq!(opts.name.as_deref(), Some("cp"));
        assert_eq!((opts.at_least, opts.weight), (3, 2));
    }
}
