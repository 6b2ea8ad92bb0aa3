//! Coverage summaries and plain-text reports.

use crate::bin::BinKind;
use crate::model::CoverageModel;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Snapshot of a model's coverage state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageSummary {
    /// Model name as written to the database
    pub name: String,
    /// Total number of bins
    pub bins: usize,
    /// Number of count bins
    pub count_bins: usize,
    /// Count bins below the target
    pub holes: usize,
    /// Coverage percentage at the target
    pub percent: f64,
    /// Target percentage used for `holes` and `percent`
    pub target: f64,
    /// Total illegal hits
    pub error_count: i64,
    /// Samples recorded
    pub item_count: u64,
}

impl CoverageSummary {
    /// Check if every count bin reached the target
    #[must_use]
    pub const fn is_covered(&self) -> bool {
        self.holes == 0
    }
}

impl CoverageModel {
    /// Summary at `target` percent
    #[must_use]
    pub fn summary_at(&self, target: f64) -> CoverageSummary {
        CoverageSummary {
            name: self.display_name().to_string(),
            bins: self.num_bins(),
            count_bins: self.bins().iter().filter(|b| b.kind().is_count()).count(),
            holes: self.count_holes(target),
            percent: self.percent_covered(target),
            target,
            error_count: self.error_count(),
            item_count: self.item_count(),
        }
    }

    /// Summary at the model's target
    #[must_use]
    pub fn summary(&self) -> CoverageSummary {
        self.summary_at(self.cov_target())
    }
}

/// Plain-text report generator
#[derive(Debug)]
pub struct TextReport<'a> {
    model: &'a CoverageModel,
    target: f64,
}

impl<'a> TextReport<'a> {
    /// Report at the model's target
    #[must_use]
    pub fn new(model: &'a CoverageModel) -> Self {
        Self {
            model,
            target: model.cov_target(),
        }
    }

    /// Report at a different target
    #[must_use]
    pub const fn with_target(mut self, target: f64) -> Self {
        self.target = target;
        self
    }

    /// One-paragraph summary
    #[must_use]
    pub fn render_summary(&self) -> String {
        let s = self.model.summary_at(self.target);
        let mut out = String::new();
        let _ = writeln!(out, "model:    {}", s.name);
        let _ = writeln!(out, "bins:     {} ({} count)", s.bins, s.count_bins);
        let _ = writeln!(out, "coverage: {:.2}% (target {}%)", s.percent, s.target);
        let _ = writeln!(out, "holes:    {}", s.holes);
        let _ = writeln!(out, "errors:   {}", s.error_count);
        let _ = writeln!(out, "items:    {}", s.item_count);
        out
    }

    /// One line per count bin below the target
    #[must_use]
    pub fn render_holes(&self) -> String {
        let mut out = String::new();
        for index in self.model.holes(self.target) {
            if let Some(bin) = self.model.bin(index) {
                let _ = writeln!(
                    out,
                    "{index:>6}  {}  {}/{}  {:.2}%",
                    bin.region(),
                    bin.count(),
                    bin.goal(),
                    bin.percent()
                );
            }
        }
        out
    }

    /// One line per bin
    #[must_use]
    pub fn render_bins(&self) -> String {
        let mut out = String::new();
        for (index, bin) in self.model.bins().iter().enumerate() {
            let percent = match bin.kind() {
                BinKind::Count => format!("{:.2}%", bin.percent()),
                BinKind::Ignore | BinKind::Illegal => "-".to_string(),
            };
            let _ = write!(
                out,
                "{index:>6}  {:<7}  {}  count={} goal={} weight={} {percent}",
                bin.kind(),
                bin.region(),
                bin.count(),
                bin.goal(),
                bin.weight()
            );
            if !bin.name().is_empty() {
                let _ = write!(out, "  {}", bin.name());
            }
            out.push('\n');
        }
        out
    }
}
