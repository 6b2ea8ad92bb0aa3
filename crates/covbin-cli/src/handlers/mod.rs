//! Command handlers
//!
//! Each handler module contains the execution logic for one command plus
//! the pure rendering helpers it prints.

pub mod bins;
pub mod holes;
pub mod merge;
pub mod summary;

pub use bins::{execute_bins, render_bins};
pub use holes::{execute_holes, render_holes};
pub use merge::{execute_merge, merge_databases};
pub use summary::{execute_summary, render_summary};

use crate::error::{CliError, CliResult};
use covbin::CoverageModel;
use std::path::Path;

/// Load a database into a fresh model
pub fn load_model(path: &Path) -> CliResult<CoverageModel> {
    let mut model = CoverageModel::new();
    model.read_database(path, false)?;
    tracing::debug!(path = %path.display(), bins = model.num_bins(), "database loaded");
    Ok(model)
}

/// Resolve `--target`, defaulting to the model's own target
pub fn resolve_target(model: &CoverageModel, target: Option<f64>) -> CliResult<f64> {
    match target {
        None => Ok(model.cov_target()),
        Some(t) if t.is_finite() && t > 0.0 => Ok(t),
        Some(t) => Err(CliError::invalid_argument(format!(
            "target {t} must be a positive percentage"
        ))),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_model_missing_file() {
        let err = load_model(Path::new("/nonexistent/covbin.cov")).unwrap_err();
        assert!(matches!(err, CliError::Coverage(covbin::CovError::Io(_))));
    }

    #[test]
    fn test_resolve_target() {
        let model = CoverageModel::new();
        assert_eq!(resolve_target(&model, None).unwrap(), 100.0);
        assert_eq!(resolve_target(&model, Some(50.0)).unwrap(), 50.0);
        assert!(resolve_target(&model, Some(0.0)).is_err());
        assert!(resolve_target(&model, Some(f64::NAN)).is_err());
    }

    #[test]
    fn test_fixture_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixtures::write_sample(dir.path(), "s.cov");
        let model = load_model(&path).unwrap();
        assert_eq!(model.num_bins(), 4);
        assert_eq!(model.name(), Some("sample"));
    }
}
