//! Bins command handler

use super::load_model;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::BinsArgs;
use covbin::{CoverageModel, TextReport};

/// Render one line per bin
pub fn render_bins(model: &CoverageModel) -> String {
    TextReport::new(model).render_bins().trim_end().to_string()
}

/// Execute the bins command
pub fn execute_bins(config: &CliConfig, args: &BinsArgs) -> CliResult<()> {
    let model = load_model(&args.database)?;
    if !config.verbosity.is_quiet() {
        println!("{}", render_bins(&model));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::fixtures::write_sample;

    #[test]
    fn test_every_bin_listed() {
        let dir = tempfile::tempdir().unwrap();
        let model = load_model(&write_sample(dir.path(), "s.cov")).unwrap();
        let text = render_bins(&model);
        assert_eq!(text.lines().count(), 4);
        assert!(text.lines().last().unwrap().contains("illegal"));
    }
}
