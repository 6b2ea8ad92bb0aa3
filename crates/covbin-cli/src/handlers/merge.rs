//! Merge command handler

use super::load_model;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::MergeArgs;
use covbin::CoverageSummary;
use std::path::{Path, PathBuf};

/// Merge `inputs` in order and write the result to `output`
pub fn merge_databases(inputs: &[PathBuf], output: &Path) -> CliResult<CoverageSummary> {
    let Some((first, rest)) = inputs.split_first() else {
        return Err(CliError::invalid_argument("merge needs at least one database"));
    };
    let mut model = load_model(first)?;
    for path in rest {
        model.read_database(path, true)?;
        tracing::debug!(path = %path.display(), bins = model.num_bins(), "database merged");
    }
    model.write_database(output)?;
    Ok(model.summary())
}

/// Execute the merge command
pub fn execute_merge(config: &CliConfig, args: &MergeArgs) -> CliResult<()> {
    let summary = merge_databases(&args.databases, &args.output)?;
    if !config.verbosity.is_quiet() {
        println!(
            "Merged {} database(s) into {}: {} bins, {:.2}% covered",
            args.databases.len(),
            args.output.display(),
            summary.bins,
            summary.percent
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::fixtures::write_sample;

    #[test]
    fn test_merge_adds_counts() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_sample(dir.path(), "a.cov");
        let b = write_sample(dir.path(), "b.cov");
        let out = dir.path().join("out.cov");

        let summary = merge_databases(&[a, b], &out).unwrap();
        assert_eq!(summary.bins, 4);
        assert_eq!(summary.error_count, 2);

        let merged = load_model(&out).unwrap();
        assert_eq!(merged.bin(0).unwrap().count(), 2);
        assert_eq!(merged.name(), Some("sample"));
    }

    #[test]
    fn test_merge_without_inputs() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            merge_databases(&[], &dir.path().join("out.cov")),
            Err(CliError::InvalidArgument { .. })
        ));
    }
}
