//! Summary command handler

use super::{load_model, resolve_target};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::Palette;
use crate::SummaryArgs;
use covbin::{CoverageModel, TextReport};

/// Render the summary as text or JSON
pub fn render_summary(
    model: &CoverageModel,
    target: f64,
    json: bool,
    palette: &Palette,
) -> CliResult<String> {
    if json {
        return serde_json::to_string_pretty(&model.summary_at(target))
            .map_err(|e| CliError::report_generation(e.to_string()));
    }
    let covered = model.is_covered_at(target);
    let status = if covered { "COVERED" } else { "NOT COVERED" };
    let mut out = TextReport::new(model).with_target(target).render_summary();
    out.push_str(&palette.outcome(covered, status));
    Ok(out)
}

/// Execute the summary command
pub fn execute_summary(config: &CliConfig, args: &SummaryArgs) -> CliResult<()> {
    let model = load_model(&args.database)?;
    let target = resolve_target(&model, args.target)?;

    if !config.verbosity.is_quiet() || args.json {
        let palette = Palette::new(config.color.should_color() && !args.json);
        println!("{}", render_summary(&model, target, args.json, &palette)?);
    }

    if args.check {
        let holes = model.count_holes(target);
        if holes > 0 {
            return Err(CliError::NotCovered { holes, target });
        }
    }
    Ok(())
}
