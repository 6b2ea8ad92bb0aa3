//! Holes command handler

use super::{load_model, resolve_target};
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::Palette;
use crate::HolesArgs;
use covbin::{CoverageModel, TextReport};

/// Render the holes below `target`, or a note when there are none
pub fn render_holes(model: &CoverageModel, target: f64, palette: &Palette) -> String {
    let holes = TextReport::new(model).with_target(target).render_holes();
    if holes.is_empty() {
        palette.dim(&format!("no holes below {target}%"))
    } else {
        holes.trim_end().to_string()
    }
}

/// Execute the holes command
pub fn execute_holes(config: &CliConfig, args: &HolesArgs) -> CliResult<()> {
    let model = load_model(&args.database)?;
    let target = resolve_target(&model, args.target)?;
    if !config.verbosity.is_quiet() {
        let palette = Palette::new(config.color.should_color());
        println!("{}", render_holes(&model, target, &palette));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::fixtures::write_sample;

    #[test]
    fn test_holes_listed() {
        let dir = tempfile::tempdir().unwrap();
        let model = load_model(&write_sample(dir.path(), "s.cov")).unwrap();
        let text = render_holes(&model, 100.0, &Palette::new(false));
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("(2)"));
        assert!(text.contains("(3)"));
    }

    #[test]
    fn test_no_holes_note() {
        let mut model = CoverageModel::new();
        model
            .add_bins(&covbin::BinOptions::new(), covbin::gen_values(&[4]))
            .unwrap();
        model.record(&[4]).unwrap();
        let text = render_holes(&model, 100.0, &Palette::new(false));
        assert_eq!(text, "no holes below 100%");
    }
}
