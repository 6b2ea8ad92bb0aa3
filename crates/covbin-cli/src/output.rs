//! Terminal styling

use console::Style;

/// Styles for report lines, disabled when color is off
#[derive(Debug, Clone)]
pub struct Palette {
    good: Style,
    bad: Style,
    dim: Style,
}

impl Palette {
    /// Create a palette; `use_color` forces styling on or off
    #[must_use]
    pub fn new(use_color: bool) -> Self {
        Self {
            good: Style::new().green().bold().force_styling(use_color),
            bad: Style::new().red().bold().force_styling(use_color),
            dim: Style::new().dim().force_styling(use_color),
        }
    }

    /// Style a line by coverage outcome
    #[must_use]
    pub fn outcome(&self, covered: bool, text: &str) -> String {
        if covered {
            self.good.apply_to(text).to_string()
        } else {
            self.bad.apply_to(text).to_string()
        }
    }

    /// De-emphasize a line
    #[must_use]
    pub fn dim(&self, text: &str) -> String {
        self.dim.apply_to(text).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_palette_leaves_text_alone() {
        let palette = Palette::new(false);
        assert_eq!(palette.outcome(true, "ok"), "ok");
        assert_eq!(palette.dim("x"), "x");
    }

    #[test]
    fn test_colored_palette_adds_escapes() {
        let palette = Palette::new(true);
        assert!(palette.outcome(false, "bad").contains('\u{1b}'));
    }
}
