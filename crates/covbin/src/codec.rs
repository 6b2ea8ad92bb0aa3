//! Coverage database persistence.
//!
//! One model per document, line oriented:
//!
//! ```text
//! <model name | Coverage_Model_Not_Named>
//! <seed> <threshold> <illegal mode> <weight mode> <weight scale> <count mode> <thresholding> <target> <merging>
//! <message count>
//! <message line> ...
//! <dimension count> <bin count>
//! <kind> <count> <goal> <weight> <percent> <min1> <max1> ... <name length> <name>
//! ...
//! ```
//!
//! Modes are written as ordinals, booleans as `TRUE`/`FALSE`, and bin kinds
//! as their signed hit unit (1 count, 0 ignore, -1 illegal). The name is
//! always the first line, taken verbatim. After it, blank lines and lines
//! starting with `#` are skipped everywhere except inside the message block.

use crate::bin::{Bin, BinKind};
use crate::config::{ordinal, CountMode, IllegalMode, ModelSettings, WeightMode};
use crate::model::{CoverageModel, UNNAMED_MODEL};
use crate::range::{Range, RangeSet};
use crate::result::{CovError, CovResult};
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

const COMMENT_MARKER: char = '#';

/// Parsed contents of a coverage database
#[derive(Debug, Clone, PartialEq)]
pub struct Database {
    /// Model name; `None` for the unnamed marker
    pub name: Option<String>,
    /// Random state
    pub seed: u64,
    /// Model settings
    pub settings: ModelSettings,
    /// Message lines
    pub messages: Vec<String>,
    /// Dimension count shared by all bins
    pub dims: usize,
    /// Bins in store order
    pub bins: Vec<Bin>,
}

impl Database {
    /// Parse a database document
    pub fn parse(text: &str) -> CovResult<Self> {
        let mut lines = LineReader::new(text);

        let name_line = lines.raw("name")?;
        let name = match name_line {
            UNNAMED_MODEL => None,
            other => Some(other.to_string()),
        };

        let mut f = lines.fields("settings")?;
        let seed = f.parse::<u64>("seed")?;
        let threshold = f.parse::<f64>("threshold")?;
        let illegal_mode = f.ordinal(&IllegalMode::ALL, "illegalMode")?;
        let weight_mode = f.ordinal(&WeightMode::ALL, "weightMode")?;
        let weight_scale = f.parse::<f64>("weightScale")?;
        let count_mode = f.ordinal(&CountMode::ALL, "countMode")?;
        let thresholding = f.boolean("thresholdingEnabled")?;
        let cov_target = f.parse::<f64>("targetPercent")?;
        let merging = f.boolean("mergingEnabled")?;
        let settings = ModelSettings {
            weight_mode,
            weight_scale,
            illegal_mode,
            count_mode,
            thresholding,
            threshold,
            merging,
            cov_target,
        };

        let message_count = lines.fields("messageCount")?.parse::<usize>("messageCount")?;
        let mut messages = Vec::with_capacity(message_count.min(1024));
        for _ in 0..message_count {
            messages.push(lines.raw("message")?.to_string());
        }

        let mut f = lines.fields("dimensionCount")?;
        let dims = f.positive("dimensionCount")?;
        let bin_count = f.positive("binCount")?;

        let mut bins = Vec::with_capacity(bin_count.min(1 << 16));
        for _ in 0..bin_count {
            bins.push(parse_bin(&mut lines, dims)?);
        }

        Ok(Self {
            name,
            seed,
            settings,
            messages,
            dims,
            bins,
        })
    }
}

fn parse_bin(lines: &mut LineReader<'_>, dims: usize) -> CovResult<Bin> {
    let mut f = lines.fields("bin")?;
    let unit = f.parse::<i64>("kind")?;
    let kind = BinKind::from_unit(unit).ok_or_else(|| f.error("kind", format!("unknown bin kind {unit}")))?;
    let count = f.parse::<i64>("count")?;
    let goal = f.parse::<i64>("goal")?;
    let weight = f.parse::<i64>("weight")?;
    let _percent = f.parse::<f64>("percentCovered")?;
    let mut ranges = Vec::with_capacity(dims);
    for _ in 0..dims {
        let min = f.parse::<i64>("min")?;
        let max = f.parse::<i64>("max")?;
        ranges.push(Range::new(min, max));
    }
    let name_len = f.parse::<usize>("nameLength")?;
    let name = f.name(name_len)?;
    Ok(Bin::new(RangeSet::new(ranges), kind, goal, weight)
        .with_count(count)
        .with_name(name))
}

struct LineReader<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> LineReader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
        }
    }

    fn eof(field: &'static str) -> CovError {
        CovError::Parse {
            line: 0,
            field,
            detail: "unexpected end of input".to_string(),
        }
    }

    /// Next line that is neither blank nor a comment
    fn meaningful(&mut self, field: &'static str) -> CovResult<(usize, &'a str)> {
        for (i, line) in self.lines.by_ref() {
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER) {
                continue;
            }
            return Ok((i + 1, line));
        }
        Err(Self::eof(field))
    }

    fn raw(&mut self, field: &'static str) -> CovResult<&'a str> {
        self.lines.next().map(|(_, l)| l).ok_or_else(|| Self::eof(field))
    }

    fn fields(&mut self, field: &'static str) -> CovResult<Fields<'a>> {
        let (line, rest) = self.meaningful(field)?;
        Ok(Fields { line, rest })
    }
}

struct Fields<'a> {
    line: usize,
    rest: &'a str,
}

impl<'a> Fields<'a> {
    fn error(&self, field: &'static str, detail: impl Into<String>) -> CovError {
        CovError::Parse {
            line: self.line,
            field,
            detail: detail.into(),
        }
    }

    fn token(&mut self, field: &'static str) -> CovResult<&'a str> {
        let trimmed = self.rest.trim_start();
        if trimmed.is_empty() {
            return Err(self.error(field, "missing field"));
        }
        let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
        let (token, rest) = trimmed.split_at(end);
        self.rest = rest;
        Ok(token)
    }

    fn parse<T>(&mut self, field: &'static str) -> CovResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let token = self.token(field)?;
        token
            .parse::<T>()
            .map_err(|e| self.error(field, format!("{token:?}: {e}")))
    }

    fn positive(&mut self, field: &'static str) -> CovResult<usize> {
        let value = self.parse::<i64>(field)?;
        if value <= 0 {
            return Err(self.error(field, format!("{value} must be positive")));
        }
        usize::try_from(value).map_err(|e| self.error(field, e.to_string()))
    }

    fn boolean(&mut self, field: &'static str) -> CovResult<bool> {
        let token = self.token(field)?;
        if token.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if token.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(self.error(field, format!("{token:?} is not TRUE or FALSE")))
        }
    }

    fn ordinal<T: Copy>(&mut self, all: &[T], field: &'static str) -> CovResult<T> {
        let value = self.parse::<usize>(field)?;
        all.get(value)
            .copied()
            .ok_or_else(|| self.error(field, format!("ordinal {value} out of range")))
    }

    /// Exactly `len` characters after one separating space
    fn name(&mut self, len: usize) -> CovResult<String> {
        if len == 0 {
            return Ok(String::new());
        }
        let Some(rest) = self.rest.strip_prefix(' ') else {
            return Err(self.error("name", "missing separator before name"));
        };
        let name: String = rest.chars().take(len).collect();
        if name.chars().count() < len {
            return Err(self.error("name", format!("expected {len} characters")));
        }
        Ok(name)
    }
}

const fn bool_text(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}

impl CoverageModel {
    fn render_db(&self) -> String {
        let s = &self.settings;
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.display_name());
        let _ = writeln!(
            out,
            "{} {} {} {} {} {} {} {} {}",
            self.seed(),
            s.threshold,
            ordinal(&IllegalMode::ALL, &s.illegal_mode),
            ordinal(&WeightMode::ALL, &s.weight_mode),
            s.weight_scale,
            ordinal(&CountMode::ALL, &s.count_mode),
            bool_text(s.thresholding),
            s.cov_target,
            bool_text(s.merging),
        );

        let _ = writeln!(out, "{}", self.messages.len());
        for message in &self.messages {
            let _ = writeln!(out, "{message}");
        }

        let _ = writeln!(out, "{} {}", self.store.dims().unwrap_or(0), self.store.len());
        for bin in &self.store {
            let _ = write!(
                out,
                "{} {} {} {} {}",
                bin.kind().unit(),
                bin.count(),
                bin.goal(),
                bin.weight(),
                bin.percent()
            );
            for range in bin.region().ranges() {
                let _ = write!(out, " {} {}", range.min, range.max);
            }
            let name_len = bin.name().chars().count();
            if name_len == 0 {
                let _ = writeln!(out, " 0");
            } else {
                let _ = writeln!(out, " {name_len} {}", bin.name());
            }
        }
        out
    }

    /// Serialize the model as a database document
    pub fn write_db_string(&mut self) -> CovResult<String> {
        if self.store.is_empty() {
            let err = CovError::empty_model("cannot write a database for a model without bins");
            return Err(self.fatal(err));
        }
        Ok(self.render_db())
    }

    /// Write the database document to `out`
    pub fn write_db<W: io::Write>(&mut self, out: &mut W) -> CovResult<()> {
        let text = self.write_db_string()?;
        out.write_all(text.as_bytes()).map_err(|e| self.fatal(e.into()))
    }

    /// Write the database to a file
    pub fn write_database(&mut self, path: impl AsRef<Path>) -> CovResult<()> {
        let path = path.as_ref();
        let text = self.write_db_string()?;
        fs::write(path, text).map_err(|e| self.fatal(e.into()))?;
        tracing::debug!(path = %path.display(), bins = self.store.len(), "coverage database written");
        Ok(())
    }

    /// Read a database file; see [`read_db_str`](Self::read_db_str)
    pub fn read_database(&mut self, path: impl AsRef<Path>, merge: bool) -> CovResult<()> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| self.fatal(e.into()))?;
        self.read_db_str(&text, merge)?;
        tracing::debug!(path = %path.display(), merge, bins = self.store.len(), "coverage database read");
        Ok(())
    }

    /// Load a database document.
    ///
    /// Without `merge` the model is cleared first and then takes the name,
    /// settings, random state, messages and bins of the document. With
    /// `merge` the model keeps its settings; each document bin identical to
    /// an existing bin (region, kind, goal, weight, name) adds its count, and
    /// the others are appended.
    pub fn read_db_str(&mut self, text: &str, merge: bool) -> CovResult<()> {
        if !merge {
            self.clear();
        }
        let db = Database::parse(text).map_err(|e| self.fatal(e))?;
        if merge {
            self.merge_db(db)
        } else {
            self.load_db(db)
        }
    }

    fn load_db(&mut self, db: Database) -> CovResult<()> {
        db.settings.validate().map_err(|e| self.fatal(e))?;
        match &db.name {
            Some(name) => self.set_name(name),
            None => self.name = None,
        }
        self.settings = db.settings;
        self.restore_seed(db.seed);
        self.messages = db.messages;
        self.store.reserve_total(db.bins.len());
        for bin in db.bins {
            self.store.push(bin).map_err(|e| self.fatal(e))?;
        }
        Ok(())
    }

    fn merge_db(&mut self, db: Database) -> CovResult<()> {
        if let Some(dims) = self.store.dims() {
            if dims != db.dims {
                let err = CovError::dimension_mismatch(dims, db.dims, "database merge");
                return Err(self.fatal(err));
            }
        }
        for message in db.messages {
            if !self.messages.contains(&message) {
                self.messages.push(message);
            }
        }
        for bin in db.bins {
            match self.store.find_exact(&bin) {
                Some(index) => {
                    if let Some(existing) = self.store.get_mut(index) {
                        existing.add_count(bin.count());
                    }
                }
                None => {
                    self.store.push(bin).map_err(|e| self.fatal(e))?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::Severity;
    use crate::config::BinOptions;
    use crate::generate::{gen_bin, gen_values, illegal_values, make_range};

    fn sample_model() -> CoverageModel {
        let mut model = CoverageModel::named("alu");
        model.set_count_mode(CountMode::All);
        model.set_weight_mode(WeightMode::RemainWeight, 2.5).unwrap();
        model.set_threshold(Some(12.5)).unwrap();
        model.add_message("first message");
        model.add_message("second # not a comment");
        model
            .add_cross(
                &BinOptions::new().named("op x a"),
                &[gen_values(&[1, 2]), gen_bin(0, 7, 2)],
            )
            .unwrap();
        let mut excluded = illegal_values(&[9]);
        excluded.extend(make_range(9, 9, 1, 0, 0, BinKind::Ignore));
        model
            .add_cross(&BinOptions::new(), &[excluded, gen_values(&[0])])
            .unwrap();
        for p in [[1, 0], [1, 3], [2, 7], [9, 0]] {
            model.record(&p).unwrap();
        }
        model
    }

    #[test]
    fn test_write_then_read_reproduces_model() {
        let mut original = sample_model();
        let text = original.write_db_string().unwrap();

        let mut copy = CoverageModel::new();
        copy.read_db_str(&text, false).unwrap();

        assert_eq!(copy.name(), Some("alu"));
        assert_eq!(copy.settings(), original.settings());
        assert_eq!(copy.seed(), original.seed());
        assert_eq!(copy.messages(), original.messages());
        assert_eq!(copy.dims(), Some(2));
        assert_eq!(copy.bins(), original.bins());
    }

    #[test]
    fn test_document_layout() {
        let mut model = CoverageModel::new();
        model
            .add_bins(&BinOptions::new(), make_range(0, 9, 1, 4, 1, BinKind::Count))
            .unwrap();
        model.restore_seed(7);
        model.record(&[3]).unwrap();
        let text = model.write_db_string().unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], UNNAMED_MODEL);
        assert_eq!(lines[1], "7 45 0 0 1 0 FALSE 100 FALSE");
        assert_eq!(lines[2], "0");
        assert_eq!(lines[3], "1 1");
        assert_eq!(lines[4], "1 1 4 1 25 0 9 0");
    }

    #[test]
    fn test_names_with_spaces_round_trip() {
        let mut model = CoverageModel::new();
        model
            .add_bins(&BinOptions::new().named("  spaced  name "), gen_values(&[4]))
            .unwrap();
        let text = model.write_db_string().unwrap();
        let mut copy = CoverageModel::new();
        copy.read_db_str(&text, false).unwrap();
        assert_eq!(copy.bin(0).unwrap().name(), "  spaced  name ");
        assert_eq!(copy.name(), None);
    }

    #[test]
    fn test_comment_like_and_empty_model_names_round_trip() {
        for name in ["#top.cov", "", "  # padded"] {
            let mut model = CoverageModel::named(name);
            model.add_bins(&BinOptions::new(), gen_values(&[1])).unwrap();
            let text = model.write_db_string().unwrap();

            let mut copy = CoverageModel::new();
            copy.read_db_str(&text, false).unwrap();
            assert_eq!(copy.name(), Some(name));
            assert_eq!(copy.bins(), model.bins());
        }
    }

    #[test]
    fn test_multi_line_messages_round_trip() {
        let mut model = CoverageModel::new();
        model.add_message("line one\nline two");
        model.add_message("");
        model.add_message("# kept");
        model.add_bins(&BinOptions::new(), gen_values(&[1])).unwrap();
        let text = model.write_db_string().unwrap();

        let mut copy = CoverageModel::new();
        copy.read_db_str(&text, false).unwrap();
        assert_eq!(copy.messages(), model.messages());
        assert_eq!(copy.messages().len(), 4);
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let text = "cp\n# header\n\n1 45 0 0 1 0 false 100 true\n0\n# bins\n1 2\n\n1 3 1 1 300 4 4 0\n0 0 0 0 100 5 5 2 ig\n";
        let mut model = CoverageModel::new();
        model.read_db_str(text, false).unwrap();
        assert_eq!(model.name(), Some("cp"));
        assert!(model.settings().merging);
        assert_eq!(model.num_bins(), 2);
        assert_eq!(model.bin(0).unwrap().count(), 3);
        assert_eq!(model.bin(1).unwrap().kind(), BinKind::Ignore);
        assert_eq!(model.bin(1).unwrap().name(), "ig");
    }

    #[test]
    fn test_corrupt_bin_count_without_merge_leaves_model_cleared() {
        let mut source = CoverageModel::named("src");
        source.add_bins(&BinOptions::new(), gen_values(&[1, 2])).unwrap();
        let text = source.write_db_string().unwrap().replace("\n1 2\n", "\n1 two\n");

        let mut target = CoverageModel::named("dst");
        target.add_bins(&BinOptions::new(), gen_values(&[5])).unwrap();
        target.add_message("kept?");
        let err = target.read_db_str(&text, false).unwrap_err();

        assert!(matches!(err, CovError::Parse { field: "binCount", .. }));
        assert!(target.is_empty());
        assert!(target.messages().is_empty());
        assert_eq!(target.alerts().count(Severity::Fatal), 1);
    }

    #[test]
    fn test_corrupt_bin_count_with_merge_leaves_model_untouched() {
        let mut source = CoverageModel::new();
        source.add_bins(&BinOptions::new(), gen_values(&[1, 2])).unwrap();
        let text = source.write_db_string().unwrap().replace("\n1 2\n", "\n1 two\n");

        let mut target = CoverageModel::new();
        target.add_bins(&BinOptions::new(), gen_values(&[1, 2])).unwrap();
        target.record(&[1]).unwrap();
        let before: Vec<Bin> = target.bins().to_vec();
        assert!(target.read_db_str(&text, true).is_err());
        assert_eq!(target.bins(), before.as_slice());
    }

    #[test]
    fn test_merge_adds_counts_of_identical_bins() {
        let mut a = CoverageModel::new();
        a.add_bins(&BinOptions::new(), gen_values(&[1, 2])).unwrap();
        a.record(&[1]).unwrap();
        a.record(&[2]).unwrap();
        let text = a.write_db_string().unwrap();

        let mut b = CoverageModel::new();
        b.add_bins(&BinOptions::new(), gen_values(&[1, 3])).unwrap();
        b.record(&[1]).unwrap();
        b.read_db_str(&text, true).unwrap();

        assert_eq!(b.num_bins(), 3);
        assert_eq!(b.bin(0).unwrap().count(), 2);
        assert_eq!(b.bin(1).unwrap().count(), 0);
        assert_eq!(b.bin(2).unwrap().region(), &RangeSet::single(2, 2));
        assert_eq!(b.bin(2).unwrap().count(), 1);
    }

    #[test]
    fn test_merge_dimension_mismatch_is_fatal() {
        let mut a = CoverageModel::new();
        a.add_cross(&BinOptions::new(), &[gen_values(&[1]), gen_values(&[2])]).unwrap();
        let text = a.write_db_string().unwrap();
        let mut b = CoverageModel::new();
        b.add_bins(&BinOptions::new(), gen_values(&[1])).unwrap();
        assert!(matches!(
            b.read_db_str(&text, true),
            Err(CovError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_empty_model_cannot_be_written() {
        let mut model = CoverageModel::new();
        assert!(matches!(model.write_db_string(), Err(CovError::EmptyModel { .. })));
        assert_eq!(model.alerts().count(Severity::Fatal), 1);
    }

    #[test]
    fn test_zero_bins_cannot_be_read() {
        let text = "cp\n1 45 0 0 1 0 FALSE 100 FALSE\n0\n1 0\n";
        let mut model = CoverageModel::new();
        assert!(matches!(
            model.read_db_str(text, false),
            Err(CovError::Parse { field: "binCount", .. })
        ));
    }

    #[test]
    fn test_bad_fields_are_named() {
        let cases = [
            ("cp\nx 45 0 0 1 0 FALSE 100 FALSE\n", "seed"),
            ("cp\n1 45 9 0 1 0 FALSE 100 FALSE\n", "illegalMode"),
            ("cp\n1 45 0 0 1 0 maybe 100 FALSE\n", "thresholdingEnabled"),
            ("cp\n1 45 0 0 1 0 FALSE 100 FALSE\n0\n1 1\n7 0 1 1 0 1 1 0\n", "kind"),
            ("cp\n1 45 0 0 1 0 FALSE 100 FALSE\n0\n1 1\n1 0 1 1 0 1\n", "max"),
            ("cp\n1 45 0 0 1 0 FALSE 100 FALSE\n0\n1 1\n1 0 1 1 0 1 1 5 abc\n", "name"),
            ("cp\n1 45 0 0 1 0 FALSE 100 FALSE\n2\nonly one\n", "message"),
        ];
        for (text, field) in cases {
            let mut model = CoverageModel::new();
            match model.read_db_str(text, false) {
                Err(CovError::Parse { field: f, .. }) => assert_eq!(f, field, "{text:?}"),
                other => panic!("expected parse error for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alu.cov");
        let mut original = sample_model();
        original.write_database(&path).unwrap();
        let mut copy = CoverageModel::new();
        copy.read_database(&path, false).unwrap();
        assert_eq!(copy.bins(), original.bins());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let mut model = CoverageModel::new();
        let err = model.read_database("/nonexistent/covbin/db.txt", false).unwrap_err();
        assert!(matches!(err, CovError::Io(_)));
    }
}
