use crate::config::{self, FileConfig};
use crate::ingest::{self, ColumnRef, HeaderRow, IngestOptions, SheetRef};
use crate::knee;
use crate::model::{Analysis, ReportDocument, Rule, SamplePair};
use crate::storage;
use crate::text_summary;
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;

/// `--smooth` accepts positive integers only.
fn positive_usize(s: &str) -> Result<usize, String> {
    let v: usize = s.parse().map_err(|e| format!("{e}"))?;
    if v == 0 {
        return Err("must be a positive integer".to_string());
    }
    Ok(v)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "atp-knee",
    version,
    about = "Compute ATP (throughput at the knee) of a latency curve using the Half-Latency Rule"
)]
pub struct Cli {
    /// Input CSV/TSV/XLSX file with throughput and latency columns
    pub input: PathBuf,

    /// Second input to compare against the first (differences are second - first)
    #[arg(long)]
    pub compare: Option<PathBuf>,

    /// Throughput column: header name or zero-based index [default: 0]
    #[arg(long)]
    pub throughput_col: Option<ColumnRef>,

    /// Latency column: header name or zero-based index [default: 1]
    #[arg(long)]
    pub latency_col: Option<ColumnRef>,

    /// Field delimiter (single character or `tab`); inferred from the extension if omitted
    #[arg(long)]
    pub delimiter: Option<String>,

    /// Header row index, or `none` when the input has no header [default: 0]
    #[arg(long)]
    pub header: Option<HeaderRow>,

    /// Worksheet name or zero-based index for spreadsheet input [default: first sheet]
    #[arg(long)]
    pub sheet: Option<SheetRef>,

    /// Half-latency rule [default: midrange]
    #[arg(long, value_enum)]
    pub rule: Option<Rule>,

    /// Centered moving average window for latency
    #[arg(long, value_parser = positive_usize)]
    pub smooth: Option<usize>,

    /// Units label for latency values in reports and plots [default: ms]
    #[arg(long)]
    pub latency_units: Option<String>,

    /// Write the text report to this file instead of stdout
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Print JSON result instead of the text report
    #[arg(long)]
    pub json: bool,

    /// Export results as JSON
    #[arg(long)]
    pub export_json: Option<PathBuf>,

    /// Export prepared samples as CSV
    #[arg(long)]
    pub export_csv: Option<PathBuf>,

    /// Show the curve in an interactive terminal chart
    #[arg(long)]
    pub show: bool,

    /// Chart title
    #[arg(long)]
    pub title: Option<String>,

    /// Config file with default settings [default: <config dir>/atp-knee/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log debug details to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Analysis settings after merging flags, config file and defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub rule: Rule,
    pub smooth: Option<usize>,
    pub latency_units: String,
    pub ingest: IngestOptions,
}

/// Flags win over the config file, which wins over built-in defaults.
pub fn resolve_settings(args: &Cli, file: &FileConfig) -> Result<Settings> {
    let defaults = IngestOptions::default();

    let throughput_col = match (&args.throughput_col, &file.throughput_col) {
        (Some(c), _) => c.clone(),
        (None, Some(s)) => s
            .parse()
            .map_err(|e| anyhow!("config throughput_col: {e}"))?,
        (None, None) => defaults.throughput_col,
    };
    let latency_col = match (&args.latency_col, &file.latency_col) {
        (Some(c), _) => c.clone(),
        (None, Some(s)) => s.parse().map_err(|e| anyhow!("config latency_col: {e}"))?,
        (None, None) => defaults.latency_col,
    };
    let delimiter = args
        .delimiter
        .as_deref()
        .or(file.delimiter.as_deref())
        .map(config::parse_delimiter)
        .transpose()?;
    let sheet = match (&args.sheet, &file.sheet) {
        (Some(s), _) => Some(s.clone()),
        (None, Some(s)) => Some(s.parse().map_err(|e| anyhow!("config sheet: {e}"))?),
        (None, None) => None,
    };

    Ok(Settings {
        rule: args.rule.or(file.rule).unwrap_or_default(),
        smooth: args.smooth.or(file.smooth),
        latency_units: args
            .latency_units
            .clone()
            .or_else(|| file.latency_units.clone())
            .unwrap_or_else(|| "ms".to_string()),
        ingest: IngestOptions {
            throughput_col,
            latency_col,
            delimiter,
            header: args.header.unwrap_or_default(),
            sheet,
        },
    })
}

/// One analysed input plus, when smoothing, its unsmoothed curve for plotting.
pub struct FileAnalysis {
    pub analysis: Analysis,
    pub raw: Option<SamplePair>,
}

/// Read `path` and run the knee analysis on it.
pub fn analyze_file(path: &Path, settings: &Settings) -> Result<FileAnalysis> {
    let raw = ingest::read_samples(path, &settings.ingest)?;
    let (samples, knee) = knee::analyze(&raw.throughput, &raw.latency, settings.rule, settings.smooth)
        .with_context(|| format!("knee analysis failed for {}", path.display()))?;

    info!(
        source = %raw.source,
        rule = %knee.rule,
        points = samples.len(),
        atp = knee.atp_throughput,
        threshold = knee.threshold_latency,
        "knee located"
    );

    let unsmoothed = match settings.smooth {
        Some(w) if w > 1 => Some(
            knee::prepare(&raw.throughput, &raw.latency, None)
                .with_context(|| format!("preparing unsmoothed curve for {}", path.display()))?,
        ),
        _ => None,
    };

    Ok(FileAnalysis {
        analysis: Analysis {
            source: raw.source,
            smooth_window: settings.smooth,
            samples,
            knee,
        },
        raw: unsmoothed,
    })
}

pub fn run(args: Cli) -> Result<()> {
    if args.show && !cfg!(feature = "tui") {
        return Err(anyhow!("--show requires a build with the `tui` feature"));
    }

    let file_cfg = config::load_config(args.config.as_deref())?;
    let settings = resolve_settings(&args, &file_cfg)?;

    let primary = analyze_file(&args.input, &settings)?;
    let secondary = args
        .compare
        .as_deref()
        .map(|p| analyze_file(p, &settings))
        .transpose()?;

    let comparison = match &secondary {
        Some(b) => Some(
            knee::compare(&primary.analysis.knee, &b.analysis.knee)
                .context("comparing knees")?,
        ),
        None => None,
    };
    if let Some(cmp) = &comparison {
        info!(
            atp_diff_abs = cmp.atp_diff_abs,
            atp_diff_pct = cmp.atp_diff_pct,
            "compared knees"
        );
    }

    let doc = ReportDocument {
        generated_utc: storage::timestamp_utc()?,
        latency_units: settings.latency_units.clone(),
        analysis: primary.analysis.clone(),
        compared: secondary.as_ref().map(|s| s.analysis.clone()),
        comparison,
    };

    handle_exports(&args, &doc)?;

    let mut summary = text_summary::build_text_summary(&doc.analysis, &settings.latency_units);
    if let (Some(b), Some(cmp)) = (doc.compared.as_ref(), doc.comparison.as_ref()) {
        let other = text_summary::build_text_summary(b, &settings.latency_units);
        let cmp_lines =
            text_summary::build_comparison_summary(&doc.analysis, b, cmp, &settings.latency_units);
        summary.lines.push(String::new());
        summary.lines.extend(other.lines);
        summary.lines.push(String::new());
        summary.lines.extend(cmp_lines.lines);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
        if let Some(p) = args.report.as_deref() {
            storage::write_report(Some(p), &summary)?;
        }
    } else {
        storage::write_report(args.report.as_deref(), &summary)?;
    }

    if args.show {
        #[cfg(feature = "tui")]
        {
            let mut curves = vec![crate::tui::PlotCurve {
                analysis: primary.analysis,
                raw: primary.raw,
            }];
            if let Some(b) = secondary {
                curves.push(crate::tui::PlotCurve {
                    analysis: b.analysis,
                    raw: b.raw,
                });
            }
            crate::tui::run(crate::tui::PlotView {
                title: args.title.clone(),
                latency_units: settings.latency_units.clone(),
                curves,
                summary: summary.to_text(),
            })?;
        }
    }

    Ok(())
}

/// Handle export operations (JSON and CSV).
fn handle_exports(args: &Cli, doc: &ReportDocument) -> Result<()> {
    if let Some(p) = args.export_json.as_deref() {
        storage::export_json(p, doc)?;
        info!(path = %p.display(), "exported JSON");
    }
    if let Some(p) = args.export_csv.as_deref() {
        storage::export_csv(p, &doc.analysis)?;
        info!(path = %p.display(), "exported CSV");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("atp-knee").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_without_flags_or_config() {
        let s = resolve_settings(&parse(&["data.csv"]), &FileConfig::default()).unwrap();
        assert_eq!(s.rule, Rule::Midrange);
        assert_eq!(s.smooth, None);
        assert_eq!(s.latency_units, "ms");
        assert_eq!(s.ingest.throughput_col, ColumnRef::Index(0));
        assert_eq!(s.ingest.latency_col, ColumnRef::Index(1));
        assert_eq!(s.ingest.header, HeaderRow::Row(0));
        assert_eq!(s.ingest.sheet, None);
    }

    #[test]
    fn flags_override_config_file() {
        let file = FileConfig {
            rule: Some(Rule::DoubleMin),
            smooth: Some(5),
            latency_units: Some("us".to_string()),
            throughput_col: Some("IOPS".to_string()),
            latency_col: Some("lat".to_string()),
            delimiter: Some(";".to_string()),
            sheet: Some("runs".to_string()),
        };
        let s = resolve_settings(
            &parse(&["data.csv", "--rule", "midrange", "--latency-col", "3"]),
            &file,
        )
        .unwrap();
        assert_eq!(s.rule, Rule::Midrange);
        assert_eq!(s.smooth, Some(5));
        assert_eq!(s.latency_units, "us");
        assert_eq!(s.ingest.throughput_col, ColumnRef::Name("IOPS".to_string()));
        assert_eq!(s.ingest.latency_col, ColumnRef::Index(3));
        assert_eq!(s.ingest.delimiter, Some(b';'));
        assert_eq!(s.ingest.sheet, Some(SheetRef::Name("runs".to_string())));
    }

    #[test]
    fn header_and_sheet_flags() {
        let s = resolve_settings(
            &parse(&["book.xlsx", "--header", "none", "--sheet", "2"]),
            &FileConfig {
                sheet: Some("runs".to_string()),
                ..FileConfig::default()
            },
        )
        .unwrap();
        assert_eq!(s.ingest.header, HeaderRow::Absent);
        assert_eq!(s.ingest.sheet, Some(SheetRef::Index(2)));
        assert_eq!(parse(&["d.csv", "--header", "3"]).header, Some(HeaderRow::Row(3)));
        assert!(Cli::try_parse_from(["atp-knee", "d.csv", "--header", "first"]).is_err());
    }

    #[test]
    fn smooth_must_be_positive() {
        let argv = ["atp-knee", "data.csv", "--smooth", "0"];
        assert!(Cli::try_parse_from(argv).is_err());
        assert_eq!(parse(&["data.csv", "--smooth", "3"]).smooth, Some(3));
    }

    #[test]
    fn rule_flag_uses_snake_case() {
        assert_eq!(
            parse(&["data.csv", "--rule", "double_min"]).rule,
            Some(Rule::DoubleMin)
        );
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["atp-knee", "d.csv", "-v", "-q"]).is_err());
    }
}
