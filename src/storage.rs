//! Report and export writers.

use crate::model::{Analysis, ReportDocument};
use crate::text_summary::TextSummary;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Current UTC time as RFC3339, used to stamp exported documents.
pub fn timestamp_utc() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format timestamp")
}

/// Write a text report to `path`, or to stdout when no path is given.
pub fn write_report(path: Option<&Path>, summary: &TextSummary) -> Result<()> {
    let text = summary.to_text();
    match path {
        Some(p) => {
            std::fs::write(p, text).with_context(|| format!("failed to write report: {}", p.display()))
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            out.write_all(text.as_bytes()).context("write report to stdout")?;
            out.flush().context("flush stdout")
        }
    }
}

pub fn export_json(path: &Path, doc: &ReportDocument) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create: {}", path.display()))?;
    let mut w = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut w, doc).context("serialize report JSON")?;
    writeln!(w)?;
    w.flush()
        .with_context(|| format!("failed to write: {}", path.display()))
}

/// Prepared samples with the half-latency column, one row per sample.
pub fn export_csv(path: &Path, analysis: &Analysis) -> Result<()> {
    let mut w = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create: {}", path.display()))?;
    w.write_record(["throughput", "latency", "half_latency"])?;
    let threshold = analysis.knee.threshold_latency.to_string();
    for (x, y) in analysis.samples.points() {
        w.write_record([x.to_string(), y.to_string(), threshold.clone()])?;
    }
    w.flush()
        .with_context(|| format!("failed to write: {}", path.display()))
}
