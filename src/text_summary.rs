//! Text summary builder for CLI output.
//!
//! Formats an analysed curve (and optionally a comparison) into the
//! human-readable report lines printed in text mode and written by `--report`.

use crate::metrics::CurveStats;
use crate::model::{Analysis, ComparisonResult};

/// Pre-formatted lines for text output.
pub struct TextSummary {
    pub lines: Vec<String>,
}

impl TextSummary {
    pub fn to_text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

fn fmt3(x: f64) -> String {
    format!("{x:.3}")
}

/// Build the report for one analysed curve.
pub fn build_text_summary(analysis: &Analysis, latency_units: &str) -> TextSummary {
    let knee = &analysis.knee;
    let samples = &analysis.samples;
    let mut lines = vec![
        "ATP Analysis Report (Half-Latency Rule)".to_string(),
        String::new(),
        format!("Source: {}", analysis.source),
        format!("Rule: {}", knee.rule),
    ];
    match analysis.smooth_window {
        Some(w) if w > 1 => lines.push(format!("Smoothing window: {w}")),
        _ => lines.push("Smoothing window: none".to_string()),
    }
    lines.push(format!("Points: {}", samples.len()));
    lines.push(format!(
        "Half-latency: {} {latency_units}",
        fmt3(knee.threshold_latency)
    ));
    lines.push(format!(
        "Knee latency: {} {latency_units}",
        fmt3(knee.knee_latency)
    ));
    lines.push(format!("ATP (throughput at knee): {}", fmt3(knee.atp_throughput)));

    if let Some(stats) = CurveStats::from_pair(samples) {
        lines.push(format!(
            "Latency: min {:.3} max {:.3} avg {:.3} med {:.3} p25 {:.3} p75 {:.3} {latency_units}",
            stats.latency_min,
            stats.latency_max,
            stats.latency_mean,
            stats.latency_median,
            stats.latency_p25,
            stats.latency_p75
        ));
        lines.push(format!(
            "Throughput range: {:.3} .. {:.3}",
            stats.throughput_min, stats.throughput_max
        ));
    }

    lines.push(String::new());
    lines.push("Data (throughput, latency, half-latency)".to_string());
    for (x, y) in samples.points() {
        lines.push(format!(
            "{}, {}, {}",
            fmt3(x),
            fmt3(y),
            fmt3(knee.threshold_latency)
        ));
    }

    TextSummary { lines }
}

/// Build the comparison block for two analysed curves.
pub fn build_comparison_summary(
    a: &Analysis,
    b: &Analysis,
    cmp: &ComparisonResult,
    latency_units: &str,
) -> TextSummary {
    let lines = vec![
        format!("Comparison ({} -> {})", a.source, b.source),
        String::new(),
        format!(
            "ATP: {} -> {} ({:+.3}, {:+.2}%)",
            fmt3(a.knee.atp_throughput),
            fmt3(b.knee.atp_throughput),
            cmp.atp_diff_abs,
            cmp.atp_diff_pct
        ),
        format!(
            "Knee latency: {} -> {} {latency_units} ({:+.3} {latency_units}, {:+.2}%)",
            fmt3(a.knee.knee_latency),
            fmt3(b.knee.knee_latency),
            cmp.knee_latency_diff_abs,
            cmp.knee_latency_diff_pct
        ),
    ];
    TextSummary { lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knee::{analyze, compare};
    use crate::model::Rule;

    fn analysis(source: &str, x: &[f64], y: &[f64]) -> Analysis {
        let (samples, knee) = analyze(x, y, Rule::Midrange, None).unwrap();
        Analysis {
            source: source.to_string(),
            smooth_window: None,
            samples,
            knee,
        }
    }

    #[test]
    fn report_has_headline_values_and_rows() {
        // threshold (1+5)/2 = 3, bracket (200,2)-(300,4) -> atp 250
        let a = analysis("run.csv", &[100.0, 200.0, 300.0, 400.0], &[1.0, 2.0, 4.0, 5.0]);
        let text = build_text_summary(&a, "ms").to_text();
        assert!(text.starts_with("ATP Analysis Report"));
        assert!(text.contains("Rule: midrange"));
        assert!(text.contains("Smoothing window: none"));
        assert!(text.contains("Points: 4"));
        assert!(text.contains("Half-latency: 3.000 ms"));
        assert!(text.contains("Knee latency: 3.000 ms"));
        assert!(text.contains("ATP (throughput at knee): 250.000"));
        assert!(text.contains("100.000, 1.000, 3.000"));
        assert!(text.ends_with("400.000, 5.000, 3.000\n"));
    }

    #[test]
    fn comparison_shows_signed_deltas() {
        let a = analysis("a.csv", &[100.0, 200.0, 300.0, 400.0], &[1.0, 2.0, 4.0, 5.0]);
        let b = analysis("b.csv", &[100.0, 200.0, 300.0, 400.0], &[1.0, 1.0, 2.0, 5.0]);
        let cmp = compare(&a.knee, &b.knee).unwrap();
        // b: threshold 3, bracket (300,2)-(400,5) -> 333.333
        let lines = build_comparison_summary(&a, &b, &cmp, "ms").lines;
        assert_eq!(lines[0], "Comparison (a.csv -> b.csv)");
        assert!(lines[2].starts_with("ATP: 250.000 -> 333.333 (+83.333, +33.33%)"));
        assert!(lines[3].contains("(+0.000 ms, +0.00%)"));
    }
}
