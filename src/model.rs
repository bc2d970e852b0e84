use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the half-latency threshold is derived from a curve's latency range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Midpoint between the minimum and maximum latency.
    #[default]
    Midrange,
    /// Twice the minimum (baseline) latency.
    #[value(name = "double_min")]
    DoubleMin,
}

impl Rule {
    /// Threshold for a curve whose latency spans `[min, max]`.
    pub fn threshold(self, min: f64, max: f64) -> f64 {
        match self {
            Rule::Midrange => 0.5 * (min + max),
            Rule::DoubleMin => 2.0 * min,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rule::Midrange => "midrange",
            Rule::DoubleMin => "double_min",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "midrange" => Ok(Rule::Midrange),
            "double_min" | "double-min" => Ok(Rule::DoubleMin),
            other => Err(format!("unknown half-latency rule: {other}")),
        }
    }
}

/// A validated curve: sorted by strictly increasing throughput, all values
/// finite, latency strictly positive, at least two samples.
///
/// Only [`crate::knee::prepare`] builds one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SamplePair {
    throughput: Vec<f64>,
    latency: Vec<f64>,
}

impl SamplePair {
    pub(crate) fn from_validated(throughput: Vec<f64>, latency: Vec<f64>) -> Self {
        debug_assert_eq!(throughput.len(), latency.len());
        Self {
            throughput,
            latency,
        }
    }

    pub fn throughput(&self) -> &[f64] {
        &self.throughput
    }

    pub fn latency(&self) -> &[f64] {
        &self.latency
    }

    pub fn len(&self) -> usize {
        self.throughput.len()
    }

    pub fn is_empty(&self) -> bool {
        self.throughput.is_empty()
    }

    /// (throughput, latency) points in ascending throughput order.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.throughput
            .iter()
            .copied()
            .zip(self.latency.iter().copied())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KneeResult {
    /// Throughput at the knee (the ATP).
    pub atp_throughput: f64,
    pub knee_latency: f64,
    pub threshold_latency: f64,
    pub rule: Rule,
    /// Sample below the threshold; `None` when the first sample is already at it.
    pub left_index: Option<usize>,
    /// First sample at or above the threshold.
    pub right_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub atp_diff_abs: f64,
    pub atp_diff_pct: f64,
    pub knee_latency_diff_abs: f64,
    pub knee_latency_diff_pct: f64,
}

/// One analysed curve, as handed to the report, export and plot layers.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub source: String,
    pub smooth_window: Option<usize>,
    pub samples: SamplePair,
    pub knee: KneeResult,
}

/// Document written by `--json` and `--export-json`.
#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
    pub generated_utc: String,
    pub latency_units: String,
    pub analysis: Analysis,
    /// Second curve when comparing; differences are `compared - analysis`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compared: Option<Analysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_parses_both_spellings() {
        assert_eq!("midrange".parse::<Rule>(), Ok(Rule::Midrange));
        assert_eq!("double_min".parse::<Rule>(), Ok(Rule::DoubleMin));
        assert_eq!("Double-Min".parse::<Rule>(), Ok(Rule::DoubleMin));
        assert!("median".parse::<Rule>().is_err());
    }

    #[test]
    fn rule_serializes_snake_case() {
        let json = serde_json::to_string(&Rule::DoubleMin).unwrap();
        assert_eq!(json, "\"double_min\"");
        let back: Rule = serde_json::from_str("\"midrange\"").unwrap();
        assert_eq!(back, Rule::Midrange);
    }
}
