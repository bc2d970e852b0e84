//! Half-Latency Rule knee detection.
//!
//! `prepare` turns raw samples into a [`SamplePair`], `find_knee` locates
//! the turning point on it and `compare` contrasts two located knees. All of
//! them are pure functions over their inputs.

mod compare;
mod locate;
mod prepare;

pub use compare::compare;
pub use locate::{compute_threshold, find_knee};
pub use prepare::{prepare, smooth_latency};

use crate::error::KneeError;
use crate::model::{KneeResult, Rule, SamplePair};

/// Half-latency threshold of raw latency samples.
pub fn compute_half_latency(latency: &[f64], rule: Rule) -> Result<f64, KneeError> {
    compute_threshold(latency, rule)
}

/// Prepare raw samples and locate their knee in one call.
pub fn find_knee_half_latency(
    throughput: &[f64],
    latency: &[f64],
    rule: Rule,
    smooth_window: Option<usize>,
) -> Result<KneeResult, KneeError> {
    let samples = prepare(throughput, latency, smooth_window)?;
    find_knee(&samples, rule)
}

/// Like [`find_knee_half_latency`] but keeps the prepared curve.
pub fn analyze(
    throughput: &[f64],
    latency: &[f64],
    rule: Rule,
    smooth_window: Option<usize>,
) -> Result<(SamplePair, KneeResult), KneeError> {
    let samples = prepare(throughput, latency, smooth_window)?;
    let knee = find_knee(&samples, rule)?;
    Ok((samples, knee))
}
