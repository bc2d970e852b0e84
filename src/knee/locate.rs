use crate::error::KneeError;
use crate::model::{KneeResult, Rule, SamplePair};
use tracing::debug;

/// Half-latency threshold of `latency` under `rule`.
pub fn compute_threshold(latency: &[f64], rule: Rule) -> Result<f64, KneeError> {
    if latency.is_empty() {
        return Err(KneeError::invalid("latency is empty"));
    }
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &y in latency {
        if !y.is_finite() {
            return Err(KneeError::invalid(format!("latency contains {y}")));
        }
        min = min.min(y);
        max = max.max(y);
    }
    if min <= 0.0 {
        return Err(KneeError::invalid(format!(
            "baseline latency must be positive (min {min})"
        )));
    }
    Ok(rule.threshold(min, max))
}

/// Locate the knee of a prepared curve.
///
/// The knee is the first point, in ascending throughput, where latency
/// reaches the rule's threshold. Between the bracketing samples
/// `y0 < threshold <= y1` throughput is linearly interpolated and the knee
/// latency is the threshold itself. When the first sample is already at or
/// above the threshold, that sample is the knee.
pub fn find_knee(samples: &SamplePair, rule: Rule) -> Result<KneeResult, KneeError> {
    let x = samples.throughput();
    let y = samples.latency();
    let threshold = compute_threshold(y, rule)?;

    if y[0] >= threshold {
        debug!(threshold, "first sample already at threshold");
        return Ok(KneeResult {
            atp_throughput: x[0],
            knee_latency: y[0],
            threshold_latency: threshold,
            rule,
            left_index: None,
            right_index: 0,
        });
    }

    let bracket = y
        .windows(2)
        .position(|w| w[0] < threshold && threshold <= w[1]);

    let Some(left) = bracket else {
        let max_latency = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        return Err(KneeError::KneeNotFound {
            threshold,
            max_latency,
        });
    };
    let right = left + 1;

    let (x0, y0) = (x[left], y[left]);
    let (x1, y1) = (x[right], y[right]);
    // y1 > y0 holds by the bracket condition. The clamp only absorbs rounding.
    let atp = (x0 + (threshold - y0) * (x1 - x0) / (y1 - y0)).clamp(x0, x1);
    debug!(threshold, left, right, atp, "knee bracket found");

    Ok(KneeResult {
        atp_throughput: atp,
        knee_latency: threshold,
        threshold_latency: threshold,
        rule,
        left_index: Some(left),
        right_index: right,
    })
}
