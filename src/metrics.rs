use crate::model::SamplePair;
use serde::Serialize;

/// Compute (mean, median, 25th percentile, 75th percentile) from samples
pub fn compute_metrics(samples: &[f64]) -> Option<(f64, f64, f64, f64)> {
    if samples.len() < 2 {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    let mean = samples.iter().sum::<f64>() / n as f64;
    let median = sorted[n / 2];
    let p25 = sorted[n / 4];
    let p75 = sorted[3 * n / 4];
    Some((mean, median, p25, p75))
}

/// Descriptive statistics of a prepared curve, shown alongside the knee.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurveStats {
    pub points: usize,
    pub throughput_min: f64,
    pub throughput_max: f64,
    pub latency_min: f64,
    pub latency_max: f64,
    pub latency_mean: f64,
    pub latency_median: f64,
    pub latency_p25: f64,
    pub latency_p75: f64,
}

impl CurveStats {
    pub fn from_pair(samples: &SamplePair) -> Option<Self> {
        let x = samples.throughput();
        let y = samples.latency();
        let (latency_mean, latency_median, latency_p25, latency_p75) = compute_metrics(y)?;
        // Throughput is sorted ascending.
        Some(Self {
            points: samples.len(),
            throughput_min: x[0],
            throughput_max: x[x.len() - 1],
            latency_min: y.iter().copied().fold(f64::INFINITY, f64::min),
            latency_max: y.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            latency_mean,
            latency_median,
            latency_p25,
            latency_p75,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knee::prepare;

    #[test]
    fn metrics_need_two_samples() {
        assert!(compute_metrics(&[1.0]).is_none());
        let (mean, median, p25, p75) = compute_metrics(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(mean, 2.5);
        assert_eq!(median, 3.0);
        assert_eq!(p25, 2.0);
        assert_eq!(p75, 4.0);
    }

    #[test]
    fn curve_stats_cover_both_axes() {
        let pair = prepare(&[300.0, 100.0, 200.0], &[6.0, 1.0, 3.0], None).unwrap();
        let stats = CurveStats::from_pair(&pair).unwrap();
        assert_eq!(stats.points, 3);
        assert_eq!((stats.throughput_min, stats.throughput_max), (100.0, 300.0));
        assert_eq!((stats.latency_min, stats.latency_max), (1.0, 6.0));
        assert_eq!(stats.latency_median, 3.0);
    }
}
