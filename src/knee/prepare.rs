use crate::error::KneeError;
use crate::model::SamplePair;
use tracing::debug;

/// Validate, sort and optionally smooth a raw throughput/latency sample pair.
///
/// Samples are sorted jointly by ascending throughput. Samples sharing a
/// throughput value collapse into one whose latency is the mean of theirs.
/// A `smooth_window` above 1 replaces latency with its centered moving
/// average (see [`smooth_latency`]); the window must not exceed the number of
/// samples left after collapsing.
pub fn prepare(
    throughput: &[f64],
    latency: &[f64],
    smooth_window: Option<usize>,
) -> Result<SamplePair, KneeError> {
    if throughput.len() != latency.len() {
        return Err(KneeError::Shape {
            throughput: throughput.len(),
            latency: latency.len(),
        });
    }
    if throughput.len() < 2 {
        return Err(KneeError::InsufficientData {
            len: throughput.len(),
        });
    }
    validate_values(throughput, latency)?;

    let mut order: Vec<usize> = (0..throughput.len()).collect();
    order.sort_by(|&a, &b| throughput[a].total_cmp(&throughput[b]));

    let (xs, ys) = collapse_duplicates(&order, throughput, latency);
    if xs.len() < 2 {
        return Err(KneeError::InsufficientData { len: xs.len() });
    }
    if xs.len() != throughput.len() {
        debug!(
            before = throughput.len(),
            after = xs.len(),
            "collapsed duplicate throughput samples"
        );
    }

    let ys = match smooth_window {
        Some(w) => smooth_latency(&ys, w)?,
        None => ys,
    };

    Ok(SamplePair::from_validated(xs, ys))
}

fn validate_values(throughput: &[f64], latency: &[f64]) -> Result<(), KneeError> {
    for (i, &x) in throughput.iter().enumerate() {
        if !x.is_finite() {
            return Err(KneeError::invalid(format!(
                "throughput at sample {i} is not finite ({x})"
            )));
        }
        if x < 0.0 {
            return Err(KneeError::invalid(format!(
                "throughput at sample {i} is negative ({x})"
            )));
        }
    }
    for (i, &y) in latency.iter().enumerate() {
        if !y.is_finite() {
            return Err(KneeError::invalid(format!(
                "latency at sample {i} is not finite ({y})"
            )));
        }
        if y <= 0.0 {
            return Err(KneeError::invalid(format!(
                "latency at sample {i} must be positive ({y})"
            )));
        }
    }
    Ok(())
}

/// Walk samples in `order` and average latencies of runs with equal throughput.
fn collapse_duplicates(order: &[usize], throughput: &[f64], latency: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut xs: Vec<f64> = Vec::with_capacity(order.len());
    let mut ys: Vec<f64> = Vec::with_capacity(order.len());

    let mut i = 0;
    while i < order.len() {
        let x = throughput[order[i]];
        let mut sum = 0.0;
        let mut count = 0usize;
        while i < order.len() && throughput[order[i]] == x {
            sum += latency[order[i]];
            count += 1;
            i += 1;
        }
        xs.push(x);
        ys.push(sum / count as f64);
    }
    (xs, ys)
}

/// Centered moving average of width `window`.
///
/// Sample `i` averages indices `i - window/2 ..= i + (window-1)/2`, clamped to
/// the sequence, so edge windows shrink instead of padding. A window of 1
/// returns the input unchanged.
pub fn smooth_latency(latency: &[f64], window: usize) -> Result<Vec<f64>, KneeError> {
    if window == 0 {
        return Err(KneeError::invalid("smoothing window must be >= 1"));
    }
    if window > latency.len() {
        return Err(KneeError::invalid(format!(
            "smoothing window {window} exceeds sample count {}",
            latency.len()
        )));
    }
    if window == 1 {
        return Ok(latency.to_vec());
    }

    let n = latency.len();
    let back = window / 2;
    let ahead = (window - 1) / 2;

    // Sum each window directly; a running prefix sum drops small values
    // beside large ones.
    let smoothed = (0..n)
        .map(|i| {
            let lo = i.saturating_sub(back);
            let hi = (i + ahead).min(n - 1);
            latency[lo..=hi].iter().sum::<f64>() / (hi + 1 - lo) as f64
        })
        .collect();
    debug!(window, samples = n, "smoothed latency");
    Ok(smoothed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_jointly_by_throughput() {
        let pair = prepare(&[300.0, 100.0, 200.0], &[6.0, 1.0, 3.0], None).unwrap();
        assert_eq!(pair.throughput(), &[100.0, 200.0, 300.0]);
        assert_eq!(pair.latency(), &[1.0, 3.0, 6.0]);
    }

    #[test]
    fn duplicate_throughput_collapses_to_mean_latency() {
        let pair = prepare(&[100.0, 100.0, 200.0], &[2.0, 4.0, 5.0], None).unwrap();
        assert_eq!(pair.throughput(), &[100.0, 200.0]);
        assert_eq!(pair.latency(), &[3.0, 5.0]);
    }

    #[test]
    fn collapsing_to_a_single_sample_is_insufficient() {
        let err = prepare(&[100.0, 100.0], &[2.0, 4.0], None).unwrap_err();
        assert_eq!(err, KneeError::InsufficientData { len: 1 });
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let err = prepare(&[1.0, 2.0], &[1.0], None).unwrap_err();
        assert_eq!(
            err,
            KneeError::Shape {
                throughput: 2,
                latency: 1
            }
        );
    }

    #[test]
    fn rejects_short_input() {
        let err = prepare(&[1.0], &[1.0], None).unwrap_err();
        assert_eq!(err, KneeError::InsufficientData { len: 1 });
    }

    #[test]
    fn rejects_bad_values() {
        for (x, y) in [
            (vec![1.0, f64::NAN], vec![1.0, 2.0]),
            (vec![1.0, 2.0], vec![1.0, f64::INFINITY]),
            (vec![-1.0, 2.0], vec![1.0, 2.0]),
            (vec![1.0, 2.0], vec![0.0, 2.0]),
            (vec![1.0, 2.0], vec![1.0, -2.0]),
        ] {
            let err = prepare(&x, &y, None).unwrap_err();
            assert!(matches!(err, KneeError::InvalidValue(_)), "{x:?} {y:?} -> {err:?}");
        }
    }

    #[test]
    fn zero_throughput_is_allowed() {
        let pair = prepare(&[0.0, 10.0], &[1.0, 2.0], None).unwrap();
        assert_eq!(pair.throughput(), &[0.0, 10.0]);
    }

    #[test]
    fn window_of_one_is_identity() {
        let y = [1.0, 5.0, 2.0, 8.0];
        assert_eq!(smooth_latency(&y, 1).unwrap(), y.to_vec());
        let pair = prepare(&[1.0, 2.0, 3.0, 4.0], &y, Some(1)).unwrap();
        assert_eq!(pair.latency(), &y);
    }

    #[test]
    fn centered_window_shrinks_at_edges() {
        let s = smooth_latency(&[1.0, 2.0, 3.0, 4.0, 5.0], 3).unwrap();
        assert_eq!(s, vec![1.5, 2.0, 3.0, 4.0, 4.5]);
    }

    #[test]
    fn even_window_leans_backward() {
        // i averages [i-1, i]
        let s = smooth_latency(&[2.0, 4.0, 6.0], 2).unwrap();
        assert_eq!(s, vec![2.0, 3.0, 5.0]);
    }

    #[test]
    fn wide_range_latency_keeps_small_windows_exact() {
        let s = smooth_latency(&[1e17, 1.0, 2.0, 3.0], 2).unwrap();
        assert_eq!(s, vec![1e17, 5e16, 1.5, 2.5]);
        let pair = prepare(&[1.0, 2.0, 3.0, 4.0], &[1e17, 1.0, 2.0, 3.0], Some(2)).unwrap();
        assert!(pair.latency().iter().all(|&y| y > 0.0));
    }

    #[test]
    fn window_bounds_are_enforced() {
        assert!(matches!(
            smooth_latency(&[1.0, 2.0], 0),
            Err(KneeError::InvalidValue(_))
        ));
        assert!(matches!(
            smooth_latency(&[1.0, 2.0], 3),
            Err(KneeError::InvalidValue(_))
        ));
        assert!(matches!(
            prepare(&[1.0, 2.0], &[1.0, 2.0], Some(0)),
            Err(KneeError::InvalidValue(_))
        ));
    }
}
