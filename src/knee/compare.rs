use crate::error::KneeError;
use crate::model::{ComparisonResult, KneeResult};

/// Differences of `b` relative to `a`; percentages are taken against `a`.
pub fn compare(a: &KneeResult, b: &KneeResult) -> Result<ComparisonResult, KneeError> {
    let (atp_diff_abs, atp_diff_pct) = relative_diff(a.atp_throughput, b.atp_throughput, "ATP throughput")?;
    let (knee_latency_diff_abs, knee_latency_diff_pct) =
        relative_diff(a.knee_latency, b.knee_latency, "knee latency")?;
    Ok(ComparisonResult {
        atp_diff_abs,
        atp_diff_pct,
        knee_latency_diff_abs,
        knee_latency_diff_pct,
    })
}

fn relative_diff(a: f64, b: f64, what: &str) -> Result<(f64, f64), KneeError> {
    if a == 0.0 {
        return Err(KneeError::invalid(format!(
            "cannot compute percentage change: reference {what} is zero"
        )));
    }
    let abs = b - a;
    Ok((abs, abs / a * 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rule;

    fn knee(atp: f64, latency: f64) -> KneeResult {
        KneeResult {
            atp_throughput: atp,
            knee_latency: latency,
            threshold_latency: latency,
            rule: Rule::DoubleMin,
            left_index: Some(0),
            right_index: 1,
        }
    }

    #[test]
    fn differences_are_relative_to_first() {
        let cmp = compare(&knee(250.0, 2.0), &knee(300.0, 3.0)).unwrap();
        assert_eq!(cmp.atp_diff_abs, 50.0);
        assert_eq!(cmp.atp_diff_pct, 20.0);
        assert_eq!(cmp.knee_latency_diff_abs, 1.0);
        assert_eq!(cmp.knee_latency_diff_pct, 50.0);
    }

    #[test]
    fn regression_is_negative() {
        let cmp = compare(&knee(400.0, 4.0), &knee(300.0, 4.0)).unwrap();
        assert_eq!(cmp.atp_diff_abs, -100.0);
        assert_eq!(cmp.atp_diff_pct, -25.0);
        assert_eq!(cmp.knee_latency_diff_pct, 0.0);
    }

    #[test]
    fn zero_reference_is_rejected() {
        assert!(matches!(
            compare(&knee(0.0, 2.0), &knee(300.0, 3.0)),
            Err(KneeError::InvalidValue(_))
        ));
    }
}
