use thiserror::Error;

/// Failures raised by the knee-detection core.
///
/// Each variant is a distinct precondition so callers can render their own
/// message; none of them is ever replaced by a default result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KneeError {
    #[error("throughput and latency must be the same length (got {throughput} and {latency})")]
    Shape { throughput: usize, latency: usize },

    #[error("need at least two samples to determine a knee (got {len})")]
    InsufficientData { len: usize },

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("latency never reaches the half-latency threshold {threshold} (max latency {max_latency})")]
    KneeNotFound { threshold: f64, max_latency: f64 },
}

impl KneeError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        KneeError::InvalidValue(msg.into())
    }
}
