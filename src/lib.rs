//! Locate the knee of a latency-vs-throughput curve with the Half-Latency Rule.
//!
//! The ATP (Application Turning Point) is the throughput at which latency
//! first reaches a threshold derived from the curve itself: the midpoint of
//! its latency range, or twice its baseline latency.
//!
//! ```
//! use atp_knee::{find_knee_half_latency, Rule};
//!
//! let knee = find_knee_half_latency(
//!     &[100.0, 200.0, 300.0, 400.0],
//!     &[1.0, 1.0, 3.0, 5.0],
//!     Rule::DoubleMin,
//!     None,
//! )
//! .unwrap();
//! assert_eq!(knee.atp_throughput, 250.0);
//! assert_eq!(knee.knee_latency, 2.0);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod knee;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod storage;
pub mod text_summary;
#[cfg(feature = "tui")]
pub mod tui;

pub use error::KneeError;
pub use knee::{
    analyze, compare, compute_half_latency, compute_threshold, find_knee, find_knee_half_latency,
    prepare, smooth_latency,
};
pub use model::{Analysis, ComparisonResult, KneeResult, Rule, SamplePair};
