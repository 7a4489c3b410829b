//! Run statistics and progress reporting.

use serde::{Deserialize, Serialize};

/// Counters accumulated over a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Sampling periods simulated (control steps).
    pub periods: usize,
    /// Switching sub-intervals integrated.
    pub sub_intervals: usize,
    /// Zero-length sub-intervals skipped.
    pub skipped_sub_intervals: usize,
    /// Right-hand side evaluations across all integrations.
    pub rhs_evals: usize,
    /// Rejected adaptive steps.
    pub rejected_steps: usize,
    /// Wall-clock time spent in `run`, seconds.
    pub wall_time_s: f64,
}

/// Progress event emitted after every sampling period.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimProgress {
    /// Simulation time reached.
    pub t: f64,
    /// Stop time of the current run.
    pub t_stop: f64,
    /// Fraction of the current run completed, in `[0, 1]`.
    pub fraction_complete: f64,
    /// Sampling periods simulated so far.
    pub period: usize,
    /// Sampling period just completed.
    pub t_s: f64,
}

impl SimProgress {
    pub(crate) fn new(t_start: f64, t: f64, t_stop: f64, period: usize, t_s: f64) -> Self {
        let span = t_stop - t_start;
        let fraction_complete = if span > 0.0 {
            ((t - t_start) / span).clamp(0.0, 1.0)
        } else {
            1.0
        };
        Self {
            t,
            t_stop,
            fraction_complete,
            period,
            t_s,
        }
    }
}
