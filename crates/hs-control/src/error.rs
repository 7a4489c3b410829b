//! Error types for control system operations.

use hs_core::HsError;
use thiserror::Error;

/// Result type for control system operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur in control system operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Neither a speed nor a torque reference is configured.
    #[error("No output mode configured: set a speed or a torque reference")]
    NoOutputMode,

    /// The controller asked for a sampling period that cannot be simulated.
    #[error("Invalid sampling period {t_s} at t={t}")]
    InvalidPeriod { t: f64, t_s: f64 },

    /// The controller produced non-finite duty ratios.
    #[error("Non-finite duty ratios {d_abc:?} at t={t}")]
    NonFiniteDuty { t: f64, d_abc: [f64; 3] },

    /// Rows of one signal group disagree on their fields.
    #[error("Signal group '{group}' changed shape at step {step}: {what}")]
    SchemaMismatch {
        group: String,
        step: usize,
        what: String,
    },

    #[error(transparent)]
    Core(#[from] HsError),
}
