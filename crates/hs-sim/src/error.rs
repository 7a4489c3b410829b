//! Error types for simulation operations.

use hs_control::ControlError;
use hs_core::HsError;
use hs_model::ModelError;
use thiserror::Error;

/// Errors encountered during a simulation run.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// A state or derivative became NaN or infinite; the run stops here.
    #[error("Non-finite value detected at t={t}")]
    NonFinite { t: f64 },

    #[error("Step size {h:e} fell below the minimum at t={t}")]
    StepSizeUnderflow { t: f64, h: f64 },

    #[error("Invariant violated: {what}")]
    Invariant { what: String },

    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Control(#[from] ControlError),

    #[error(transparent)]
    Core(#[from] HsError),
}

pub type SimResult<T> = Result<T, SimError>;

impl From<serde_yaml::Error> for SimError {
    fn from(e: serde_yaml::Error) -> Self {
        SimError::Config {
            message: e.to_string(),
        }
    }
}
