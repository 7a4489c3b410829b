//! Discrete-time control layer of the hybrid switched-system simulator.
//!
//! A controller implements [`ControlSystem`]: once per sampling period it
//! reads the plant, forms feedback, computes references together with duty
//! ratios and the next sampling period, and finally updates its internal
//! states. [`ControlLoop`] drives those phases, owns the controller clock and
//! logs every feedback and reference record.
//!
//! Reusable building blocks for concrete controllers:
//! - PI controller with anti-windup
//! - Rate limiter and piecewise-linear reference sequences
//! - PWM duty ratio computation with realized-voltage estimate
//! - Speed/torque output-mode selection

pub mod control;
pub mod controller;
pub mod error;
pub mod log;
pub mod mode;
pub mod pwm;
pub mod rate_limiter;
pub mod sampled;
pub mod sequence;
pub mod signal;

pub use control::{ControlLoop, ControlSystem};
pub use controller::{PiController, PiState};
pub use error::{ControlError, ControlResult};
pub use log::{ControlTables, SignalLog};
pub use mode::{ModeSelector, OutputMode, RefFn};
pub use pwm::{Pwm, duty_ratios, six_step_overmodulation};
pub use rate_limiter::RateLimiter;
pub use sampled::SampleConfig;
pub use sequence::Sequence;
pub use signal::{Actuation, ControlOutput, SignalGroup};
