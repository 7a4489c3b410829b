//! Nominal sampling rate of a digital controller.
//!
//! A controller returns its next sampling period with every step, so the rate
//! may change at run time; this is the period it starts from.

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleConfig {
    /// Sampling period (s).
    pub t_s: f64,
}

impl SampleConfig {
    pub fn new(t_s: f64) -> ControlResult<Self> {
        if !(t_s > 0.0 && t_s.is_finite()) {
            return Err(ControlError::InvalidArg {
                what: "sampling period must be positive and finite",
            });
        }
        Ok(Self { t_s })
    }

    /// From a sampling frequency in Hz.
    pub fn from_frequency(f_s: f64) -> ControlResult<Self> {
        Self::new(1.0 / f_s)
    }

    pub fn frequency(&self) -> f64 {
        1.0 / self.t_s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_and_frequency_agree() {
        let sample = SampleConfig::from_frequency(8e3).unwrap();
        assert_eq!(sample.t_s, 1.25e-4);
        assert!((sample.frequency() - 8e3).abs() < 1e-9);
    }

    #[test]
    fn rejects_degenerate_rates() {
        assert!(SampleConfig::new(0.0).is_err());
        assert!(SampleConfig::new(f64::NAN).is_err());
        assert!(SampleConfig::new(f64::INFINITY).is_err());
        assert!(SampleConfig::from_frequency(0.0).is_err());
        assert!(SampleConfig::from_frequency(-1.0).is_err());
    }
}
