//! Signal records exchanged between control phases.

use hs_core::Value;

use crate::error::{ControlError, ControlResult};

/// A record whose fields are logged verbatim once per control step.
///
/// Every call to [`signals`](Self::signals) on records of the same type must
/// return the same field names and kinds in the same order.
pub trait SignalGroup {
    /// Name of the group in the signal log.
    const GROUP: &'static str;

    fn signals(&self) -> Vec<(&'static str, Value)>;
}

/// What a reference record tells the plant side.
pub trait Actuation {
    /// Length of the next sampling period (seconds).
    fn t_s(&self) -> f64;

    /// Phase duty ratios to apply during the next period.
    fn d_abc(&self) -> [f64; 3];
}

/// Validated actuation returned by one control step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlOutput {
    pub t_s: f64,
    pub d_abc: [f64; 3],
}

impl ControlOutput {
    /// Check a requested actuation issued at controller time `t`.
    pub fn checked(t: f64, t_s: f64, d_abc: [f64; 3]) -> ControlResult<Self> {
        if !t_s.is_finite() || t_s <= 0.0 {
            return Err(ControlError::InvalidPeriod { t, t_s });
        }
        if !hs_core::all_finite(&d_abc) {
            return Err(ControlError::NonFiniteDuty { t, d_abc });
        }
        Ok(Self { t_s, d_abc })
    }

    pub fn from_actuation(t: f64, actuation: &impl Actuation) -> ControlResult<Self> {
        Self::checked(t, actuation.t_s(), actuation.d_abc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_period() {
        assert!(ControlOutput::checked(0.0, 0.0, [0.5; 3]).is_err());
        assert!(ControlOutput::checked(0.0, -1e-4, [0.5; 3]).is_err());
        assert!(ControlOutput::checked(0.0, f64::INFINITY, [0.5; 3]).is_err());
    }

    #[test]
    fn rejects_nan_duty() {
        let err = ControlOutput::checked(1e-3, 1e-4, [0.5, f64::NAN, 0.5]).unwrap_err();
        assert!(matches!(err, ControlError::NonFiniteDuty { t, .. } if t == 1e-3));
    }

    #[test]
    fn accepts_valid_actuation() {
        let out = ControlOutput::checked(0.0, 1e-4, [0.1, 0.5, 0.9]).unwrap();
        assert_eq!(out.t_s, 1e-4);
        assert_eq!(out.d_abc, [0.1, 0.5, 0.9]);
    }
}
