//! Discrete two-degree-of-freedom PI controller.
//!
//! ```text
//! u     = k_t r - k_p y + v
//! u_lim = clamp(u, out_min, out_max)
//! v    += T_s k_i (r - y) + (u_lim - u)
//! ```
//!
//! With `k_t = k_p` (the default) this is the textbook PI on the error. The
//! `u_lim - u` term is back-calculation anti-windup: after a saturated step the
//! integral state is pulled so that the unsaturated output would have matched
//! the realized one.
//!
//! The controller is a pure function of its gains and a separate [`PiState`],
//! so a [`ControlSystem`](crate::ControlSystem) can evaluate it in
//! `compute_output` and commit the returned state in `update`.

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiController {
    pub kp: f64,
    /// Integral gain (1/s).
    pub ki: f64,
    /// Reference feedforward gain.
    pub kt: f64,
    pub out_min: f64,
    pub out_max: f64,
}

impl PiController {
    /// Error-driven PI (`k_t = k_p`) with output limits.
    pub fn new(kp: f64, ki: f64, out_min: f64, out_max: f64) -> ControlResult<Self> {
        if !(kp >= 0.0 && kp.is_finite()) || !(ki >= 0.0 && ki.is_finite()) {
            return Err(ControlError::InvalidArg {
                what: "PI gains must be finite and non-negative",
            });
        }
        if out_min.is_nan() || out_max.is_nan() || out_min >= out_max {
            return Err(ControlError::InvalidArg {
                what: "PI output limits must satisfy out_min < out_max",
            });
        }
        Ok(Self {
            kp,
            ki,
            kt: kp,
            out_min,
            out_max,
        })
    }

    /// Replace the reference feedforward gain; `0` moves the proportional
    /// action entirely onto the measurement.
    pub fn with_reference_gain(mut self, kt: f64) -> Self {
        self.kt = kt;
        self
    }

    /// Saturated output for one sampling period of length `t_s`, and the
    /// state to commit afterwards.
    pub fn output(
        &self,
        state: &PiState,
        reference: f64,
        measured: f64,
        t_s: f64,
    ) -> (PiState, f64) {
        let u = self.kt * reference - self.kp * measured + state.integral;
        let u_lim = u.clamp(self.out_min, self.out_max);
        let integral = state.integral + t_s * self.ki * (reference - measured) + (u_lim - u);
        (PiState { integral }, u_lim)
    }
}

/// Integral state of a [`PiController`], in output units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PiState {
    pub integral: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proportional_only() {
        let pi = PiController::new(2.0, 0.0, -10.0, 10.0).unwrap();
        let (next, u) = pi.output(&PiState::default(), 1.0, 0.5, 0.1);
        assert!((u - 1.0).abs() < 1e-12);
        assert_eq!(next.integral, 0.0);
    }

    #[test]
    fn integral_accumulates_error() {
        let pi = PiController::new(1.0, 1.0, -10.0, 10.0).unwrap();
        let mut state = PiState::default();
        for _ in 0..10 {
            state = pi.output(&state, 1.0, 0.0, 0.1).0;
        }
        assert!((state.integral - 1.0).abs() < 1e-12);
    }

    #[test]
    fn back_calculation_matches_realized_output() {
        let (kp, ki, t_s) = (10.0, 1.0, 0.1);
        let pi = PiController::new(kp, ki, 0.0, 1.0).unwrap();
        let state = PiState { integral: 0.3 };

        let (next, u) = pi.output(&state, 10.0, 0.0, t_s);
        assert_eq!(u, 1.0);
        // Unsaturated output from the new state equals the limit plus one integration step
        let unsat = kp * 10.0 + next.integral;
        assert!((unsat - (1.0 + t_s * ki * 10.0)).abs() < 1e-9);
    }

    #[test]
    fn zero_reference_gain_acts_on_measurement() {
        let pi = PiController::new(2.0, 0.0, -10.0, 10.0)
            .unwrap()
            .with_reference_gain(0.0);
        let (_, u) = pi.output(&PiState::default(), 5.0, 1.0, 0.1);
        assert_eq!(u, -2.0);
    }

    #[test]
    fn invalid_params() {
        assert!(PiController::new(1.0, -1.0, 0.0, 1.0).is_err());
        assert!(PiController::new(f64::NAN, 1.0, 0.0, 1.0).is_err());
        assert!(PiController::new(1.0, 1.0, 1.0, 0.0).is_err());
    }
}
