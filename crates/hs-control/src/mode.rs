//! Output-mode resolution for drive controllers.

use core::fmt;

use crate::error::{ControlError, ControlResult};

/// Time-dependent reference.
pub type RefFn = Box<dyn Fn(f64) -> f64>;

/// Which loop drives the actuation during a step, with its reference value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    /// Speed control, reference in rad/s.
    Speed(f64),
    /// Torque control, reference in Nm.
    Torque(f64),
}

/// Speed and torque reference functions of a controller.
///
/// When both are set, speed control wins and the torque reference is left to
/// the controller (for example as a feedforward term).
#[derive(Default)]
pub struct ModeSelector {
    speed_ref: Option<RefFn>,
    torque_ref: Option<RefFn>,
}

impl ModeSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_speed_ref(mut self, f: impl Fn(f64) -> f64 + 'static) -> Self {
        self.speed_ref = Some(Box::new(f));
        self
    }

    pub fn with_torque_ref(mut self, f: impl Fn(f64) -> f64 + 'static) -> Self {
        self.torque_ref = Some(Box::new(f));
        self
    }

    pub fn set_speed_ref(&mut self, f: impl Fn(f64) -> f64 + 'static) {
        self.speed_ref = Some(Box::new(f));
    }

    pub fn set_torque_ref(&mut self, f: impl Fn(f64) -> f64 + 'static) {
        self.torque_ref = Some(Box::new(f));
    }

    /// Torque reference at `t`, if one is configured.
    pub fn torque_ref(&self, t: f64) -> Option<f64> {
        self.torque_ref.as_ref().map(|f| f(t))
    }

    /// Resolve the active mode at `t`.
    ///
    /// A controller with neither reference set is misconfigured.
    pub fn resolve(&self, t: f64) -> ControlResult<OutputMode> {
        match (&self.speed_ref, &self.torque_ref) {
            (Some(f), _) => Ok(OutputMode::Speed(f(t))),
            (None, Some(f)) => Ok(OutputMode::Torque(f(t))),
            (None, None) => Err(ControlError::NoOutputMode),
        }
    }
}

impl fmt::Debug for ModeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeSelector")
            .field("speed_ref", &self.speed_ref.is_some())
            .field("torque_ref", &self.torque_ref.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neither_reference_is_an_error() {
        let sel = ModeSelector::new();
        assert_eq!(sel.resolve(0.0), Err(ControlError::NoOutputMode));
    }

    #[test]
    fn speed_takes_precedence() {
        let sel = ModeSelector::new()
            .with_torque_ref(|_| 5.0)
            .with_speed_ref(|t| 100.0 * t);
        assert_eq!(sel.resolve(0.5).unwrap(), OutputMode::Speed(50.0));
        assert_eq!(sel.torque_ref(0.5), Some(5.0));
    }

    #[test]
    fn torque_only() {
        let mut sel = ModeSelector::new();
        sel.set_torque_ref(|_| -2.0);
        assert_eq!(sel.resolve(1.0).unwrap(), OutputMode::Torque(-2.0));
    }
}
