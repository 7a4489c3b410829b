//! Piecewise-linear reference profiles.

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// Piecewise-linear profile through `(times[k], values[k])`.
///
/// Repeating a time gives a step. Outside the breakpoints the end values are
/// held, unless the profile is periodic with period `times.last()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    times: Vec<f64>,
    values: Vec<f64>,
    #[serde(default)]
    periodic: bool,
}

impl Sequence {
    pub fn new(times: Vec<f64>, values: Vec<f64>) -> ControlResult<Self> {
        if times.is_empty() || times.len() != values.len() {
            return Err(ControlError::InvalidArg {
                what: "sequence needs equally many times and values, at least one",
            });
        }
        if !hs_core::all_finite(&times) || !hs_core::all_finite(&values) {
            return Err(ControlError::InvalidArg {
                what: "sequence breakpoints must be finite",
            });
        }
        if times.windows(2).any(|w| w[1] < w[0]) {
            return Err(ControlError::InvalidArg {
                what: "sequence times must be non-decreasing",
            });
        }
        Ok(Self {
            times,
            values,
            periodic: false,
        })
    }

    /// Repeat the profile with period equal to the last breakpoint time.
    pub fn periodic(mut self) -> ControlResult<Self> {
        if self.period() <= 0.0 {
            return Err(ControlError::InvalidArg {
                what: "periodic sequence needs a positive last time",
            });
        }
        self.periodic = true;
        Ok(self)
    }

    fn period(&self) -> f64 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Value at time `t`.
    pub fn value(&self, t: f64) -> f64 {
        let t = if self.periodic {
            t.rem_euclid(self.period())
        } else {
            t
        };

        let n = self.times.len();
        if t < self.times[0] {
            return self.values[0];
        }
        if t >= self.times[n - 1] {
            return self.values[n - 1];
        }
        // times[k - 1] <= t < times[k]
        let k = self.times.partition_point(|&x| x <= t);
        let (t0, t1) = (self.times[k - 1], self.times[k]);
        let (y0, y1) = (self.values[k - 1], self.values[k]);
        y0 + (y1 - y0) * (t - t0) / (t1 - t0)
    }
}
