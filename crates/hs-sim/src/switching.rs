//! Switching schemes: duty ratios to piecewise-constant switching states.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// One piece of a sampling period with a constant switching state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubInterval {
    /// Length in seconds; zero-length pieces are allowed.
    pub duration: f64,
    /// Switching state held during the piece.
    pub q_abc: [f64; 3],
}

/// Converts the duty ratios of one sampling period into sub-intervals.
///
/// The durations of a returned sequence sum to the sampling period.
pub trait SwitchingScheme {
    fn sequence(&mut self, t_s: f64, d_abc: [f64; 3]) -> SimResult<Vec<SubInterval>>;
}

/// Switching-cycle averaged model: the duty ratios are applied as a
/// continuous switching state for the whole period.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ZeroOrderHold;

impl SwitchingScheme for ZeroOrderHold {
    fn sequence(&mut self, t_s: f64, d_abc: [f64; 3]) -> SimResult<Vec<SubInterval>> {
        Ok(vec![SubInterval {
            duration: t_s,
            q_abc: d_abc,
        }])
    }
}

/// Carrier comparison with a symmetric triangular carrier.
///
/// Each period is one half of the carrier: the duty ratios are quantized to
/// `levels` steps (modelling a finite-resolution PWM counter), sorted, and the
/// resulting four sub-intervals are emitted in ascending order on a falling
/// carrier edge and in descending order on a rising edge.
#[derive(Debug, Clone, PartialEq)]
pub struct CarrierComparison {
    levels: u32,
    /// Direction of the carrier in the next period.
    pub rising_edge: bool,
}

impl CarrierComparison {
    pub const DEFAULT_LEVELS: u32 = 4096;

    pub fn new(levels: u32) -> SimResult<Self> {
        if levels == 0 {
            return Err(SimError::InvalidArg {
                what: "carrier comparison needs at least one quantization level",
            });
        }
        Ok(Self {
            levels,
            rising_edge: true,
        })
    }

    pub fn levels(&self) -> u32 {
        self.levels
    }

    fn quantize(&self, d: f64) -> f64 {
        let n = f64::from(self.levels);
        (n * d.clamp(0.0, 1.0)).round() / n
    }
}

impl Default for CarrierComparison {
    fn default() -> Self {
        Self {
            levels: Self::DEFAULT_LEVELS,
            rising_edge: true,
        }
    }
}

impl SwitchingScheme for CarrierComparison {
    fn sequence(&mut self, t_s: f64, d_abc: [f64; 3]) -> SimResult<Vec<SubInterval>> {
        if d_abc.iter().any(|d| d.is_nan()) {
            return Err(SimError::InvalidArg {
                what: "duty ratio is NaN",
            });
        }
        let d = d_abc.map(|d| self.quantize(d));

        // Switching instants, normalized to the period
        let mut tn = [0.0, d[0], d[1], d[2]];
        tn[1..].sort_by(f64::total_cmp);

        let mut seq: Vec<SubInterval> = (0..4)
            .map(|i| {
                let end = if i == 3 { 1.0 } else { tn[i + 1] };
                SubInterval {
                    duration: t_s * (end - tn[i]),
                    q_abc: d.map(|dp| if tn[i] < dp { 1.0 } else { 0.0 }),
                }
            })
            .collect();

        if self.rising_edge {
            seq.reverse();
        }
        self.rising_edge = !self.rising_edge;
        Ok(seq)
    }
}

/// Switching scheme selection for [`SimOptions`](crate::SimOptions).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SwitchingKind {
    #[default]
    ZeroOrderHold,
    CarrierComparison { levels: u32 },
}

impl SwitchingKind {
    pub fn build(self) -> SimResult<Box<dyn SwitchingScheme>> {
        Ok(match self {
            Self::ZeroOrderHold => Box::new(ZeroOrderHold),
            Self::CarrierComparison { levels } => Box::new(CarrierComparison::new(levels)?),
        })
    }
}
