//! Discrete-time control system contract and its step driver.

use tracing::trace;

use crate::error::ControlResult;
use crate::log::{ControlTables, SignalLog};
use crate::signal::{Actuation, ControlOutput, SignalGroup};

/// A discrete-time controller executed once per sampling period.
///
/// A step runs four phases in order: measurement, feedback, output and
/// update. Only [`update`](Self::update) may change controller state; the
/// other phases take `&self`, so running them twice with the same inputs
/// gives the same result.
pub trait ControlSystem {
    /// What the controller reads sensors from.
    type Plant: ?Sized;
    /// Raw sensor reading.
    type Measurement;
    /// Processed feedback signals, estimator outputs included.
    type Feedback: SignalGroup;
    /// References and actuation for the next sampling period.
    type Reference: SignalGroup + Actuation;

    /// Read sensors without touching the plant.
    fn get_measurement(&self, plant: &Self::Plant) -> ControlResult<Self::Measurement>;

    /// Turn a measurement into feedback from persisted state only.
    fn get_feedback(&self, t: f64, meas: Self::Measurement) -> ControlResult<Self::Feedback>;

    /// Compute references, duty ratios and the next sampling period.
    fn compute_output(&self, t: f64, fbk: &Self::Feedback) -> ControlResult<Self::Reference>;

    /// Advance internal states (integrators, estimators, PWM memory).
    fn update(&mut self, t: f64, reference: &Self::Reference, fbk: &Self::Feedback);
}

/// Runs a [`ControlSystem`] step by step and owns its clock and signal log.
#[derive(Debug)]
pub struct ControlLoop<C> {
    system: C,
    t: f64,
    steps: usize,
    log: SignalLog,
}

impl<C: ControlSystem> ControlLoop<C> {
    pub fn new(system: C) -> Self {
        Self {
            system,
            t: 0.0,
            steps: 0,
            log: SignalLog::new(),
        }
    }

    /// Controller time: start of the next sampling period.
    pub fn t(&self) -> f64 {
        self.t
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn system(&self) -> &C {
        &self.system
    }

    pub fn log(&self) -> &SignalLog {
        &self.log
    }

    /// Execute one control step against the plant.
    ///
    /// The returned actuation is validated (positive finite period, finite
    /// duty ratios) before any controller state is updated, so a rejected
    /// step leaves the controller and the log untouched.
    pub fn step(&mut self, plant: &C::Plant) -> ControlResult<ControlOutput> {
        let meas = self.system.get_measurement(plant)?;
        let fbk = self.system.get_feedback(self.t, meas)?;
        let reference = self.system.compute_output(self.t, &fbk)?;
        let output = ControlOutput::from_actuation(self.t, &reference)?;

        self.system.update(self.t, &reference, &fbk);
        self.log.record(self.t, &fbk);
        self.log.record(self.t, &reference);

        trace!(t = self.t, t_s = output.t_s, d_abc = ?output.d_abc, "control step");
        self.t += output.t_s;
        self.steps += 1;
        Ok(output)
    }

    /// Terminal post-processing of the signal log.
    pub fn into_results(self) -> ControlResult<ControlTables> {
        self.log.into_tables()
    }

    /// Like [`into_results`](Self::into_results), handing the controller back.
    pub fn into_parts(self) -> (C, ControlResult<ControlTables>) {
        (self.system, self.log.into_tables())
    }
}
