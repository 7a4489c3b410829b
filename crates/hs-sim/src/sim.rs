//! Simulation options and the hybrid simulation driver.

use std::time::Instant;

use hs_control::{ControlLoop, ControlSystem};
use hs_core::{Tolerances, nearly_equal};
use hs_model::Model;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace, warn};

use crate::delay::ComputationalDelay;
use crate::error::{SimError, SimResult};
use crate::integrator::{DormandPrince45, ForwardEuler, Integrator, OdeSystem, Rk4, Trajectory};
use crate::results::SimResults;
use crate::stats::{RunStats, SimProgress};
use crate::switching::{SwitchingKind, SwitchingScheme};

/// Integrator selection for simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorType {
    /// Adaptive Dormand-Prince 5(4) (default).
    #[default]
    DormandPrince45,
    /// 4th-order Runge-Kutta, fixed steps no longer than `max_step`.
    Rk4,
    /// Forward Euler (1st-order, 1 rhs call per step).
    ForwardEuler,
}

/// Options for simulation runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimOptions {
    /// Integrator type (default: Dormand-Prince 5(4))
    pub integrator: IntegratorType,
    /// Longest integration step (seconds); unbounded by default
    pub max_step: f64,
    /// Relative tolerance of the adaptive integrator
    pub rtol: f64,
    /// Absolute tolerance of the adaptive integrator
    pub atol: f64,
    /// Smallest step the adaptive integrator may shrink to (seconds)
    pub min_step: f64,
    /// Computational delay in sampling periods
    pub delay: usize,
    /// Duty ratios output by the delay before the first controller result
    pub delay_neutral: [f64; 3],
    /// How duty ratios become switching states
    pub switching: SwitchingKind,
    /// Maximum number of sampling periods per run (safety limit)
    pub max_periods: usize,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            integrator: IntegratorType::default(),
            max_step: f64::INFINITY,
            rtol: 1e-6,
            atol: 1e-9,
            min_step: 1e-14,
            delay: 1,
            delay_neutral: [0.0; 3],
            switching: SwitchingKind::default(),
            max_periods: 10_000_000,
        }
    }
}

impl SimOptions {
    /// Parse options from YAML; missing fields take their defaults.
    pub fn from_yaml_str(yaml: &str) -> SimResult<Self> {
        let opts: Self = serde_yaml::from_str(yaml)?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn to_yaml_string(&self) -> SimResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.max_step.is_nan() || self.max_step <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "max_step must be positive",
            });
        }
        if !(self.rtol > 0.0) || !(self.atol > 0.0) {
            return Err(SimError::InvalidArg {
                what: "rtol and atol must be positive",
            });
        }
        if !(self.min_step > 0.0) || self.min_step > self.max_step {
            return Err(SimError::InvalidArg {
                what: "min_step must be positive and not exceed max_step",
            });
        }
        if !hs_core::all_finite(&self.delay_neutral) {
            return Err(SimError::InvalidArg {
                what: "delay_neutral must be finite",
            });
        }
        if let SwitchingKind::CarrierComparison { levels: 0 } = self.switching {
            return Err(SimError::InvalidArg {
                what: "carrier comparison levels must be positive",
            });
        }
        if self.max_periods == 0 {
            return Err(SimError::InvalidArg {
                what: "max_periods must be positive",
            });
        }
        Ok(())
    }

    /// Integrate one span with the selected integrator.
    pub fn integrate<S: OdeSystem + ?Sized>(
        &self,
        sys: &mut S,
        span: (f64, f64),
        x0: &[f64],
    ) -> SimResult<Trajectory> {
        match self.integrator {
            IntegratorType::DormandPrince45 => DormandPrince45 {
                rtol: self.rtol,
                atol: self.atol,
                max_step: self.max_step,
                min_step: self.min_step,
            }
            .integrate(sys, span, x0),
            IntegratorType::Rk4 => Rk4 {
                max_step: self.max_step,
            }
            .integrate(sys, span, x0),
            IntegratorType::ForwardEuler => ForwardEuler {
                max_step: self.max_step,
            }
            .integrate(sys, span, x0),
        }
    }
}

/// Tolerance for comparing simulation and controller clocks.
const CLOCK_TOL: Tolerances = Tolerances::TIGHT;

/// Hybrid simulation: a discrete controller driving a continuous plant.
///
/// Each sampling period runs one control step, delays its duty ratios, splits
/// the period into switching sub-intervals and integrates the plant across
/// each of them in turn.
pub struct Simulation<C: ControlSystem<Plant = Model>> {
    model: Model,
    ctrl: ControlLoop<C>,
    delay: ComputationalDelay,
    switching: Box<dyn SwitchingScheme>,
    opts: SimOptions,
    stats: RunStats,
}

impl<C: ControlSystem<Plant = Model>> Simulation<C> {
    pub fn new(model: Model, ctrl: C, opts: SimOptions) -> SimResult<Self> {
        opts.validate()?;
        Ok(Self {
            model,
            ctrl: ControlLoop::new(ctrl),
            delay: ComputationalDelay::with_neutral(opts.delay, opts.delay_neutral),
            switching: opts.switching.build()?,
            opts,
            stats: RunStats::default(),
        })
    }

    /// Replace the switching scheme built from the options.
    pub fn with_switching(mut self, scheme: Box<dyn SwitchingScheme>) -> Self {
        self.switching = scheme;
        self
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn control(&self) -> &ControlLoop<C> {
        &self.ctrl
    }

    pub fn options(&self) -> &SimOptions {
        &self.opts
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Simulate until `t_stop`.
    pub fn run(&mut self, t_stop: f64) -> SimResult<()> {
        self.run_with_progress(t_stop, |_| {})
    }

    /// Simulate until `t_stop`, reporting progress after every sampling period.
    ///
    /// A run can be continued by calling this again with a later stop time.
    /// On a non-finite state the run stops with [`SimError::NonFinite`] and
    /// the history recorded so far is kept.
    pub fn run_with_progress<F>(&mut self, t_stop: f64, mut on_progress: F) -> SimResult<()>
    where
        F: FnMut(&SimProgress),
    {
        if !t_stop.is_finite() || t_stop < self.model.t() {
            return Err(SimError::InvalidArg {
                what: "t_stop must be finite and not before the current time",
            });
        }

        info!(
            t_start = self.model.t(),
            t_stop,
            integrator = ?self.opts.integrator,
            switching = ?self.opts.switching,
            delay = self.opts.delay,
            "simulation started"
        );
        let wall = Instant::now();
        let result = self.run_until(t_stop, &mut on_progress);
        self.stats.wall_time_s += wall.elapsed().as_secs_f64();

        match &result {
            Ok(()) => info!(
                t = self.model.t(),
                periods = self.stats.periods,
                sub_intervals = self.stats.sub_intervals,
                skipped = self.stats.skipped_sub_intervals,
                rhs_evals = self.stats.rhs_evals,
                wall_time_s = self.stats.wall_time_s,
                "simulation finished"
            ),
            Err(e) => error!(t = self.model.t(), error = %e, "simulation aborted"),
        }
        result
    }

    fn run_until<F>(&mut self, t_stop: f64, on_progress: &mut F) -> SimResult<()>
    where
        F: FnMut(&SimProgress),
    {
        let t_start = self.model.t();
        let mut periods = 0;

        while !self.reached(t_stop) {
            if periods >= self.opts.max_periods {
                return Err(SimError::InvalidArg {
                    what: "max_periods reached before t_stop",
                });
            }
            let t_s = self.step_period()?;
            periods += 1;
            self.stats.periods += 1;
            on_progress(&SimProgress::new(
                t_start,
                self.model.t(),
                t_stop,
                self.stats.periods,
                t_s,
            ));
        }
        Ok(())
    }

    fn reached(&self, t_stop: f64) -> bool {
        let t = self.model.t();
        t >= t_stop || nearly_equal(t, t_stop, CLOCK_TOL)
    }

    /// One control step followed by the plant integration over its period.
    fn step_period(&mut self) -> SimResult<f64> {
        let t0 = self.model.t();
        if !nearly_equal(self.ctrl.t(), t0, CLOCK_TOL) {
            return Err(SimError::Invariant {
                what: format!(
                    "controller clock {} out of step with model clock {}",
                    self.ctrl.t(),
                    t0
                ),
            });
        }

        let out = self.ctrl.step(&self.model)?;
        let d_abc = self.delay.push(out.d_abc);
        let seq = self.switching.sequence(out.t_s, d_abc)?;
        let t_end = t0 + out.t_s;
        debug!(t = t0, t_s = out.t_s, sub_intervals = seq.len(), "sampling period");

        let last = seq.iter().rposition(|s| s.duration > 0.0);
        let mut t = t0;
        for (k, sub) in seq.iter().enumerate() {
            if sub.duration <= 0.0 {
                self.stats.skipped_sub_intervals += 1;
                continue;
            }
            let t1 = if Some(k) == last { t_end } else { t + sub.duration };
            self.integrate_sub_interval(t, t1, sub.q_abc)?;
            t = t1;
        }
        self.model.advance_to(t_end);
        Ok(out.t_s)
    }

    fn integrate_sub_interval(&mut self, t0: f64, t1: f64, q_abc: [f64; 3]) -> SimResult<()> {
        self.model.set_switching_state(q_abc);
        self.model.interconnect();
        let x0 = self.model.initial_values();

        let traj = match self.opts.integrate(&mut self.model, (t0, t1), &x0) {
            Ok(traj) => traj,
            Err(SimError::NonFinite { t }) => {
                warn!(t, "non-finite state inside sub-interval");
                return Err(SimError::NonFinite { t });
            }
            Err(e) => return Err(e),
        };
        self.stats.rhs_evals += traj.rhs_evals;
        self.stats.rejected_steps += traj.rejected;

        if let Some(k) = traj.first_non_finite() {
            let dim = self.model.dim();
            self.model.save(&traj.t[..k], &traj.x[..k * dim])?;
            warn!(t = traj.t[k], "non-finite state in trajectory");
            return Err(SimError::NonFinite { t: traj.t[k] });
        }

        self.model.save(&traj.t, &traj.x)?;
        self.model.set_states(traj.last())?;
        self.model.advance_to(t1);
        self.model.set_outputs(t1);
        self.stats.sub_intervals += 1;
        trace!(t0, t1, q_abc = ?q_abc, samples = traj.len(), "sub-interval integrated");
        Ok(())
    }

    /// Terminal post-processing; consumes the simulation.
    ///
    /// Works after a failed run as well, returning everything recorded up to
    /// the failure.
    pub fn finish(self) -> SimResult<SimResults> {
        let model = self.model.post_process()?;
        let control = self.ctrl.into_results()?;
        Ok(SimResults {
            model,
            control,
            stats: self.stats,
        })
    }
}
