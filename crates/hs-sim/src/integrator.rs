//! ODE integrators for one switching sub-interval.
//!
//! Every integrator returns a [`Trajectory`] whose first sample is the start of
//! the span and whose last sample is exactly its end.

use hs_model::Model;

use crate::error::{SimError, SimResult};

/// A system of first-order ODEs, `dx/dt = f(t, x)`.
pub trait OdeSystem {
    fn dim(&self) -> usize;

    /// Write `f(t, x)` into `dx`.
    ///
    /// Takes `&mut self` so implementations can refresh cached outputs.
    fn rhs(&mut self, t: f64, x: &[f64], dx: &mut [f64]) -> SimResult<()>;
}

impl OdeSystem for Model {
    fn dim(&self) -> usize {
        Model::dim(self)
    }

    fn rhs(&mut self, t: f64, x: &[f64], dx: &mut [f64]) -> SimResult<()> {
        Ok(Model::rhs(self, t, x, dx)?)
    }
}

/// Samples produced by integrating across one span.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    dim: usize,
    /// Sample times, from the span start to exactly the span end.
    pub t: Vec<f64>,
    /// States, one row of `dim` values per sample.
    pub x: Vec<f64>,
    /// Right-hand side evaluations spent.
    pub rhs_evals: usize,
    /// Rejected adaptive steps.
    pub rejected: usize,
}

impl Trajectory {
    fn start(t0: f64, x0: &[f64]) -> Self {
        Self {
            dim: x0.len(),
            t: vec![t0],
            x: x0.to_vec(),
            rhs_evals: 0,
            rejected: 0,
        }
    }

    fn push(&mut self, t: f64, x: &[f64]) {
        self.t.push(t);
        self.x.extend_from_slice(x);
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn row(&self, k: usize) -> &[f64] {
        &self.x[k * self.dim..(k + 1) * self.dim]
    }

    /// Final state.
    pub fn last(&self) -> &[f64] {
        &self.x[self.x.len() - self.dim..]
    }

    /// Index of the first sample holding a NaN or infinite state.
    pub fn first_non_finite(&self) -> Option<usize> {
        if self.dim == 0 {
            return None;
        }
        hs_core::first_non_finite(&self.x).map(|(i, _)| i / self.dim)
    }
}

/// Trait for time integrators.
pub trait Integrator {
    /// Integrate `sys` from `x0` across `span = (t0, t1)`.
    fn integrate<S: OdeSystem + ?Sized>(
        &self,
        sys: &mut S,
        span: (f64, f64),
        x0: &[f64],
    ) -> SimResult<Trajectory>;
}

fn check_span<S: OdeSystem + ?Sized>(sys: &S, span: (f64, f64), x0: &[f64]) -> SimResult<f64> {
    let (t0, t1) = span;
    if !t0.is_finite() || !t1.is_finite() || t1 < t0 {
        return Err(SimError::InvalidArg {
            what: "integration span must be finite and ordered",
        });
    }
    if x0.len() != sys.dim() {
        return Err(SimError::InvalidArg {
            what: "initial state length does not match system dimension",
        });
    }
    Ok(t1 - t0)
}

/// Number and length of equal steps no longer than `max_step`.
fn fixed_steps(len: f64, max_step: f64) -> (usize, f64) {
    if len == 0.0 {
        return (0, 0.0);
    }
    let n = if max_step.is_finite() {
        ((len / max_step).ceil() as usize).max(1)
    } else {
        1
    };
    (n, len / n as f64)
}

/// Sample time after step `k` of `n`; the last one is the span end itself.
fn step_end(span: (f64, f64), k: usize, n: usize, h: f64) -> f64 {
    if k + 1 == n {
        span.1
    } else {
        span.0 + (k + 1) as f64 * h
    }
}

/// Forward Euler (explicit, 1st order, fast for testing).
/// Calls rhs() once per step instead of 4 times (RK4).
#[derive(Clone, Copy, Debug)]
pub struct ForwardEuler {
    pub max_step: f64,
}

impl Integrator for ForwardEuler {
    fn integrate<S: OdeSystem + ?Sized>(
        &self,
        sys: &mut S,
        span: (f64, f64),
        x0: &[f64],
    ) -> SimResult<Trajectory> {
        let len = check_span(sys, span, x0)?;
        let (n, h) = fixed_steps(len, self.max_step);

        let mut traj = Trajectory::start(span.0, x0);
        let mut x = x0.to_vec();
        let mut dx = vec![0.0; x.len()];
        for k in 0..n {
            sys.rhs(span.0 + k as f64 * h, &x, &mut dx)?;
            for (xi, di) in x.iter_mut().zip(&dx) {
                *xi += h * di;
            }
            traj.push(step_end(span, k, n, h), &x);
        }
        traj.rhs_evals = n;
        Ok(traj)
    }
}

/// Classical RK4 (Runge-Kutta 4th order) integrator.
#[derive(Clone, Copy, Debug)]
pub struct Rk4 {
    pub max_step: f64,
}

impl Integrator for Rk4 {
    fn integrate<S: OdeSystem + ?Sized>(
        &self,
        sys: &mut S,
        span: (f64, f64),
        x0: &[f64],
    ) -> SimResult<Trajectory> {
        let len = check_span(sys, span, x0)?;
        let (n, h) = fixed_steps(len, self.max_step);
        let dim = x0.len();

        let mut traj = Trajectory::start(span.0, x0);
        let mut x = x0.to_vec();
        let mut tmp = vec![0.0; dim];
        let (mut k1, mut k2, mut k3, mut k4) =
            (vec![0.0; dim], vec![0.0; dim], vec![0.0; dim], vec![0.0; dim]);

        for k in 0..n {
            let t = span.0 + k as f64 * h;
            sys.rhs(t, &x, &mut k1)?;

            for i in 0..dim {
                tmp[i] = x[i] + 0.5 * h * k1[i];
            }
            sys.rhs(t + 0.5 * h, &tmp, &mut k2)?;

            for i in 0..dim {
                tmp[i] = x[i] + 0.5 * h * k2[i];
            }
            sys.rhs(t + 0.5 * h, &tmp, &mut k3)?;

            for i in 0..dim {
                tmp[i] = x[i] + h * k3[i];
            }
            sys.rhs(t + h, &tmp, &mut k4)?;

            // x_new = x + (h/6) * (k1 + 2*k2 + 2*k3 + k4)
            for i in 0..dim {
                x[i] += h / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
            }
            traj.push(step_end(span, k, n, h), &x);
        }
        traj.rhs_evals = 4 * n;
        Ok(traj)
    }
}

// Dormand-Prince 5(4) tableau
const DP_C: [f64; 7] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];

#[rustfmt::skip]
const DP_A: [&[f64]; 6] = [
    &[1.0 / 5.0],
    &[3.0 / 40.0, 9.0 / 40.0],
    &[44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0],
    &[19372.0 / 6561.0, -25360.0 / 2187.0, 64448.0 / 6561.0, -212.0 / 729.0],
    &[9017.0 / 3168.0, -355.0 / 33.0, 46732.0 / 5247.0, 49.0 / 176.0, -5103.0 / 18656.0],
    &[35.0 / 384.0, 0.0, 500.0 / 1113.0, 125.0 / 192.0, -2187.0 / 6784.0, 11.0 / 84.0],
];

// Difference between the 5th and embedded 4th order weights
const DP_E: [f64; 7] = [
    71.0 / 57600.0,
    0.0,
    -71.0 / 16695.0,
    71.0 / 1920.0,
    -17253.0 / 339200.0,
    22.0 / 525.0,
    -1.0 / 40.0,
];

/// Dormand-Prince 5(4) adaptive solver (DOPRI5).
///
/// Seven stages with the FSAL property: the last stage of an accepted step
/// is the first stage of the next. Steps are bounded by `max_step`; a
/// rejected step smaller than `min_step` aborts with
/// [`SimError::StepSizeUnderflow`].
#[derive(Clone, Copy, Debug)]
pub struct DormandPrince45 {
    pub rtol: f64,
    pub atol: f64,
    pub max_step: f64,
    pub min_step: f64,
}

impl DormandPrince45 {
    const SAFETY: f64 = 0.9;

    /// Scaled max-norm of the local error estimate.
    fn error_norm(&self, h: f64, x: &[f64], y: &[f64], k: &[Vec<f64>]) -> f64 {
        let mut norm: f64 = 1e-16;
        for i in 0..x.len() {
            let err: f64 = DP_E.iter().zip(k).map(|(e, ki)| e * ki[i]).sum();
            let scale = self.atol + self.rtol * x[i].abs().max(y[i].abs());
            norm = norm.max((h * err / scale).abs());
        }
        norm
    }
}

impl Integrator for DormandPrince45 {
    fn integrate<S: OdeSystem + ?Sized>(
        &self,
        sys: &mut S,
        span: (f64, f64),
        x0: &[f64],
    ) -> SimResult<Trajectory> {
        let len = check_span(sys, span, x0)?;
        let (t0, t1) = span;
        let dim = x0.len();

        let mut traj = Trajectory::start(t0, x0);
        if len == 0.0 {
            return Ok(traj);
        }

        let mut x = x0.to_vec();
        let mut y = vec![0.0; dim];
        let mut k = vec![vec![0.0; dim]; 7];
        sys.rhs(t0, &x, &mut k[0])?;
        traj.rhs_evals += 1;

        let mut t = t0;
        let mut h = self.max_step.min(len);
        loop {
            let remaining = t1 - t;
            let last = h >= remaining * (1.0 - 1e-12);
            if last {
                h = remaining;
            }

            for s in 1..7 {
                let (done, rest) = k.split_at_mut(s);
                for i in 0..dim {
                    let acc: f64 = DP_A[s - 1].iter().zip(done.iter()).map(|(a, kj)| a * kj[i]).sum();
                    y[i] = x[i] + h * acc;
                }
                sys.rhs(t + DP_C[s] * h, &y, &mut rest[0])?;
            }
            traj.rhs_evals += 6;

            if !hs_core::all_finite(&y) || !hs_core::all_finite(&k[6]) {
                return Err(SimError::NonFinite { t });
            }

            let err = self.error_norm(h, &x, &y, &k);
            let accepted = err <= 1.0;
            let mut factor = (Self::SAFETY * err.powf(-0.2)).clamp(0.1, 10.0);

            if accepted {
                t = if last { t1 } else { t + h };
                x.copy_from_slice(&y);
                traj.push(t, &x);
                k.swap(0, 6);
                if last {
                    break;
                }
            } else {
                traj.rejected += 1;
                factor = factor.min(1.0);
            }

            h = (h * factor).min(self.max_step);
            if !accepted && h < self.min_step {
                return Err(SimError::StepSizeUnderflow { t, h });
            }
        }
        Ok(traj)
    }
}
