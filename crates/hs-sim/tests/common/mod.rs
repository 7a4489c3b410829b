//! Shared plants and controllers for the simulation tests.

#![allow(dead_code)]

use hs_control::{
    Actuation, ControlError, ControlResult, ControlSystem, PiController, PiState, SampleConfig,
    SignalGroup,
};
use hs_core::{Complex64, Value, ValueKind, abc_to_complex, complex_to_abc, read_complex, write_complex};
use hs_model::{Handle, Model, OutputSpec, PortSpec, StateSpec, Subsystem};

/// Two-level converter: u = u_dc * space vector of the switching state.
pub struct Converter {
    pub u_dc: f64,
}

impl Subsystem for Converter {
    fn name(&self) -> &str {
        "converter"
    }
    fn inputs(&self) -> &[PortSpec] {
        const IN: [PortSpec; 1] = [PortSpec::new("q_abc", ValueKind::Abc)];
        &IN
    }
    fn outputs(&self) -> &[OutputSpec] {
        const OUT: [OutputSpec; 1] =
            [OutputSpec::feedthrough("u", ValueKind::Complex, &["q_abc"])];
        &OUT
    }
    fn set_outputs(&self, _t: f64, _x: &[f64], u: &[Value], y: &mut [Value]) {
        y[0] = Value::Complex(self.u_dc * abc_to_complex(u[0].abc()));
    }
}

/// Series RL load: L di/dt = u - R i.
pub struct RlLoad {
    pub l: f64,
    pub r: f64,
    pub i0: Complex64,
}

impl RlLoad {
    pub fn meas_current(state: &[f64]) -> Complex64 {
        read_complex(state, 0)
    }
}

impl Subsystem for RlLoad {
    fn name(&self) -> &str {
        "load"
    }
    fn inputs(&self) -> &[PortSpec] {
        const IN: [PortSpec; 1] = [PortSpec::new("u", ValueKind::Complex)];
        &IN
    }
    fn outputs(&self) -> &[OutputSpec] {
        const OUT: [OutputSpec; 1] = [OutputSpec::state("i", ValueKind::Complex)];
        &OUT
    }
    fn states(&self) -> &[StateSpec] {
        const STATES: [StateSpec; 1] = [StateSpec::new("i", ValueKind::Complex)];
        &STATES
    }
    fn initial_state(&self, x: &mut [f64]) {
        write_complex(x, 0, self.i0);
    }
    fn set_outputs(&self, _t: f64, x: &[f64], _u: &[Value], y: &mut [Value]) {
        y[0] = Value::Complex(read_complex(x, 0));
    }
    fn rhs(&self, _t: f64, x: &[f64], u: &[Value], dx: &mut [f64]) {
        let i = read_complex(x, 0);
        write_complex(dx, 0, (u[0].complex() - self.r * i) / self.l);
    }
}

/// dx/dt = -a x
pub struct Decay {
    pub a: f64,
    pub x0: f64,
}

impl Subsystem for Decay {
    fn name(&self) -> &str {
        "decay"
    }
    fn outputs(&self) -> &[OutputSpec] {
        const OUT: [OutputSpec; 1] = [OutputSpec::state("x", ValueKind::Real)];
        &OUT
    }
    fn states(&self) -> &[StateSpec] {
        const STATES: [StateSpec; 1] = [StateSpec::new("x", ValueKind::Real)];
        &STATES
    }
    fn initial_state(&self, x: &mut [f64]) {
        x[0] = self.x0;
    }
    fn set_outputs(&self, _t: f64, x: &[f64], _u: &[Value], y: &mut [Value]) {
        y[0] = Value::Real(x[0]);
    }
    fn rhs(&self, _t: f64, x: &[f64], _u: &[Value], dx: &mut [f64]) {
        dx[0] = -self.a * x[0];
    }
}

/// Ramp whose derivative turns NaN from `t_bad` on.
pub struct Faulty {
    pub t_bad: f64,
}

impl Subsystem for Faulty {
    fn name(&self) -> &str {
        "faulty"
    }
    fn outputs(&self) -> &[OutputSpec] {
        const OUT: [OutputSpec; 1] = [OutputSpec::state("x", ValueKind::Real)];
        &OUT
    }
    fn states(&self) -> &[StateSpec] {
        const STATES: [StateSpec; 1] = [StateSpec::new("x", ValueKind::Real)];
        &STATES
    }
    fn set_outputs(&self, _t: f64, x: &[f64], _u: &[Value], y: &mut [Value]) {
        y[0] = Value::Real(x[0]);
    }
    fn rhs(&self, t: f64, _x: &[f64], _u: &[Value], dx: &mut [f64]) {
        dx[0] = if t >= self.t_bad { f64::NAN } else { 1.0 };
    }
}

/// Step counter logged as feedback.
pub struct Tick {
    pub k: f64,
}

impl SignalGroup for Tick {
    const GROUP: &'static str = "tick";
    fn signals(&self) -> Vec<(&'static str, Value)> {
        vec![("k", self.k.into())]
    }
}

pub struct Duty {
    pub t_s: f64,
    pub d_abc: [f64; 3],
}

impl SignalGroup for Duty {
    const GROUP: &'static str = "duty";
    fn signals(&self) -> Vec<(&'static str, Value)> {
        vec![("t_s", self.t_s.into()), ("d_abc", self.d_abc.into())]
    }
}

impl Actuation for Duty {
    fn t_s(&self) -> f64 {
        self.t_s
    }
    fn d_abc(&self) -> [f64; 3] {
        self.d_abc
    }
}

/// Open-loop controller playing back duty ratios by step index.
pub struct OpenLoop {
    pub t_s: f64,
    pub duty: fn(usize) -> [f64; 3],
    pub steps: usize,
}

impl OpenLoop {
    pub fn new(t_s: f64, duty: fn(usize) -> [f64; 3]) -> Self {
        Self { t_s, duty, steps: 0 }
    }
}

impl ControlSystem for OpenLoop {
    type Plant = Model;
    type Measurement = ();
    type Feedback = Tick;
    type Reference = Duty;

    fn get_measurement(&self, _plant: &Model) -> ControlResult<()> {
        Ok(())
    }

    fn get_feedback(&self, _t: f64, _meas: ()) -> ControlResult<Tick> {
        Ok(Tick {
            k: self.steps as f64,
        })
    }

    fn compute_output(&self, _t: f64, _fbk: &Tick) -> ControlResult<Duty> {
        Ok(Duty {
            t_s: self.t_s,
            d_abc: (self.duty)(self.steps),
        })
    }

    fn update(&mut self, _t: f64, _reference: &Duty, _fbk: &Tick) {
        self.steps += 1;
    }
}

pub struct CurrentFbk {
    pub i: Complex64,
}

impl SignalGroup for CurrentFbk {
    const GROUP: &'static str = "fbk";
    fn signals(&self) -> Vec<(&'static str, Value)> {
        vec![("i", self.i.into())]
    }
}

pub struct CurrentRef {
    pub t_s: f64,
    pub i_ref: f64,
    pub u_ref: Complex64,
    pub d_abc: [f64; 3],
    pub pi_next: PiState,
}

impl SignalGroup for CurrentRef {
    const GROUP: &'static str = "ref";
    fn signals(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("i_ref", self.i_ref.into()),
            ("u_ref", self.u_ref.into()),
            ("d_abc", self.d_abc.into()),
        ]
    }
}

impl Actuation for CurrentRef {
    fn t_s(&self) -> f64 {
        self.t_s
    }
    fn d_abc(&self) -> [f64; 3] {
        self.d_abc
    }
}

/// PI current control of the real axis; the imaginary axis is held at zero voltage.
pub struct CurrentCtrl {
    pub load: Handle<RlLoad>,
    pub pi: PiController,
    pub state: PiState,
    pub sample: SampleConfig,
    pub u_dc: f64,
    pub i_ref: f64,
}

impl ControlSystem for CurrentCtrl {
    type Plant = Model;
    type Measurement = Complex64;
    type Feedback = CurrentFbk;
    type Reference = CurrentRef;

    fn get_measurement(&self, plant: &Model) -> ControlResult<Complex64> {
        let view = plant.view(self.load).map_err(|_| ControlError::InvalidArg {
            what: "load is not part of the model",
        })?;
        Ok(RlLoad::meas_current(view.state))
    }

    fn get_feedback(&self, _t: f64, i: Complex64) -> ControlResult<CurrentFbk> {
        Ok(CurrentFbk { i })
    }

    fn compute_output(&self, _t: f64, fbk: &CurrentFbk) -> ControlResult<CurrentRef> {
        let t_s = self.sample.t_s;
        let (pi_next, u_re) = self.pi.output(&self.state, self.i_ref, fbk.i.re, t_s);
        let u_ref = Complex64::new(u_re, 0.0);
        Ok(CurrentRef {
            t_s,
            i_ref: self.i_ref,
            u_ref,
            d_abc: complex_to_abc(u_ref).map(|u| 0.5 + u / self.u_dc),
            pi_next,
        })
    }

    fn update(&mut self, _t: f64, reference: &CurrentRef, _fbk: &CurrentFbk) {
        self.state = reference.pi_next;
    }
}

/// Route library logs to the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
