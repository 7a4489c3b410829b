//! Integration tests for the control step driver.

use hs_control::{
    Actuation, ControlError, ControlLoop, ControlResult, ControlSystem, ModeSelector, OutputMode,
    PiController, PiState, SignalGroup,
};
use hs_core::{Column, Value};

struct Motor {
    w_m: f64,
}

struct Fbk {
    w_m: f64,
}

impl SignalGroup for Fbk {
    const GROUP: &'static str = "fbk";
    fn signals(&self) -> Vec<(&'static str, Value)> {
        vec![("w_m", self.w_m.into())]
    }
}

struct Ref {
    t_s: f64,
    w_m: f64,
    u: f64,
    d_abc: [f64; 3],
    pi_next: PiState,
}

impl SignalGroup for Ref {
    const GROUP: &'static str = "ref";
    fn signals(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("w_m", self.w_m.into()),
            ("u", self.u.into()),
            ("d_abc", self.d_abc.into()),
        ]
    }
}

impl Actuation for Ref {
    fn t_s(&self) -> f64 {
        self.t_s
    }
    fn d_abc(&self) -> [f64; 3] {
        self.d_abc
    }
}

struct SpeedCtrl {
    modes: ModeSelector,
    pi: PiController,
    state: PiState,
    t_s: f64,
    updates: usize,
}

impl SpeedCtrl {
    fn new(modes: ModeSelector) -> Self {
        Self {
            modes,
            pi: PiController::new(0.01, 1.0, -0.5, 0.5).unwrap(),
            state: PiState::default(),
            t_s: 1e-3,
            updates: 0,
        }
    }
}

impl ControlSystem for SpeedCtrl {
    type Plant = Motor;
    type Measurement = f64;
    type Feedback = Fbk;
    type Reference = Ref;

    fn get_measurement(&self, plant: &Motor) -> ControlResult<f64> {
        Ok(plant.w_m)
    }

    fn get_feedback(&self, _t: f64, w_m: f64) -> ControlResult<Fbk> {
        Ok(Fbk { w_m })
    }

    fn compute_output(&self, t: f64, fbk: &Fbk) -> ControlResult<Ref> {
        let w_m = match self.modes.resolve(t)? {
            OutputMode::Speed(w) => w,
            OutputMode::Torque(_) => 0.0,
        };
        let (pi_next, u) = self.pi.output(&self.state, w_m, fbk.w_m, self.t_s);
        Ok(Ref {
            t_s: self.t_s,
            w_m,
            u,
            d_abc: [0.5 + u, 0.5 - u, 0.5],
            pi_next,
        })
    }

    fn update(&mut self, _t: f64, reference: &Ref, _fbk: &Fbk) {
        self.state = reference.pi_next;
        self.updates += 1;
        // Variable-rate: halve the period after the first step
        self.t_s = 5e-4;
    }
}

#[test]
fn step_runs_phases_and_advances_clock() {
    let mut ctrl = ControlLoop::new(SpeedCtrl::new(ModeSelector::new().with_speed_ref(|_| 10.0)));
    let motor = Motor { w_m: 0.0 };

    let first = ctrl.step(&motor).unwrap();
    assert_eq!(first.t_s, 1e-3);
    assert_eq!(ctrl.t(), 1e-3);

    let second = ctrl.step(&motor).unwrap();
    assert_eq!(second.t_s, 5e-4);
    assert!((ctrl.t() - 1.5e-3).abs() < 1e-15);
    assert_eq!(ctrl.steps(), 2);
    assert_eq!(ctrl.system().updates, 2);
    assert!(ctrl.system().state.integral > 0.0);

    let tables = ctrl.into_results().unwrap();
    assert_eq!(tables.names().collect::<Vec<_>>(), vec!["fbk", "ref"]);
    let reference = tables.get("ref").unwrap();
    assert_eq!(reference.t, vec![0.0, 1e-3]);
    assert_eq!(
        reference.get("w_m").and_then(Column::as_real),
        Some(&[10.0, 10.0][..])
    );
    assert_eq!(reference.get("d_abc").and_then(Column::as_abc).map(<[_]>::len), Some(2));
}

#[test]
fn missing_output_mode_is_fatal() {
    let mut ctrl = ControlLoop::new(SpeedCtrl::new(ModeSelector::new()));
    let err = ctrl.step(&Motor { w_m: 0.0 }).unwrap_err();
    assert_eq!(err, ControlError::NoOutputMode);
    assert_eq!(ctrl.t(), 0.0);
    assert_eq!(ctrl.system().updates, 0);
}

#[test]
fn non_finite_duty_leaves_controller_untouched() {
    let mut ctrl = ControlLoop::new(SpeedCtrl::new(
        ModeSelector::new().with_speed_ref(|_| f64::NAN),
    ));
    let err = ctrl.step(&Motor { w_m: 0.0 }).unwrap_err();
    assert!(matches!(err, ControlError::NonFiniteDuty { .. }));
    assert_eq!(ctrl.system().updates, 0);
    assert!(ctrl.log().is_empty());
}
