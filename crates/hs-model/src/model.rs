//! The interconnected plant model.

use hs_core::{SubsystemId, Value};

use crate::error::{ModelError, ModelResult};
use crate::history::{ModelHistory, ModelSeries};
use crate::layout::Layout;
use crate::subsystem::{Handle, Subsystem, SubsystemView};
use crate::validate::{Edge, Source};

/// Interconnection of subsystems sharing one aggregate state vector.
///
/// The model exclusively owns the state buffer, every input and output port
/// buffer and the zero-order-hold switching state. They change only through
/// [`set_states`](Self::set_states), [`set_outputs`](Self::set_outputs),
/// [`interconnect`](Self::interconnect) and
/// [`set_switching_state`](Self::set_switching_state).
pub struct Model {
    subsystems: Vec<Box<dyn Subsystem>>,
    layout: Layout,
    edges: Vec<Edge>,
    /// Edges grouped by the subsystem owning their source output.
    outgoing: Vec<Vec<usize>>,
    schedule: Vec<usize>,
    x: Vec<f64>,
    inputs: Vec<Value>,
    outputs: Vec<Value>,
    switching_state: [f64; 3],
    t: f64,
    history: ModelHistory,
}

impl Model {
    pub(crate) fn assemble(
        subsystems: Vec<Box<dyn Subsystem>>,
        layout: Layout,
        edges: Vec<Edge>,
        fixed: Vec<(usize, Value)>,
        schedule: Vec<usize>,
        x0: Vec<f64>,
    ) -> Self {
        let mut outgoing = vec![Vec::new(); subsystems.len()];
        for (i, edge) in edges.iter().enumerate() {
            if let Source::Output(out) = edge.source {
                outgoing[layout.output_owner(out).0].push(i);
            }
        }

        let mut inputs = Vec::with_capacity(layout.input_count());
        let mut outputs = Vec::with_capacity(layout.output_count());
        for sub in &subsystems {
            inputs.extend(sub.inputs().iter().map(|p| Value::zero(p.kind)));
            outputs.extend(sub.outputs().iter().map(|p| Value::zero(p.kind)));
        }
        for (slot, value) in fixed {
            inputs[slot] = value;
        }

        let dim = layout.dim();
        let mut model = Self {
            subsystems,
            layout,
            edges,
            outgoing,
            schedule,
            x: x0,
            inputs,
            outputs,
            switching_state: [0.0; 3],
            t: 0.0,
            history: ModelHistory::new(dim),
        };
        model.set_outputs(0.0);
        model
    }

    /// Simulation time: start of the next interval to integrate.
    pub fn t(&self) -> f64 {
        self.t
    }

    /// Move the time pointer to the end of an integrated interval.
    pub fn advance_to(&mut self, t: f64) {
        self.t = t;
    }

    /// Number of real state slots.
    pub fn dim(&self) -> usize {
        self.layout.dim()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Subsystem evaluation order used by [`set_outputs`](Self::set_outputs).
    pub fn schedule(&self) -> &[usize] {
        &self.schedule
    }

    pub fn subsystems(&self) -> impl Iterator<Item = &dyn Subsystem> {
        self.subsystems.iter().map(|s| s.as_ref())
    }

    /// Concatenated states of every subsystem, in registration order.
    ///
    /// These are the initial values of the next integration interval.
    pub fn initial_values(&self) -> Vec<f64> {
        self.x.clone()
    }

    /// Current aggregate state.
    pub fn state(&self) -> &[f64] {
        &self.x
    }

    /// Overwrite the aggregate state; the exact inverse of [`initial_values`](Self::initial_values).
    pub fn set_states(&mut self, x: &[f64]) -> ModelResult<()> {
        if x.len() != self.x.len() {
            return Err(ModelError::StateLength {
                expected: self.x.len(),
                found: x.len(),
            });
        }
        self.x.copy_from_slice(x);
        Ok(())
    }

    pub fn switching_state(&self) -> [f64; 3] {
        self.switching_state
    }

    /// Set the shared zero-order-hold switching state.
    ///
    /// Consumers see it after the next [`interconnect`](Self::interconnect).
    pub fn set_switching_state(&mut self, q_abc: [f64; 3]) {
        self.switching_state = q_abc;
    }

    /// Evaluate every subsystem's outputs at `t` from the current state.
    ///
    /// Subsystems run in the validated schedule; each one's outgoing edges are
    /// propagated right after it runs, so direct-feedthrough chains settle in
    /// a single pass.
    pub fn set_outputs(&mut self, t: f64) {
        self.propagate_switching_state();
        for k in 0..self.schedule.len() {
            let slot = self.schedule[k];
            self.evaluate(slot, t);
            for j in 0..self.outgoing[slot].len() {
                let e = self.outgoing[slot][j];
                self.apply_edge(e);
            }
        }
    }

    /// Copy every connected source value into its target input.
    ///
    /// Idempotent while outputs and the switching state are unchanged.
    pub fn interconnect(&mut self) {
        for e in 0..self.edges.len() {
            self.apply_edge(e);
        }
    }

    /// Aggregate state derivative at `(t, x)`.
    ///
    /// Sets the states, resolves outputs and inputs, then concatenates every
    /// subsystem's derivatives into `dx`. Only the model's caches change.
    pub fn rhs(&mut self, t: f64, x: &[f64], dx: &mut [f64]) -> ModelResult<()> {
        self.set_states(x)?;
        if dx.len() != self.x.len() {
            return Err(ModelError::StateLength {
                expected: self.x.len(),
                found: dx.len(),
            });
        }
        self.set_outputs(t);
        for (slot, sub) in self.subsystems.iter().enumerate() {
            let range = self.layout.state_range(slot);
            if range.is_empty() {
                continue;
            }
            sub.rhs(
                t,
                &self.x[range.clone()],
                &self.inputs[self.layout.input_range(slot)],
                &mut dx[range],
            );
        }
        Ok(())
    }

    /// Append integrated samples to the history.
    ///
    /// `states` holds one full state vector per entry of `t`, row after row.
    /// The held switching state is recorded alongside every sample.
    pub fn save(&mut self, t: &[f64], states: &[f64]) -> ModelResult<()> {
        self.history.extend(t, states, self.switching_state)
    }

    pub fn history(&self) -> &ModelHistory {
        &self.history
    }

    /// Convert the history into per-subsystem series.
    pub fn post_process(&self) -> ModelResult<ModelSeries> {
        self.history.post_process(&self.subsystems, &self.layout)
    }

    /// Typed access to a subsystem's parameters.
    pub fn get<T: Subsystem>(&self, handle: Handle<T>) -> ModelResult<&T> {
        let slot = handle.id().slot();
        self.subsystems
            .get(slot)
            .and_then(|s| (**s).as_any().downcast_ref::<T>())
            .ok_or(ModelError::HandleMismatch {
                expected: core::any::type_name::<T>(),
            })
    }

    /// A subsystem together with its current state, inputs and outputs.
    pub fn view<T: Subsystem>(&self, handle: Handle<T>) -> ModelResult<SubsystemView<'_, T>> {
        let subsystem = self.get(handle)?;
        let slot = handle.id().slot();
        Ok(SubsystemView {
            subsystem,
            state: &self.x[self.layout.state_range(slot)],
            inputs: &self.inputs[self.layout.input_range(slot)],
            outputs: &self.outputs[self.layout.output_range(slot)],
        })
    }

    /// Value currently held by a named input.
    pub fn input(&self, id: impl Into<SubsystemId>, port: &str) -> ModelResult<Value> {
        let slot = self.checked_slot(id.into())?;
        let local = crate::validate::input_index(&self.subsystems, slot, port)?;
        Ok(self.inputs[self.layout.input_slot(slot, local)])
    }

    /// Value currently held by a named output.
    pub fn output(&self, id: impl Into<SubsystemId>, port: &str) -> ModelResult<Value> {
        let slot = self.checked_slot(id.into())?;
        let local = crate::validate::output_index(&self.subsystems, slot, port)?;
        Ok(self.outputs[self.layout.output_slot(slot, local)])
    }

    /// All input values, in layout order.
    pub fn inputs(&self) -> &[Value] {
        &self.inputs
    }

    fn checked_slot(&self, id: SubsystemId) -> ModelResult<usize> {
        let slot = id.slot();
        if slot >= self.subsystems.len() {
            return Err(ModelError::UnknownSubsystem { index: slot });
        }
        Ok(slot)
    }

    fn evaluate(&mut self, slot: usize, t: f64) {
        let sub = &self.subsystems[slot];
        sub.set_outputs(
            t,
            &self.x[self.layout.state_range(slot)],
            &self.inputs[self.layout.input_range(slot)],
            &mut self.outputs[self.layout.output_range(slot)],
        );
    }

    fn apply_edge(&mut self, e: usize) {
        let edge = self.edges[e];
        self.inputs[edge.target] = match edge.source {
            Source::Output(out) => self.outputs[out],
            Source::SwitchingState => Value::Abc(self.switching_state),
        };
    }

    fn propagate_switching_state(&mut self) {
        let q = Value::Abc(self.switching_state);
        for edge in &self.edges {
            if edge.source == Source::SwitchingState {
                self.inputs[edge.target] = q;
            }
        }
    }
}

impl core::fmt::Debug for Model {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Model")
            .field("t", &self.t)
            .field("dim", &self.layout.dim())
            .field("subsystems", &self.subsystems.len())
            .field("schedule", &self.schedule)
            .finish_non_exhaustive()
    }
}
