//! Incremental model builder.

use hs_core::{SubsystemId, Value, ValueKind};
use tracing::debug;

use crate::error::{ModelError, ModelResult};
use crate::layout::Layout;
use crate::model::Model;
use crate::subsystem::{Handle, Subsystem};
use crate::validate::{self, Edge, Source};

#[derive(Debug, Clone)]
enum PendingSource {
    Output { from: SubsystemId, port: String },
    SwitchingState,
}

#[derive(Debug, Clone)]
struct PendingEdge {
    source: PendingSource,
    to: SubsystemId,
    port: String,
}

#[derive(Debug, Clone)]
struct PendingFixed {
    to: SubsystemId,
    port: String,
    value: Value,
}

/// Builder for assembling a model incrementally.
///
/// Use [`add`](Self::add) to register subsystems, then wire them with
/// [`connect`](Self::connect), [`connect_switching_state`](Self::connect_switching_state)
/// and [`fix_input`](Self::fix_input). Port names are resolved and checked by
/// [`build`](Self::build), which freezes the interconnection into a [`Model`].
#[derive(Default)]
pub struct ModelBuilder {
    subsystems: Vec<Box<dyn Subsystem>>,
    edges: Vec<PendingEdge>,
    fixed: Vec<PendingFixed>,
    next_id: u32,
}

impl ModelBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subsystem; states are concatenated in registration order.
    pub fn add<T: Subsystem>(&mut self, subsystem: T) -> Handle<T> {
        let id = SubsystemId::from_index(self.next_id);
        self.next_id += 1;
        self.subsystems.push(Box::new(subsystem));
        Handle::new(id)
    }

    /// Wire `from.output` into `to.input`.
    pub fn connect(
        &mut self,
        from: impl Into<SubsystemId>,
        output: &str,
        to: impl Into<SubsystemId>,
        input: &str,
    ) -> &mut Self {
        self.edges.push(PendingEdge {
            source: PendingSource::Output {
                from: from.into(),
                port: output.to_string(),
            },
            to: to.into(),
            port: input.to_string(),
        });
        self
    }

    /// Feed the model's zero-order-hold switching state into `to.input`.
    pub fn connect_switching_state(&mut self, to: impl Into<SubsystemId>, input: &str) -> &mut Self {
        self.edges.push(PendingEdge {
            source: PendingSource::SwitchingState,
            to: to.into(),
            port: input.to_string(),
        });
        self
    }

    /// Hold `to.input` at a constant value for the whole run.
    pub fn fix_input(
        &mut self,
        to: impl Into<SubsystemId>,
        input: &str,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.fixed.push(PendingFixed {
            to: to.into(),
            port: input.to_string(),
            value: value.into(),
        });
        self
    }

    fn slot(&self, id: SubsystemId) -> ModelResult<usize> {
        let slot = id.slot();
        if slot >= self.subsystems.len() {
            return Err(ModelError::UnknownSubsystem { index: slot });
        }
        Ok(slot)
    }

    /// Resolve names, validate the interconnection and build the model.
    ///
    /// The model starts at `t = 0` with every subsystem's initial state and
    /// with outputs and inputs already consistent with that state.
    pub fn build(self) -> ModelResult<Model> {
        validate::validate_subsystems(&self.subsystems)?;
        let layout = Layout::from_subsystems(&self.subsystems);
        let subs = &self.subsystems;

        let mut edges = Vec::with_capacity(self.edges.len());
        for pending in &self.edges {
            let to = self.slot(pending.to)?;
            let input = validate::input_index(subs, to, &pending.port)?;
            let target = layout.input_slot(to, input);
            let expected = subs[to].inputs()[input].kind;

            let source = match &pending.source {
                PendingSource::Output { from, port } => {
                    let from = self.slot(*from)?;
                    let output = validate::output_index(subs, from, port)?;
                    let global = layout.output_slot(from, output);
                    validate::check_kind(
                        validate::output_label(subs, &layout, global),
                        validate::input_label(subs, &layout, target),
                        expected,
                        subs[from].outputs()[output].kind,
                    )?;
                    Source::Output(global)
                }
                PendingSource::SwitchingState => {
                    validate::check_kind(
                        "switching_state".to_string(),
                        validate::input_label(subs, &layout, target),
                        expected,
                        ValueKind::Abc,
                    )?;
                    Source::SwitchingState
                }
            };
            edges.push(Edge { source, target });
        }

        let mut fixed = Vec::with_capacity(self.fixed.len());
        for pending in &self.fixed {
            let to = self.slot(pending.to)?;
            let input = validate::input_index(subs, to, &pending.port)?;
            let target = layout.input_slot(to, input);
            validate::check_kind(
                "fixed value".to_string(),
                validate::input_label(subs, &layout, target),
                subs[to].inputs()[input].kind,
                pending.value.kind(),
            )?;
            fixed.push((target, pending.value));
        }

        validate::validate_coverage(subs, &layout, &edges, &fixed)?;
        let schedule = validate::evaluation_schedule(subs, &layout, &edges)?;

        let mut x0 = vec![0.0; layout.dim()];
        for (slot, sub) in subs.iter().enumerate() {
            let range = layout.state_range(slot);
            sub.initial_state(&mut x0[range.clone()]);
            if !hs_core::all_finite(&x0[range]) {
                return Err(ModelError::NonFiniteInitialState {
                    subsystem: sub.name().to_string(),
                });
            }
        }

        debug!(
            subsystems = subs.len(),
            dim = layout.dim(),
            edges = edges.len(),
            schedule = ?schedule,
            "model built"
        );

        Ok(Model::assemble(
            self.subsystems,
            layout,
            edges,
            fixed,
            schedule,
            x0,
        ))
    }
}
