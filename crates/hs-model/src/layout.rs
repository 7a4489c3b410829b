//! Contiguous buffer layout for states and ports.
//!
//! Every subsystem owns a fixed range of the model's state, input and output
//! buffers, assigned in registration order. Subsystem `i`'s states live in
//! `x[state_offsets[i]..state_offsets[i + 1]]`, and likewise for ports.

use core::ops::Range;

use crate::subsystem::Subsystem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    state_offsets: Vec<usize>,
    input_offsets: Vec<usize>,
    output_offsets: Vec<usize>,
    /// Global output slot -> (subsystem slot, local output index).
    output_owner: Vec<(usize, usize)>,
    /// Global input slot -> (subsystem slot, local input index).
    input_owner: Vec<(usize, usize)>,
}

impl Layout {
    /// Lay out subsystems in registration order.
    pub fn from_subsystems(subsystems: &[Box<dyn Subsystem>]) -> Self {
        let n = subsystems.len();
        let mut state_offsets = Vec::with_capacity(n + 1);
        let mut input_offsets = Vec::with_capacity(n + 1);
        let mut output_offsets = Vec::with_capacity(n + 1);
        let mut output_owner = Vec::new();
        let mut input_owner = Vec::new();
        state_offsets.push(0);
        input_offsets.push(0);
        output_offsets.push(0);

        for (i, sub) in subsystems.iter().enumerate() {
            state_offsets.push(state_offsets[i] + sub.state_len());
            input_offsets.push(input_offsets[i] + sub.inputs().len());
            output_offsets.push(output_offsets[i] + sub.outputs().len());
            input_owner.extend((0..sub.inputs().len()).map(|k| (i, k)));
            output_owner.extend((0..sub.outputs().len()).map(|k| (i, k)));
        }

        Self {
            state_offsets,
            input_offsets,
            output_offsets,
            output_owner,
            input_owner,
        }
    }

    /// Number of subsystems.
    pub fn subsystem_count(&self) -> usize {
        self.state_offsets.len() - 1
    }

    /// Total number of real state slots.
    pub fn dim(&self) -> usize {
        self.state_offsets.last().copied().unwrap_or(0)
    }

    pub fn input_count(&self) -> usize {
        self.input_owner.len()
    }

    pub fn output_count(&self) -> usize {
        self.output_owner.len()
    }

    pub fn state_range(&self, slot: usize) -> Range<usize> {
        self.state_offsets[slot]..self.state_offsets[slot + 1]
    }

    pub fn input_range(&self, slot: usize) -> Range<usize> {
        self.input_offsets[slot]..self.input_offsets[slot + 1]
    }

    pub fn output_range(&self, slot: usize) -> Range<usize> {
        self.output_offsets[slot]..self.output_offsets[slot + 1]
    }

    /// Global input slot of a subsystem's local input.
    pub fn input_slot(&self, slot: usize, local: usize) -> usize {
        self.input_offsets[slot] + local
    }

    /// Global output slot of a subsystem's local output.
    pub fn output_slot(&self, slot: usize, local: usize) -> usize {
        self.output_offsets[slot] + local
    }

    pub fn output_owner(&self, global: usize) -> (usize, usize) {
        self.output_owner[global]
    }

    pub fn input_owner(&self, global: usize) -> (usize, usize) {
        self.input_owner[global]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subsystem::{OutputSpec, PortSpec, StateSpec};
    use hs_core::{Value, ValueKind};

    struct Dummy {
        inputs: Vec<PortSpec>,
        outputs: Vec<OutputSpec>,
        states: Vec<StateSpec>,
    }

    impl Subsystem for Dummy {
        fn name(&self) -> &str {
            "dummy"
        }
        fn inputs(&self) -> &[PortSpec] {
            &self.inputs
        }
        fn outputs(&self) -> &[OutputSpec] {
            &self.outputs
        }
        fn states(&self) -> &[StateSpec] {
            &self.states
        }
        fn set_outputs(&self, _t: f64, _x: &[f64], _u: &[Value], _y: &mut [Value]) {}
    }

    fn dummy(n_in: usize, n_out: usize, states: &[ValueKind]) -> Box<dyn Subsystem> {
        Box::new(Dummy {
            inputs: (0..n_in).map(|_| PortSpec::new("u", ValueKind::Real)).collect(),
            outputs: (0..n_out)
                .map(|_| OutputSpec::state("y", ValueKind::Real))
                .collect(),
            states: states.iter().map(|&k| StateSpec::new("x", k)).collect(),
        })
    }

    #[test]
    fn offsets_follow_registration_order() {
        let subs = vec![
            dummy(1, 2, &[ValueKind::Complex]),
            dummy(0, 1, &[]),
            dummy(2, 0, &[ValueKind::Real, ValueKind::Abc]),
        ];
        let layout = Layout::from_subsystems(&subs);

        assert_eq!(layout.subsystem_count(), 3);
        assert_eq!(layout.dim(), 6);
        assert_eq!(layout.state_range(0), 0..2);
        assert_eq!(layout.state_range(1), 2..2);
        assert_eq!(layout.state_range(2), 2..6);
        assert_eq!(layout.input_range(2), 1..3);
        assert_eq!(layout.output_range(1), 2..3);
        assert_eq!(layout.output_owner(2), (1, 0));
        assert_eq!(layout.input_owner(2), (2, 1));
        assert_eq!(layout.input_slot(2, 1), 2);
        assert_eq!(layout.output_slot(0, 1), 1);
    }

    #[test]
    fn empty_layout() {
        let layout = Layout::from_subsystems(&[]);
        assert_eq!(layout.dim(), 0);
        assert_eq!(layout.subsystem_count(), 0);
        assert_eq!(layout.input_count(), 0);
    }
}
