//! Connection resolution and evaluation-order validation.

use std::collections::BTreeSet;

use hs_core::{Value, ValueKind};

use crate::error::{ModelError, ModelResult};
use crate::layout::Layout;
use crate::subsystem::Subsystem;

/// Where a connected input takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Source {
    /// Global output slot.
    Output(usize),
    /// The model's zero-order-hold switching state.
    SwitchingState,
}

/// A resolved interconnection edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Edge {
    pub source: Source,
    /// Global input slot.
    pub target: usize,
}

pub(crate) fn input_index(
    subsystems: &[Box<dyn Subsystem>],
    slot: usize,
    port: &str,
) -> ModelResult<usize> {
    let sub = &subsystems[slot];
    sub.inputs()
        .iter()
        .position(|p| p.name == port)
        .ok_or_else(|| ModelError::UnknownInput {
            subsystem: sub.name().to_string(),
            port: port.to_string(),
        })
}

pub(crate) fn output_index(
    subsystems: &[Box<dyn Subsystem>],
    slot: usize,
    port: &str,
) -> ModelResult<usize> {
    let sub = &subsystems[slot];
    sub.outputs()
        .iter()
        .position(|p| p.name == port)
        .ok_or_else(|| ModelError::UnknownOutput {
            subsystem: sub.name().to_string(),
            port: port.to_string(),
        })
}

pub(crate) fn input_label(subsystems: &[Box<dyn Subsystem>], layout: &Layout, global: usize) -> String {
    let (slot, local) = layout.input_owner(global);
    let sub = &subsystems[slot];
    format!("{}.{}", sub.name(), sub.inputs()[local].name)
}

pub(crate) fn output_label(
    subsystems: &[Box<dyn Subsystem>],
    layout: &Layout,
    global: usize,
) -> String {
    let (slot, local) = layout.output_owner(global);
    let sub = &subsystems[slot];
    format!("{}.{}", sub.name(), sub.outputs()[local].name)
}

/// Check names are unique and that every output dependency names a real input.
pub(crate) fn validate_subsystems(subsystems: &[Box<dyn Subsystem>]) -> ModelResult<()> {
    let mut names = BTreeSet::new();
    for sub in subsystems {
        if !names.insert(sub.name()) {
            return Err(ModelError::DuplicateName {
                name: sub.name().to_string(),
            });
        }
        for out in sub.outputs() {
            for dep in out.depends_on {
                if !sub.inputs().iter().any(|p| p.name == *dep) {
                    return Err(ModelError::UnknownDependency {
                        subsystem: sub.name().to_string(),
                        output: out.name.to_string(),
                        input: dep.to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Check that every input is driven exactly once, by an edge or a fixed value.
pub(crate) fn validate_coverage(
    subsystems: &[Box<dyn Subsystem>],
    layout: &Layout,
    edges: &[Edge],
    fixed: &[(usize, Value)],
) -> ModelResult<()> {
    let mut driven = vec![false; layout.input_count()];
    let targets = edges
        .iter()
        .map(|e| e.target)
        .chain(fixed.iter().map(|(slot, _)| *slot));

    for target in targets {
        if driven[target] {
            let (slot, local) = layout.input_owner(target);
            return Err(ModelError::DuplicateConnection {
                subsystem: subsystems[slot].name().to_string(),
                port: subsystems[slot].inputs()[local].name.to_string(),
            });
        }
        driven[target] = true;
    }

    if let Some(missing) = driven.iter().position(|d| !d) {
        let (slot, local) = layout.input_owner(missing);
        return Err(ModelError::UnconnectedInput {
            subsystem: subsystems[slot].name().to_string(),
            port: subsystems[slot].inputs()[local].name.to_string(),
        });
    }
    Ok(())
}

/// Kind check for one edge.
pub(crate) fn check_kind(from: String, to: String, expected: ValueKind, found: ValueKind) -> ModelResult<()> {
    if expected != found {
        return Err(ModelError::KindMismatch {
            from,
            to,
            expected,
            found,
        });
    }
    Ok(())
}

/// Compute the order in which subsystems evaluate their outputs.
///
/// Works on output ports: an output with direct feedthrough depends on the
/// outputs feeding the inputs it lists. A topological order of the ports
/// (Kahn's algorithm, lowest slot first for determinism) is mapped to the owning
/// subsystems, so a subsystem can appear more than once when its ports sit at
/// different depths. Every subsystem appears at least once.
///
/// A cycle means two algebraic outputs depend on each other without an
/// integrated state in between; this is rejected with the ports on the cycle.
pub(crate) fn evaluation_schedule(
    subsystems: &[Box<dyn Subsystem>],
    layout: &Layout,
    edges: &[Edge],
) -> ModelResult<Vec<usize>> {
    let n_out = layout.output_count();

    let mut input_source = vec![None; layout.input_count()];
    for edge in edges {
        if let Source::Output(out) = edge.source {
            input_source[edge.target] = Some(out);
        }
    }

    // Build adjacency and compute in-degrees
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n_out];
    let mut in_degree = vec![0_usize; n_out];
    for (slot, sub) in subsystems.iter().enumerate() {
        for (local, out) in sub.outputs().iter().enumerate() {
            let node = layout.output_slot(slot, local);
            for dep in out.depends_on {
                let input = input_index(subsystems, slot, dep)?;
                if let Some(src) = input_source[layout.input_slot(slot, input)] {
                    adj[src].push(node);
                    in_degree[node] += 1;
                }
            }
        }
    }

    let mut ready: BTreeSet<usize> = (0..n_out).filter(|&o| in_degree[o] == 0).collect();
    let mut order = Vec::with_capacity(n_out);
    while let Some(port) = ready.pop_first() {
        order.push(port);
        for &next in &adj[port] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.insert(next);
            }
        }
    }

    // Check for cycles
    if order.len() != n_out {
        let ports = (0..n_out)
            .filter(|&o| in_degree[o] > 0)
            .map(|o| output_label(subsystems, layout, o))
            .collect();
        return Err(ModelError::AlgebraicLoop { ports });
    }

    let mut schedule: Vec<usize> = Vec::with_capacity(subsystems.len());
    let mut seen = vec![false; subsystems.len()];
    for port in order {
        let (slot, _) = layout.output_owner(port);
        if schedule.last() != Some(&slot) {
            schedule.push(slot);
        }
        seen[slot] = true;
    }
    schedule.extend((0..subsystems.len()).filter(|&s| !seen[s]));

    Ok(schedule)
}
