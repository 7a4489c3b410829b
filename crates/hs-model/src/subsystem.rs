//! The contract every plant component implements.

use core::any::Any;
use core::fmt;
use core::marker::PhantomData;

use hs_core::{SubsystemId, Value, ValueKind};

/// Declaration of one input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSpec {
    pub name: &'static str,
    pub kind: ValueKind,
}

impl PortSpec {
    pub const fn new(name: &'static str, kind: ValueKind) -> Self {
        Self { name, kind }
    }
}

/// Declaration of one output port.
///
/// `depends_on` lists the inputs this output is an algebraic function of
/// (direct feedthrough). An empty list means the output is computed from the
/// state alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSpec {
    pub name: &'static str,
    pub kind: ValueKind,
    pub depends_on: &'static [&'static str],
}

impl OutputSpec {
    /// Output computed from the state only.
    pub const fn state(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            kind,
            depends_on: &[],
        }
    }

    /// Output with direct feedthrough from the listed inputs.
    pub const fn feedthrough(
        name: &'static str,
        kind: ValueKind,
        depends_on: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            kind,
            depends_on,
        }
    }

    pub fn has_feedthrough(&self) -> bool {
        !self.depends_on.is_empty()
    }
}

/// Declaration of one state variable. Complex states take two slots, `[re, im]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSpec {
    pub name: &'static str,
    pub kind: ValueKind,
}

impl StateSpec {
    pub const fn new(name: &'static str, kind: ValueKind) -> Self {
        Self { name, kind }
    }
}

/// Object-safe access to `Any` for every `'static` type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Elemental stateful unit of the plant.
///
/// A subsystem never owns its inputs, outputs or states: the [`Model`](crate::Model)
/// stores them in contiguous buffers and hands each subsystem only its own slices,
/// laid out in the order of [`inputs`](Self::inputs), [`outputs`](Self::outputs) and
/// [`states`](Self::states).
///
/// Implementations must not produce NaN from degenerate operating points (for
/// example a zero flux magnitude at standstill); fall back to zero instead, see
/// [`hs_core::safe_div`].
pub trait Subsystem: AsAny {
    /// Unique name within a model; keys the subsystem's history.
    fn name(&self) -> &str;

    fn inputs(&self) -> &[PortSpec] {
        &[]
    }

    fn outputs(&self) -> &[OutputSpec] {
        &[]
    }

    fn states(&self) -> &[StateSpec] {
        &[]
    }

    /// Write the initial state into `x` (length = total state slots).
    fn initial_state(&self, _x: &mut [f64]) {}

    /// Compute every output from the current inputs and state.
    fn set_outputs(&self, t: f64, x: &[f64], inputs: &[Value], outputs: &mut [Value]);

    /// State derivatives, in state order. Stateless subsystems keep the default.
    fn rhs(&self, _t: f64, _x: &[f64], _inputs: &[Value], _dx: &mut [f64]) {}

    /// Number of real slots the state occupies.
    fn state_len(&self) -> usize {
        self.states().iter().map(|s| s.kind.slots()).sum()
    }
}

impl fmt::Debug for dyn Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subsystem")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Typed reference to a subsystem registered with a [`ModelBuilder`](crate::ModelBuilder).
pub struct Handle<T> {
    id: SubsystemId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(crate) fn new(id: SubsystemId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> SubsystemId {
        self.id
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.id)
    }
}

impl<T> From<Handle<T>> for SubsystemId {
    fn from(handle: Handle<T>) -> Self {
        handle.id
    }
}

/// Read-only view of one subsystem together with its slices of the model buffers.
///
/// This is what `meas_*` accessors of concrete subsystems take.
pub struct SubsystemView<'a, T> {
    pub subsystem: &'a T,
    pub state: &'a [f64],
    pub inputs: &'a [Value],
    pub outputs: &'a [Value],
}

impl<T> Clone for SubsystemView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SubsystemView<'_, T> {}
