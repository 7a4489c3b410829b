//! Model construction and evaluation errors.

use hs_core::{HsError, ValueKind};
use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while assembling or driving a [`Model`](crate::Model).
///
/// Construction errors name the offending subsystem and port so the faulty
/// connection can be found without a debugger.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Duplicate subsystem name '{name}'")]
    DuplicateName { name: String },

    #[error("Subsystem id {index} does not exist")]
    UnknownSubsystem { index: usize },

    #[error("Subsystem '{subsystem}' has no input '{port}'")]
    UnknownInput { subsystem: String, port: String },

    #[error("Subsystem '{subsystem}' has no output '{port}'")]
    UnknownOutput { subsystem: String, port: String },

    #[error("Output '{subsystem}.{output}' depends on unknown input '{input}'")]
    UnknownDependency {
        subsystem: String,
        output: String,
        input: String,
    },

    #[error("Connection {from} -> {to}: expected {expected:?}, found {found:?}")]
    KindMismatch {
        from: String,
        to: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("Input '{subsystem}.{port}' is connected more than once")]
    DuplicateConnection { subsystem: String, port: String },

    #[error("Input '{subsystem}.{port}' is neither connected nor fixed")]
    UnconnectedInput { subsystem: String, port: String },

    #[error("Direct-feedthrough loop through ports: {}", ports.join(" -> "))]
    AlgebraicLoop { ports: Vec<String> },

    #[error("Handle does not refer to a subsystem of type {expected}")]
    HandleMismatch { expected: &'static str },

    #[error("State vector length {found} does not match model dimension {expected}")]
    StateLength { expected: usize, found: usize },

    #[error("Non-finite initial state in subsystem '{subsystem}'")]
    NonFiniteInitialState { subsystem: String },

    #[error(transparent)]
    Core(#[from] HsError),
}
