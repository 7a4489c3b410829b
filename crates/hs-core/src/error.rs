use thiserror::Error;

use crate::value::ValueKind;

pub type HsResult<T> = Result<T, HsError>;

/// Errors raised by the shared containers of this crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HsError {
    #[error("{what}: index {index} out of range for length {len}")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("{what} holds {found:?} values, expected {expected:?}")]
    KindMismatch {
        what: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}
