//! Random-access time series produced by the terminal post-processing pass.

use num_complex::Complex64;

use crate::error::{HsError, HsResult};
use crate::value::{Value, ValueKind};

/// One named signal sampled on a shared time base.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Column {
    Real(Vec<f64>),
    Complex(Vec<Complex64>),
    Abc(Vec<[f64; 3]>),
}

impl Column {
    /// Empty column of the given kind.
    pub fn with_kind(kind: ValueKind, capacity: usize) -> Self {
        match kind {
            ValueKind::Real => Self::Real(Vec::with_capacity(capacity)),
            ValueKind::Complex => Self::Complex(Vec::with_capacity(capacity)),
            ValueKind::Abc => Self::Abc(Vec::with_capacity(capacity)),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Real(_) => ValueKind::Real,
            Self::Complex(_) => ValueKind::Complex,
            Self::Abc(_) => ValueKind::Abc,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Real(v) => v.len(),
            Self::Complex(v) => v.len(),
            Self::Abc(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a value, which must match the column kind.
    pub fn push(&mut self, name: &str, value: Value) -> HsResult<()> {
        match (self, value) {
            (Self::Real(v), Value::Real(x)) => v.push(x),
            (Self::Complex(v), Value::Complex(x)) => v.push(x),
            (Self::Abc(v), Value::Abc(x)) => v.push(x),
            (col, value) => {
                return Err(HsError::KindMismatch {
                    what: name.to_string(),
                    expected: col.kind(),
                    found: value.kind(),
                });
            }
        }
        Ok(())
    }

    pub fn as_real(&self) -> Option<&[f64]> {
        match self {
            Self::Real(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<&[Complex64]> {
        match self {
            Self::Complex(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_abc(&self) -> Option<&[[f64; 3]]> {
        match self {
            Self::Abc(v) => Some(v),
            _ => None,
        }
    }
}

/// A set of named columns sharing one time base.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Series {
    /// Sample instants (seconds), non-decreasing.
    pub t: Vec<f64>,
    columns: Vec<(String, Column)>,
}

impl Series {
    pub fn new(t: Vec<f64>) -> Self {
        Self {
            t,
            columns: Vec::new(),
        }
    }

    /// Add a column; its length must match the time base.
    pub fn insert(&mut self, name: impl Into<String>, column: Column) -> HsResult<()> {
        if column.len() != self.t.len() {
            return Err(HsError::IndexOob {
                what: "column length vs time base",
                index: column.len(),
                len: self.t.len(),
            });
        }
        let name = name.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = column,
            None => self.columns.push((name, column)),
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    /// Column names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}
