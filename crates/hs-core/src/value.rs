//! Signal values carried by ports, the switching-state input and logs.

use num_complex::Complex64;

/// Shape of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueKind {
    /// Real scalar.
    Real,
    /// Complex scalar, e.g. a space vector.
    Complex,
    /// Three-phase quantity, e.g. duty ratios or switching states.
    Abc,
}

impl ValueKind {
    /// Number of real slots a state of this kind occupies in a flat state vector.
    pub fn slots(self) -> usize {
        match self {
            Self::Real => 1,
            Self::Complex => 2,
            Self::Abc => 3,
        }
    }
}

/// A single signal value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Real scalar.
    Real(f64),
    /// Complex scalar.
    Complex(Complex64),
    /// Three-phase quantity.
    Abc([f64; 3]),
}

impl Value {
    /// Zero value of the given kind.
    pub fn zero(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Real => Self::Real(0.0),
            ValueKind::Complex => Self::Complex(Complex64::new(0.0, 0.0)),
            ValueKind::Abc => Self::Abc([0.0; 3]),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Real(_) => ValueKind::Real,
            Self::Complex(_) => ValueKind::Complex,
            Self::Abc(_) => ValueKind::Abc,
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Self::Real(v) => v.is_finite(),
            Self::Complex(c) => c.re.is_finite() && c.im.is_finite(),
            Self::Abc(v) => v.iter().all(|x| x.is_finite()),
        }
    }

    /// Real scalar, or `None` for other kinds.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(v) => Some(*v),
            _ => None,
        }
    }

    /// Complex scalar, or `None` for other kinds.
    pub fn as_complex(&self) -> Option<Complex64> {
        match self {
            Self::Complex(c) => Some(*c),
            _ => None,
        }
    }

    /// Three-phase value, or `None` for other kinds.
    pub fn as_abc(&self) -> Option<[f64; 3]> {
        match self {
            Self::Abc(v) => Some(*v),
            _ => None,
        }
    }

    /// Real scalar; zero for other kinds.
    ///
    /// Port kinds are checked when a model is built, so subsystems read their
    /// own declared inputs with these infallible accessors.
    pub fn real(&self) -> f64 {
        self.as_real().unwrap_or(0.0)
    }

    /// Complex scalar; zero for other kinds.
    pub fn complex(&self) -> Complex64 {
        self.as_complex().unwrap_or_default()
    }

    /// Three-phase value; zeros for other kinds.
    pub fn abc(&self) -> [f64; 3] {
        self.as_abc().unwrap_or_default()
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<Complex64> for Value {
    fn from(value: Complex64) -> Self {
        Self::Complex(value)
    }
}

impl From<[f64; 3]> for Value {
    fn from(value: [f64; 3]) -> Self {
        Self::Abc(value)
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::Real(0.0)
    }
}

/// Read a complex value stored as two consecutive slots `[re, im]`.
pub fn read_complex(x: &[f64], offset: usize) -> Complex64 {
    Complex64::new(x[offset], x[offset + 1])
}

/// Write a complex value into two consecutive slots `[re, im]`.
pub fn write_complex(x: &mut [f64], offset: usize, value: Complex64) {
    x[offset] = value.re;
    x[offset + 1] = value.im;
}
