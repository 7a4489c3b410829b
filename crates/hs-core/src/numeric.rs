/// Absolute and relative tolerance pair for comparing instants and states.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerances {
    pub abs: f64,
    pub rel: f64,
}

impl Tolerances {
    /// 1e-12 absolute, 1e-9 relative.
    pub const TIGHT: Self = Self {
        abs: 1e-12,
        rel: 1e-9,
    };
}

impl Default for Tolerances {
    fn default() -> Self {
        Self::TIGHT
    }
}

/// `|a - b|` within `tol.abs`, or within `tol.rel` of the larger magnitude.
pub fn nearly_equal(a: f64, b: f64, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    diff <= tol.abs || diff <= tol.rel * a.abs().max(b.abs())
}

/// First non-finite entry of `xs`, if any, as `(index, value)`.
pub fn first_non_finite(xs: &[f64]) -> Option<(usize, f64)> {
    xs.iter().copied().enumerate().find(|(_, v)| !v.is_finite())
}

pub fn all_finite(xs: &[f64]) -> bool {
    xs.iter().all(|v| v.is_finite())
}

/// Divide, returning zero when the denominator is zero or the quotient is not finite.
///
/// Subsystems use this for expressions such as `psi / |psi|` that degenerate at standstill.
pub fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        return 0.0;
    }
    let q = num / den;
    if q.is_finite() { q } else { 0.0 }
}
