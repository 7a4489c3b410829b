//! Space-vector transforms between three-phase quantities and complex numbers.
//!
//! Amplitude-invariant scaling: a balanced set with peak `A` maps to a vector of
//! magnitude `A`. Zero-sequence components are dropped.

use num_complex::Complex64;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Transform a three-phase quantity to a complex space vector.
///
/// Equal phase values map to exactly zero.
pub fn abc_to_complex(u: [f64; 3]) -> Complex64 {
    Complex64::new(
        (2.0 / 3.0) * (u[0] - 0.5 * (u[1] + u[2])),
        (u[1] - u[2]) / SQRT_3,
    )
}

/// Transform a complex space vector to three-phase quantities (zero sequence = 0).
pub fn complex_to_abc(u: Complex64) -> [f64; 3] {
    [
        u.re,
        0.5 * (-u.re + SQRT_3 * u.im),
        0.5 * (-u.re - SQRT_3 * u.im),
    ]
}
