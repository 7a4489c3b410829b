//! Duty ratio references and realized voltage for three-phase PWM.

use core::f64::consts::PI;

use hs_core::{Complex64, abc_to_complex, complex_to_abc};
use serde::{Deserialize, Serialize};

/// Duty ratio computation with a realized-voltage estimate.
///
/// The estimate accounts for the one-period computational delay: the voltage
/// realized over the current period is the mean of the last two limited
/// references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pwm {
    /// Use six-step overmodulation.
    pub six_step: bool,
    realized_voltage: Complex64,
    u_ref_lim_old: Complex64,
}

impl Pwm {
    pub fn new(six_step: bool) -> Self {
        Self {
            six_step,
            ..Self::default()
        }
    }

    /// Voltage estimated to be realized over the present sampling period.
    pub fn realized_voltage(&self) -> Complex64 {
        self.realized_voltage
    }

    /// Duty ratios and the limited voltage reference in synchronous coordinates.
    ///
    /// * `t_s` - Sampling period
    /// * `u_ref` - Voltage reference in synchronous coordinates
    /// * `u_dc` - DC-bus voltage
    /// * `theta` - Angle of synchronous coordinates
    /// * `w` - Angular speed of synchronous coordinates
    pub fn output(
        &self,
        t_s: f64,
        u_ref: Complex64,
        u_dc: f64,
        theta: f64,
        w: f64,
    ) -> ([f64; 3], Complex64) {
        // Advance the angle by the computational delay (T_s) and the PWM hold (0.5*T_s)
        let theta_comp = theta + 1.5 * t_s * w;
        let rot = Complex64::from_polar(1.0, theta_comp);

        let mut u_s_ref = rot * u_ref;
        if self.six_step {
            u_s_ref = six_step_overmodulation(u_s_ref, u_dc);
        }

        let d_abc = duty_ratios(u_s_ref, u_dc);

        let u_s_ref_lim = u_dc * abc_to_complex(d_abc);
        (d_abc, rot.conj() * u_s_ref_lim)
    }

    /// Shift the realized-voltage estimate to the next sampling instant.
    pub fn update(&mut self, u_ref_lim: Complex64) {
        self.realized_voltage = 0.5 * (self.u_ref_lim_old + u_ref_lim);
        self.u_ref_lim_old = u_ref_lim;
    }
}

/// Six-step overmodulation: bend the reference angle towards the hexagon corners.
pub fn six_step_overmodulation(u_s_ref: Complex64, u_dc: f64) -> Complex64 {
    // Limited magnitude
    let r = u_s_ref.norm().min(2.0 / 3.0 * u_dc);

    if 3f64.sqrt() * r <= u_dc {
        return u_s_ref;
    }

    let theta = u_s_ref.arg();
    let sector = (3.0 * theta / PI).floor();

    // Angle reduced to the first sector
    let mut theta0 = theta - sector * PI / 3.0;

    // Intersection angle of the reference circle and the hexagon
    let alpha_g = PI / 6.0 - (u_dc / (3f64.sqrt() * r)).acos();

    if alpha_g <= theta0 && theta0 <= PI / 6.0 {
        theta0 = alpha_g;
    } else if PI / 6.0 <= theta0 && theta0 <= PI / 3.0 - alpha_g {
        theta0 = PI / 3.0 - alpha_g;
    }

    Complex64::from_polar(r, theta0 + sector * PI / 3.0)
}

/// Duty ratios by symmetrical suboscillation (equivalent to space-vector PWM).
///
/// References beyond the linear range are scaled back along the same
/// direction (minimum phase error). `u_dc <= 0` gives the neutral duty ratios.
pub fn duty_ratios(u_s_ref: Complex64, u_dc: f64) -> [f64; 3] {
    if u_dc <= 0.0 {
        return [0.5; 3];
    }

    // Phase voltages without the zero-sequence voltage
    let mut u_abc = complex_to_abc(u_s_ref);

    // Symmetrization by adding the zero-sequence voltage
    let max = u_abc[0].max(u_abc[1]).max(u_abc[2]);
    let min = u_abc[0].min(u_abc[1]).min(u_abc[2]);
    let u_0 = 0.5 * (max + min);
    u_abc = u_abc.map(|u| u - u_0);

    // Minimum phase error limiting
    let m = (2.0 / u_dc) * (max - u_0);
    if m > 1.0 {
        u_abc = u_abc.map(|u| u / m);
    }

    u_abc.map(|u| u / u_dc + 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_reference_is_half_duty() {
        let d = duty_ratios(Complex64::new(0.0, 0.0), 540.0);
        assert_eq!(d, [0.5; 3]);
    }

    #[test]
    fn linear_range_is_realized_exactly() {
        let u_dc = 540.0;
        let u_ref = Complex64::from_polar(0.5 * u_dc, 0.3);
        let d = duty_ratios(u_ref, u_dc);
        assert!(d.iter().all(|&d| (0.0..=1.0).contains(&d)));
        let u = u_dc * abc_to_complex(d);
        assert!((u - u_ref).norm() < 1e-9);
    }

    #[test]
    fn overmodulation_keeps_direction() {
        let u_dc = 540.0;
        let u_ref = Complex64::from_polar(2.0 * u_dc, 0.2);
        let d = duty_ratios(u_ref, u_dc);
        assert!(d.iter().all(|&d| (-1e-12..=1.0 + 1e-12).contains(&d)));
        let u = u_dc * abc_to_complex(d);
        assert!((u.arg() - 0.2).abs() < 1e-9);
        assert!(u.norm() < u_ref.norm());
    }

    #[test]
    fn realized_voltage_averages_last_two() {
        let mut pwm = Pwm::new(false);
        pwm.update(Complex64::new(2.0, 0.0));
        assert_eq!(pwm.realized_voltage(), Complex64::new(1.0, 0.0));
        pwm.update(Complex64::new(4.0, 2.0));
        assert_eq!(pwm.realized_voltage(), Complex64::new(3.0, 1.0));
    }

    #[test]
    fn output_rotates_back_to_synchronous_frame() {
        let pwm = Pwm::default();
        let u_ref = Complex64::new(100.0, 50.0);
        let (d, u_lim) = pwm.output(1e-4, u_ref, 540.0, 1.0, 300.0);
        assert!(d.iter().all(|d| d.is_finite()));
        assert!((u_lim - u_ref).norm() < 1e-9);
    }
}
