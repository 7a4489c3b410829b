//! Hybrid simulation of sampled-data controllers driving switched plants.
//!
//! Provides:
//! - ODE integrators (forward Euler, RK4, adaptive Dormand-Prince 5(4))
//! - Switching schemes (zero-order hold, carrier comparison PWM)
//! - Computational delay between controller and converter
//! - The simulation driver alternating control steps and plant integration

pub mod delay;
pub mod error;
pub mod integrator;
pub mod results;
pub mod sim;
pub mod stats;
pub mod switching;

pub use delay::ComputationalDelay;
pub use error::{SimError, SimResult};
pub use integrator::{DormandPrince45, ForwardEuler, Integrator, OdeSystem, Rk4, Trajectory};
pub use results::SimResults;
pub use sim::{IntegratorType, SimOptions, Simulation};
pub use stats::{RunStats, SimProgress};
pub use switching::{
    CarrierComparison, SubInterval, SwitchingKind, SwitchingScheme, ZeroOrderHold,
};
