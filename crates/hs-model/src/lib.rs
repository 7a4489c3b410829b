//! hs-model: plant model layer of the hybrid switched-system simulator.
//!
//! Provides:
//! - The `Subsystem` contract (ports, states, outputs, right-hand side)
//! - Incremental model builder with construction-time validation
//! - The `Model` state arena with direct-feedthrough aware evaluation
//! - Append-only history and its conversion to per-subsystem series
//!
//! # Example
//!
//! ```
//! use hs_core::{Value, ValueKind};
//! use hs_model::{ModelBuilder, OutputSpec, PortSpec, StateSpec, Subsystem};
//!
//! struct Decay;
//!
//! impl Subsystem for Decay {
//!     fn name(&self) -> &str {
//!         "decay"
//!     }
//!     fn outputs(&self) -> &[OutputSpec] {
//!         const OUT: [OutputSpec; 1] = [OutputSpec::state("x", ValueKind::Real)];
//!         &OUT
//!     }
//!     fn states(&self) -> &[StateSpec] {
//!         const STATES: [StateSpec; 1] = [StateSpec::new("x", ValueKind::Real)];
//!         &STATES
//!     }
//!     fn initial_state(&self, x: &mut [f64]) {
//!         x[0] = 1.0;
//!     }
//!     fn set_outputs(&self, _t: f64, x: &[f64], _u: &[Value], y: &mut [Value]) {
//!         y[0] = Value::Real(x[0]);
//!     }
//!     fn rhs(&self, _t: f64, x: &[f64], _u: &[Value], dx: &mut [f64]) {
//!         dx[0] = -x[0];
//!     }
//! }
//!
//! let mut builder = ModelBuilder::new();
//! builder.add(Decay);
//! let mut model = builder.build().unwrap();
//!
//! let x0 = model.initial_values();
//! let mut dx = vec![0.0; model.dim()];
//! model.rhs(0.0, &x0, &mut dx).unwrap();
//! assert_eq!(dx, vec![-1.0]);
//! ```

pub mod builder;
pub mod error;
pub mod history;
pub mod layout;
pub mod model;
pub mod subsystem;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::ModelBuilder;
pub use error::{ModelError, ModelResult};
pub use history::{ModelHistory, ModelSeries, SWITCHING_STATE};
pub use layout::Layout;
pub use model::Model;
pub use subsystem::{AsAny, Handle, OutputSpec, PortSpec, StateSpec, Subsystem, SubsystemView};
