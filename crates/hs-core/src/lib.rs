//! hs-core: shared foundation for the hybrid switched-system simulator.
//!
//! Contains:
//! - error (shared error type)
//! - ids (compact ids for subsystems and ports)
//! - numeric (tolerances + float helpers)
//! - value (signal values carried by ports and logs)
//! - space_vector (abc <-> complex space-vector transforms)
//! - series (random-access time series built after a run)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod series;
pub mod space_vector;
pub mod value;

// Re-exports: nice ergonomics for downstream crates
pub use error::{HsError, HsResult};
pub use ids::*;
pub use num_complex::Complex64;
pub use numeric::*;
pub use series::{Column, Series};
pub use space_vector::*;
pub use value::{Value, ValueKind, read_complex, write_complex};
