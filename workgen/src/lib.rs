//! Synthetic workload generation.
//!
//! Produces valid, reproducible workloads for the scheduler: all randomness
//! flows from a caller-supplied seed and all ids from a fresh per-workload
//! allocator, so two generations with the same parameters are identical.

pub mod error;
pub mod generator;
pub mod params;

pub use error::GenError;
pub use generator::generate;
pub use params::{GenParams, PriorityPolicy};
