//! Discrete-time bandwidth scheduling over a single scalar capacity.
//!
//! Three algorithms consume the same [`Workload`](workload::Workload) and
//! emit the same [`ExecutionPlan`](plan::ExecutionPlan):
//!   - [`SimpleGreedy`](simple_greedy::SimpleGreedy): priority FCFS, no
//!     preemption, no shrinking.
//!   - [`GreedyCompression`](greedy_compression::GreedyCompression): running
//!     jobs may shrink to their minimum bandwidth to admit an arrival.
//!   - [`PreemptivePriority`](preemptive::PreemptivePriority): higher
//!     priority arrivals may evict running jobs, which keep their remaining
//!     work and resume later.
//!
//! The engine is single-threaded over a logical clock; ticks are atomic and
//! capacity accounting is checked at every step.

pub mod error;
pub mod greedy_compression;
pub mod job;
pub mod plan;
pub mod preemptive;
pub mod score;
pub mod simple_greedy;
pub mod types;
pub mod workload;

mod engine;
mod policy;

pub use error::SchedulerError;
pub use types::{Algorithm, Scheduler, SchedulerConfig};
