//! Shared scheduler types: the algorithm tag, the run contract, and the
//! configuration knobs every algorithm honors.

use std::fmt;

use crate::error::SchedulerError;
use crate::greedy_compression::GreedyCompression;
use crate::plan::ExecutionPlan;
use crate::preemptive::PreemptivePriority;
use crate::simple_greedy::SimpleGreedy;
use crate::workload::Workload;

/// Which scheduling algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    SimpleGreedy,
    GreedyCompression,
    PreemptivePriority,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [
        Algorithm::SimpleGreedy,
        Algorithm::GreedyCompression,
        Algorithm::PreemptivePriority,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Algorithm::SimpleGreedy => "SG",
            Algorithm::GreedyCompression => "GC",
            Algorithm::PreemptivePriority => "PP",
        }
    }

    /// Construct the scheduler this tag names.
    pub fn scheduler(self, cfg: SchedulerConfig) -> Box<dyn Scheduler> {
        match self {
            Algorithm::SimpleGreedy => Box::new(SimpleGreedy::new(cfg)),
            Algorithm::GreedyCompression => Box::new(GreedyCompression::new(cfg)),
            Algorithm::PreemptivePriority => Box::new(PreemptivePriority::new(cfg)),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Run-level limits, passed at scheduler construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchedulerConfig {
    /// Jobs whose projected end tick would pass this value are dropped at
    /// admission time instead of being scheduled. `None` disables the check.
    pub horizon: Option<u64>,

    /// Upper bound on simulated ticks, for callers that must bound a run.
    /// Exceeding it fails the run with `TickBudgetExhausted`.
    pub max_ticks: Option<u64>,
}

/// The contract shared by the three algorithms: consume a workload over a
/// scalar capacity, emit a complete execution plan.
///
/// Postconditions: every input job ends the run finished or dropped, the
/// per-tick capacity invariant holds throughout, and identical inputs yield
/// identical plans.
pub trait Scheduler: Send + Sync {
    fn algorithm(&self) -> Algorithm;

    fn run(&self, workload: Workload, capacity: u64) -> Result<ExecutionPlan, SchedulerError>;
}
