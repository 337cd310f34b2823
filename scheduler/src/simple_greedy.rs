//! Non-preemptive priority FCFS.

use crate::engine::{BlockedPolicy, Engine, run_to_completion};
use crate::error::SchedulerError;
use crate::job::Job;
use crate::plan::ExecutionPlan;
use crate::types::{Algorithm, Scheduler, SchedulerConfig};
use crate::workload::Workload;

/// First-come-first-served with priority tie-break. A blocked arrival just
/// tries again next tick; running jobs are never shrunk or evicted, so every
/// job runs at its original bandwidth for exactly its duration.
#[derive(Debug, Default)]
pub struct SimpleGreedy {
    cfg: SchedulerConfig,
}

impl SimpleGreedy {
    pub fn new(cfg: SchedulerConfig) -> Self {
        Self { cfg }
    }
}

impl BlockedPolicy for SimpleGreedy {
    fn on_blocked(&self, engine: &mut Engine, job: Job) -> Result<(), SchedulerError> {
        engine.defer(job)
    }
}

impl Scheduler for SimpleGreedy {
    fn algorithm(&self) -> Algorithm {
        Algorithm::SimpleGreedy
    }

    fn run(&self, workload: Workload, capacity: u64) -> Result<ExecutionPlan, SchedulerError> {
        run_to_completion(self, workload, capacity, self.cfg)
    }
}
