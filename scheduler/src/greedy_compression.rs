//! Greedy admission with on-demand compression of running jobs.

use tracing::debug;

use crate::engine::{BlockedPolicy, Engine, run_to_completion};
use crate::error::SchedulerError;
use crate::job::Job;
use crate::plan::ExecutionPlan;
use crate::policy::victim_order;
use crate::types::{Algorithm, Scheduler, SchedulerConfig};
use crate::workload::Workload;

/// Like [`SimpleGreedy`](crate::simple_greedy::SimpleGreedy), except a
/// blocked arrival may squeeze running jobs down to their minimum bandwidth
/// to make room. The sweep is atomic: either enough jobs shrink and the
/// arrival is admitted, or nothing changes and the arrival is deferred.
/// A shrunk job stays shrunk until it finishes.
#[derive(Debug, Default)]
pub struct GreedyCompression {
    cfg: SchedulerConfig,
}

impl GreedyCompression {
    pub fn new(cfg: SchedulerConfig) -> Self {
        Self { cfg }
    }
}

impl BlockedPolicy for GreedyCompression {
    fn on_blocked(&self, engine: &mut Engine, job: Job) -> Result<(), SchedulerError> {
        if compress_to_fit(engine, &job)? {
            engine.admit(job)
        } else {
            engine.defer(job)
        }
    }
}

impl Scheduler for GreedyCompression {
    fn algorithm(&self) -> Algorithm {
        Algorithm::GreedyCompression
    }

    fn run(&self, workload: Workload, capacity: u64) -> Result<ExecutionPlan, SchedulerError> {
        run_to_completion(self, workload, capacity, self.cfg)
    }
}

/// Plan a shrink sweep in victim order and commit it only if `arrival` then
/// fits. Jobs already at their floor are not candidates; if even a full
/// sweep cannot make room, no running job is touched.
fn compress_to_fit(engine: &mut Engine, arrival: &Job) -> Result<bool, SchedulerError> {
    let mut order: Vec<usize> = (0..engine.running.len()).collect();
    order.sort_by(|&a, &b| victim_order(&engine.running[a], &engine.running[b]));

    let mut chosen = Vec::new();
    let mut gain = 0;
    for idx in order {
        if arrival.bandwidth() <= engine.free() + gain {
            break;
        }
        let candidate = &engine.running[idx];
        if candidate.is_compressed() {
            continue;
        }
        gain += candidate.bandwidth() - candidate.min_bandwidth();
        chosen.push(idx);
    }
    if arrival.bandwidth() > engine.free() + gain {
        return Ok(false);
    }

    let now = engine.now();
    for idx in chosen {
        let freed = engine.running[idx].shrink(now)?;
        engine.release(freed)?;
        debug!(
            job_id = engine.running[idx].id(),
            tick = now,
            freed,
            "running job compressed"
        );
    }
    Ok(true)
}
