//! Priority-driven preemption.

use tracing::debug;

use crate::engine::{BlockedPolicy, Engine, run_to_completion};
use crate::error::SchedulerError;
use crate::job::Job;
use crate::plan::ExecutionPlan;
use crate::policy::victim_order;
use crate::types::{Algorithm, Scheduler, SchedulerConfig};
use crate::workload::Workload;

/// A blocked arrival may evict running jobs of lower or equal priority,
/// most expendable first, until it fits. Evicted jobs log their completed
/// run segment, keep their remaining work and re-enter the waiting set
/// eligible from the next tick. Eviction is atomic: if a full sweep cannot
/// free enough, no running job is touched.
#[derive(Debug, Default)]
pub struct PreemptivePriority {
    cfg: SchedulerConfig,
}

impl PreemptivePriority {
    pub fn new(cfg: SchedulerConfig) -> Self {
        Self { cfg }
    }
}

impl BlockedPolicy for PreemptivePriority {
    fn on_blocked(&self, engine: &mut Engine, job: Job) -> Result<(), SchedulerError> {
        if evict_to_fit(engine, &job)? {
            engine.admit(job)
        } else {
            engine.defer(job)
        }
    }
}

impl Scheduler for PreemptivePriority {
    fn algorithm(&self) -> Algorithm {
        Algorithm::PreemptivePriority
    }

    fn run(&self, workload: Workload, capacity: u64) -> Result<ExecutionPlan, SchedulerError> {
        run_to_completion(self, workload, capacity, self.cfg)
    }
}

/// Plan an eviction sweep over running jobs with priority at most the
/// arrival's, in victim order, and commit it only if `arrival` then fits.
fn evict_to_fit(engine: &mut Engine, arrival: &Job) -> Result<bool, SchedulerError> {
    let mut order: Vec<usize> = (0..engine.running.len())
        .filter(|&i| engine.running[i].priority() <= arrival.priority())
        .collect();
    order.sort_by(|&a, &b| victim_order(&engine.running[a], &engine.running[b]));

    let mut chosen = Vec::new();
    let mut gain = 0;
    for idx in order {
        if arrival.bandwidth() <= engine.free() + gain {
            break;
        }
        gain += engine.running[idx].bandwidth();
        chosen.push(idx);
    }
    if arrival.bandwidth() > engine.free() + gain {
        return Ok(false);
    }

    // Remove by descending index so the remaining indices stay valid.
    chosen.sort_unstable_by(|a, b| b.cmp(a));
    let now = engine.now();
    for idx in chosen {
        let mut evicted = engine.running.remove(idx);
        engine.release(evicted.bandwidth())?;
        evicted.suspend(now)?;
        evicted.resume_at(now + 1)?;
        debug!(
            job_id = evicted.id(),
            tick = now,
            remaining = evicted.remaining_duration(),
            for_job = arrival.id(),
            "job evicted"
        );
        engine.waiting.push(evicted);
    }
    Ok(true)
}
