//! The shared discrete-time simulation loop.
//!
//! All three algorithms drive the same engine. Per tick, in order:
//!   1. Retire: account one tick of work per running job; jobs reaching
//!      zero remaining work finish and return their bandwidth.
//!   2. Admit: consider eligible waiting jobs in admission order; each is
//!      admitted, dropped (horizon), handed to the algorithm's blocked
//!      fallback, or deferred to the next tick.
//!   3. Advance the clock.
//!
//! The algorithms differ only in step 2's fallback, which is the single
//! `BlockedPolicy` seam.

use tracing::debug;

use crate::error::SchedulerError;
use crate::job::Job;
use crate::plan::ExecutionPlan;
use crate::policy::admission_order;
use crate::types::SchedulerConfig;
use crate::workload::Workload;

/// Algorithm-specific handling of an arrival whose demand exceeds free
/// capacity: make room (compress, evict) and admit, or defer to `t + 1`.
pub(crate) trait BlockedPolicy {
    fn on_blocked(&self, engine: &mut Engine, job: Job) -> Result<(), SchedulerError>;
}

/// Owns every collection a run touches, the free-capacity ledger and the
/// logical clock. No data leaves the engine until the run is complete.
pub(crate) struct Engine {
    capacity: u64,
    free: u64,
    now: u64,
    pub(crate) waiting: Vec<Job>,
    pub(crate) running: Vec<Job>,
    completed: Vec<Job>,
    dropped: Vec<Job>,
    horizon: Option<u64>,
    max_ticks: Option<u64>,
}

impl Engine {
    pub(crate) fn new(
        workload: Workload,
        capacity: u64,
        cfg: SchedulerConfig,
    ) -> Result<Self, SchedulerError> {
        if capacity == 0 {
            return Err(SchedulerError::MalformedWorkload(
                "capacity must be positive".into(),
            ));
        }
        let jobs = workload.into_jobs();
        for job in &jobs {
            // A demand beyond total capacity can never be admitted by any
            // algorithm and would defer forever, voiding the drain guarantee.
            if job.bandwidth() > capacity {
                return Err(SchedulerError::MalformedWorkload(format!(
                    "job {} demands {} of {} total capacity",
                    job.id(),
                    job.bandwidth(),
                    capacity
                )));
            }
        }
        Ok(Self {
            capacity,
            free: capacity,
            now: 0,
            waiting: jobs,
            running: Vec::new(),
            completed: Vec::new(),
            dropped: Vec::new(),
            horizon: cfg.horizon,
            max_ticks: cfg.max_ticks,
        })
    }

    pub(crate) fn now(&self) -> u64 {
        self.now
    }

    pub(crate) fn free(&self) -> u64 {
        self.free
    }

    pub(crate) fn fits(&self, job: &Job) -> bool {
        job.bandwidth() <= self.free
    }

    fn drained(&self) -> bool {
        self.waiting.is_empty() && self.running.is_empty()
    }

    /// Step 1: account work done during the previous tick and retire jobs
    /// whose remaining duration reaches zero.
    fn retire(&mut self) -> Result<(), SchedulerError> {
        let mut i = 0;
        while i < self.running.len() {
            if self.running[i].tick_work()? == 0 {
                let mut job = self.running.remove(i);
                job.finish(self.now)?;
                self.release(job.bandwidth())?;
                debug!(
                    job_id = job.id(),
                    tick = self.now,
                    end = job.actual_end_time(),
                    "job finished"
                );
                self.completed.push(job);
            } else {
                i += 1;
            }
        }
        Ok(())
    }

    /// Pull every waiting job eligible at the current tick, in admission
    /// order.
    fn take_arrivals(&mut self) -> Vec<Job> {
        let now = self.now;
        let mut arrivals = Vec::new();
        let mut i = 0;
        while i < self.waiting.len() {
            if self.waiting[i].actual_start_time() <= now {
                arrivals.push(self.waiting.remove(i));
            } else {
                i += 1;
            }
        }
        arrivals.sort_by(admission_order);
        arrivals
    }

    /// Allocate capacity and start the job at the current tick.
    pub(crate) fn admit(&mut self, mut job: Job) -> Result<(), SchedulerError> {
        if job.bandwidth() > self.free {
            return Err(SchedulerError::InvariantBreach(format!(
                "admitting job {} with demand {} but only {} free",
                job.id(),
                job.bandwidth(),
                self.free
            )));
        }
        self.free -= job.bandwidth();
        job.start(self.now)?;
        debug!(
            job_id = job.id(),
            tick = self.now,
            bandwidth = job.bandwidth(),
            free = self.free,
            "job admitted"
        );
        self.running.push(job);
        Ok(())
    }

    /// Re-queue the job for the next tick.
    pub(crate) fn defer(&mut self, mut job: Job) -> Result<(), SchedulerError> {
        debug!(job_id = job.id(), tick = self.now, "job deferred");
        job.defer_until(self.now + 1)?;
        self.waiting.push(job);
        Ok(())
    }

    /// Return `amount` units to the pool.
    pub(crate) fn release(&mut self, amount: u64) -> Result<(), SchedulerError> {
        self.free += amount;
        if self.free > self.capacity {
            return Err(SchedulerError::InvariantBreach(format!(
                "released bandwidth overflows capacity: {} > {}",
                self.free, self.capacity
            )));
        }
        Ok(())
    }

    fn over_horizon(&self, job: &Job) -> bool {
        match self.horizon {
            Some(h) => self.now + job.remaining_duration() - 1 > h,
            None => false,
        }
    }

    fn drop_job(&mut self, mut job: Job) -> Result<(), SchedulerError> {
        debug!(
            job_id = job.id(),
            tick = self.now,
            "job dropped: would outlive the horizon"
        );
        job.mark_dropped()?;
        self.dropped.push(job);
        Ok(())
    }

    fn advance(&mut self) -> Result<(), SchedulerError> {
        self.now += 1;
        if let Some(limit) = self.max_ticks {
            if self.now > limit {
                return Err(SchedulerError::TickBudgetExhausted(limit));
            }
        }
        Ok(())
    }

    fn into_plan(self) -> ExecutionPlan {
        ExecutionPlan::new(self.capacity, self.completed, self.dropped)
    }
}

/// Drive a workload to completion under `policy`'s blocked-admission
/// fallback. Terminates when both the waiting and running sets are empty;
/// every deferral strictly advances a job's next-eligible tick, so progress
/// is monotonic.
pub(crate) fn run_to_completion<P: BlockedPolicy>(
    policy: &P,
    workload: Workload,
    capacity: u64,
    cfg: SchedulerConfig,
) -> Result<ExecutionPlan, SchedulerError> {
    let mut engine = Engine::new(workload, capacity, cfg)?;
    while !engine.drained() {
        engine.retire()?;
        for job in engine.take_arrivals() {
            if engine.over_horizon(&job) {
                engine.drop_job(job)?;
            } else if engine.fits(&job) {
                engine.admit(job)?;
            } else {
                policy.on_blocked(&mut engine, job)?;
            }
        }
        engine.advance()?;
    }
    Ok(engine.into_plan())
}
