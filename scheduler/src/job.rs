//! The job entity and its state machine.
//!
//! A job carries identity, demand, timing and accounting state through a
//! run. All mutation goes through checked transition methods driven by the
//! engine; an illegal transition surfaces as an invariant breach instead of
//! silently corrupting the plan.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;

pub type JobId = u32;

/// Service tier. A higher tier wins every scheduling tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Regular = 1,
    Premium = 2,
    Enterprise = 3,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Regular, Priority::Premium, Priority::Enterprise];

    pub fn name(self) -> &'static str {
        match self {
            Priority::Regular => "REGULAR",
            Priority::Premium => "PREMIUM",
            Priority::Enterprise => "ENTERPRISE",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lifecycle state of a job.
///
/// `Suspended` exists only between the two halves of an eviction; plans
/// returned to callers contain the other four states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    InProgress,
    Suspended,
    Finished,
    Dropped,
}

/// A maximal run interval `[start, end]` (ticks, inclusive) during which the
/// job continuously held `bandwidth` units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: u64,
    pub end: u64,
    pub bandwidth: u64,
}

impl Segment {
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Mints job ids starting at 1 (`0` marks an idle cell in the grid).
///
/// One allocator per workload keeps id assignment deterministic when many
/// scenarios are generated in parallel.
#[derive(Debug)]
pub struct IdAllocator {
    next: JobId,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> JobId {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// A unit of schedulable work: a bandwidth demand over a duration, arriving
/// at `created_time` with a service tier.
///
/// `bandwidth` is the demand currently in force; it can only move down
/// (towards `min_bandwidth`, via compression) and never back up before the
/// job finishes. `remaining_duration` counts the ticks of work left and is
/// the sole trigger for retirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    id: JobId,
    created_time: u64,
    duration: u64,
    priority: Priority,
    bandwidth: u64,
    original_bandwidth: u64,
    min_bandwidth: u64,
    status: JobStatus,
    actual_start_time: u64,
    remaining_duration: u64,
    actual_end_time: Option<u64>,
    score: Option<u64>,
    run_log: Vec<Segment>,
    /// Start tick of the currently open segment, while in progress.
    segment_start: Option<u64>,
}

impl Job {
    pub fn new(
        id: JobId,
        bandwidth: u64,
        min_bandwidth: u64,
        created_time: u64,
        duration: u64,
        priority: Priority,
    ) -> Self {
        Self {
            id,
            created_time,
            duration,
            priority,
            bandwidth,
            original_bandwidth: bandwidth,
            min_bandwidth,
            status: JobStatus::Pending,
            actual_start_time: created_time,
            remaining_duration: duration,
            actual_end_time: None,
            score: None,
            run_log: Vec::new(),
            segment_start: None,
        }
    }

    /// Rebuild a job from its portable record, where current and original
    /// bandwidth may differ. Field validation happens at workload entry.
    pub(crate) fn from_record_parts(
        id: JobId,
        bandwidth: u64,
        min_bandwidth: u64,
        original_bandwidth: u64,
        created_time: u64,
        duration: u64,
        priority: Priority,
    ) -> Self {
        let mut job = Self::new(id, bandwidth, min_bandwidth, created_time, duration, priority);
        job.original_bandwidth = original_bandwidth;
        job
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn created_time(&self) -> u64 {
        self.created_time
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn bandwidth(&self) -> u64 {
        self.bandwidth
    }

    pub fn original_bandwidth(&self) -> u64 {
        self.original_bandwidth
    }

    pub fn min_bandwidth(&self) -> u64 {
        self.min_bandwidth
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn actual_start_time(&self) -> u64 {
        self.actual_start_time
    }

    pub fn remaining_duration(&self) -> u64 {
        self.remaining_duration
    }

    pub fn actual_end_time(&self) -> Option<u64> {
        self.actual_end_time
    }

    pub fn score(&self) -> Option<u64> {
        self.score
    }

    /// Closed run segments, oldest first. For a finished job the segment
    /// lengths sum to `duration`.
    pub fn run_log(&self) -> &[Segment] {
        &self.run_log
    }

    /// A compressed job sits at its floor and cannot shrink further.
    pub fn is_compressed(&self) -> bool {
        self.bandwidth == self.min_bandwidth
    }

    fn expect_status(&self, want: JobStatus, op: &str) -> Result<(), SchedulerError> {
        if self.status != want {
            return Err(SchedulerError::InvariantBreach(format!(
                "job {}: {} from {:?} (expected {:?})",
                self.id, op, self.status, want
            )));
        }
        Ok(())
    }

    /// Begin (or resume) execution at tick `now`.
    pub(crate) fn start(&mut self, now: u64) -> Result<(), SchedulerError> {
        self.expect_status(JobStatus::Pending, "start")?;
        self.status = JobStatus::InProgress;
        self.actual_start_time = now;
        self.segment_start = Some(now);
        Ok(())
    }

    /// Account one tick of work. Returns the remaining duration.
    pub(crate) fn tick_work(&mut self) -> Result<u64, SchedulerError> {
        self.expect_status(JobStatus::InProgress, "tick_work")?;
        if self.remaining_duration == 0 {
            return Err(SchedulerError::InvariantBreach(format!(
                "job {}: ticked with no work left",
                self.id
            )));
        }
        self.remaining_duration -= 1;
        Ok(self.remaining_duration)
    }

    /// Complete the job at the retire step of tick `now`. The job's final
    /// running tick, and thus its end time, is `now - 1`.
    pub(crate) fn finish(&mut self, now: u64) -> Result<(), SchedulerError> {
        self.expect_status(JobStatus::InProgress, "finish")?;
        if self.remaining_duration != 0 {
            return Err(SchedulerError::InvariantBreach(format!(
                "job {}: finished with {} ticks of work left",
                self.id, self.remaining_duration
            )));
        }
        let Some(seg_start) = self.segment_start.take() else {
            return Err(SchedulerError::InvariantBreach(format!(
                "job {}: finished without an open segment",
                self.id
            )));
        };
        if seg_start >= now {
            return Err(SchedulerError::InvariantBreach(format!(
                "job {}: finished in the tick it started",
                self.id
            )));
        }
        let end = now - 1;
        self.run_log.push(Segment {
            start: seg_start,
            end,
            bandwidth: self.bandwidth,
        });
        self.actual_end_time = Some(end);
        let latency = self.actual_start_time - self.created_time;
        let stretch = (end - self.actual_start_time).saturating_sub(self.duration);
        self.score = Some(latency + stretch);
        self.status = JobStatus::Finished;
        Ok(())
    }

    /// Compress the job to its minimum bandwidth at tick `now`, closing the
    /// segment that ran at the wider demand. Returns the freed units.
    ///
    /// Shrinking a job already at its floor is the recoverable
    /// `InsufficientBandwidth` condition; callers treat it as "cannot shrink
    /// this job".
    pub(crate) fn shrink(&mut self, now: u64) -> Result<u64, SchedulerError> {
        self.expect_status(JobStatus::InProgress, "shrink")?;
        if self.is_compressed() {
            return Err(SchedulerError::InsufficientBandwidth {
                job: self.id,
                floor: self.min_bandwidth,
            });
        }
        let Some(seg_start) = self.segment_start else {
            return Err(SchedulerError::InvariantBreach(format!(
                "job {}: shrink without an open segment",
                self.id
            )));
        };
        if seg_start < now {
            self.run_log.push(Segment {
                start: seg_start,
                end: now - 1,
                bandwidth: self.bandwidth,
            });
            self.segment_start = Some(now);
        }
        let freed = self.bandwidth - self.min_bandwidth;
        self.bandwidth = self.min_bandwidth;
        Ok(freed)
    }

    /// First half of an eviction: stop running at tick `now` and log the
    /// completed segment. Remaining duration is untouched.
    pub(crate) fn suspend(&mut self, now: u64) -> Result<(), SchedulerError> {
        self.expect_status(JobStatus::InProgress, "suspend")?;
        let Some(seg_start) = self.segment_start.take() else {
            return Err(SchedulerError::InvariantBreach(format!(
                "job {}: suspended without an open segment",
                self.id
            )));
        };
        if seg_start < now {
            self.run_log.push(Segment {
                start: seg_start,
                end: now - 1,
                bandwidth: self.bandwidth,
            });
        }
        self.status = JobStatus::Suspended;
        Ok(())
    }

    /// Second half of an eviction: back to the waiting set, eligible at `t`.
    pub(crate) fn resume_at(&mut self, t: u64) -> Result<(), SchedulerError> {
        self.expect_status(JobStatus::Suspended, "resume_at")?;
        self.status = JobStatus::Pending;
        self.actual_start_time = t;
        Ok(())
    }

    /// Push the next admission attempt to tick `t`.
    pub(crate) fn defer_until(&mut self, t: u64) -> Result<(), SchedulerError> {
        self.expect_status(JobStatus::Pending, "defer")?;
        self.actual_start_time = t;
        Ok(())
    }

    /// Give up on the job: it would outlive the configured horizon.
    pub(crate) fn mark_dropped(&mut self) -> Result<(), SchedulerError> {
        self.expect_status(JobStatus::Pending, "drop")?;
        self.status = JobStatus::Dropped;
        Ok(())
    }
}
