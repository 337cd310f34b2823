use thiserror::Error;

use crate::job::JobId;

/// Everything a scheduler run can fail with.
///
/// `InsufficientBandwidth` is the only recoverable condition: callers treat
/// it as "this job cannot shrink" and move on. The rest abort the run.
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("scheduler invariant violated: {0}")]
    InvariantBreach(String),

    #[error("insufficient bandwidth for job {job}: already at floor {floor}")]
    InsufficientBandwidth { job: JobId, floor: u64 },

    #[error("malformed workload: {0}")]
    MalformedWorkload(String),

    #[error("tick budget exhausted: run exceeded {0} ticks")]
    TickBudgetExhausted(u64),
}
