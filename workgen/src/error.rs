use thiserror::Error;

use scheduler::SchedulerError;

#[derive(Error, Debug)]
pub enum GenError {
    #[error("invalid generator parameters: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Workload(#[from] SchedulerError),
}
