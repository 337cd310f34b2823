//! Ordered job batches and the portable record boundary.
//!
//! A workload validates on construction, before any tick runs: duplicate or
//! zero ids, zero durations and inverted bandwidth bounds are rejected here,
//! never discovered mid-simulation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;
use crate::job::{Job, JobId, Priority};

/// Wire form of one job. A serialized workload is a JSON array of these,
/// with priority spelled as the tier name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub bandwidth: u64,
    pub min_bandwidth: u64,
    pub original_bandwidth: u64,
    pub created_time: u64,
    pub duration: u64,
    pub priority: Priority,
}

impl From<&Job> for JobRecord {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id(),
            bandwidth: job.bandwidth(),
            min_bandwidth: job.min_bandwidth(),
            original_bandwidth: job.original_bandwidth(),
            created_time: job.created_time(),
            duration: job.duration(),
            priority: job.priority(),
        }
    }
}

/// An ordered batch of jobs, typically sorted by `created_time`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    jobs: Vec<Job>,
}

impl Workload {
    /// Validate and wrap a batch. Order is preserved as given.
    pub fn new(jobs: Vec<Job>) -> Result<Self, SchedulerError> {
        let mut seen = HashSet::with_capacity(jobs.len());
        for job in &jobs {
            if job.id() == 0 {
                return Err(SchedulerError::MalformedWorkload(
                    "job id 0 is reserved for idle grid cells".into(),
                ));
            }
            if !seen.insert(job.id()) {
                return Err(SchedulerError::MalformedWorkload(format!(
                    "duplicate job id {}",
                    job.id()
                )));
            }
            if job.duration() == 0 {
                return Err(SchedulerError::MalformedWorkload(format!(
                    "job {}: duration must be positive",
                    job.id()
                )));
            }
            if job.min_bandwidth() > job.bandwidth() {
                return Err(SchedulerError::MalformedWorkload(format!(
                    "job {}: min_bandwidth {} exceeds bandwidth {}",
                    job.id(),
                    job.min_bandwidth(),
                    job.bandwidth()
                )));
            }
            if job.bandwidth() > job.original_bandwidth() {
                return Err(SchedulerError::MalformedWorkload(format!(
                    "job {}: bandwidth {} exceeds original bandwidth {}",
                    job.id(),
                    job.bandwidth(),
                    job.original_bandwidth()
                )));
            }
        }
        Ok(Self { jobs })
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub(crate) fn into_jobs(self) -> Vec<Job> {
        self.jobs
    }

    pub fn to_records(&self) -> Vec<JobRecord> {
        self.jobs.iter().map(JobRecord::from).collect()
    }

    pub fn from_records(records: Vec<JobRecord>) -> Result<Self, SchedulerError> {
        let jobs = records
            .into_iter()
            .map(|r| {
                Job::from_record_parts(
                    r.id,
                    r.bandwidth,
                    r.min_bandwidth,
                    r.original_bandwidth,
                    r.created_time,
                    r.duration,
                    r.priority,
                )
            })
            .collect();
        Self::new(jobs)
    }

    /// Serialize to the pretty-printed JSON record array.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_records())
    }

    /// Parse a JSON record array. Parse failures and field violations both
    /// report as malformed input.
    pub fn from_json_str(s: &str) -> Result<Self, SchedulerError> {
        let records: Vec<JobRecord> = serde_json::from_str(s)
            .map_err(|e| SchedulerError::MalformedWorkload(format!("invalid JSON: {e}")))?;
        Self::from_records(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk_record(id: JobId) -> JobRecord {
        JobRecord {
            id,
            bandwidth: 4,
            min_bandwidth: 2,
            original_bandwidth: 6,
            created_time: 1,
            duration: 3,
            priority: Priority::Premium,
        }
    }

    #[test]
    fn accepts_a_valid_batch() {
        let workload = Workload::from_records(vec![mk_record(1), mk_record(2)]).unwrap();
        assert_eq!(workload.len(), 2);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = Workload::from_records(vec![mk_record(7), mk_record(7)]).unwrap_err();
        assert!(matches!(err, SchedulerError::MalformedWorkload(_)));
    }

    #[test]
    fn rejects_id_zero() {
        let err = Workload::from_records(vec![mk_record(0)]).unwrap_err();
        assert!(matches!(err, SchedulerError::MalformedWorkload(_)));
    }

    #[test]
    fn rejects_zero_duration() {
        let mut record = mk_record(1);
        record.duration = 0;
        let err = Workload::from_records(vec![record]).unwrap_err();
        assert!(matches!(err, SchedulerError::MalformedWorkload(_)));
    }

    #[test]
    fn rejects_min_bandwidth_above_bandwidth() {
        let mut record = mk_record(1);
        record.min_bandwidth = 5;
        let err = Workload::from_records(vec![record]).unwrap_err();
        assert!(matches!(err, SchedulerError::MalformedWorkload(_)));
    }

    #[test]
    fn rejects_bandwidth_above_original() {
        let mut record = mk_record(1);
        record.bandwidth = 7;
        record.original_bandwidth = 6;
        let err = Workload::from_records(vec![record]).unwrap_err();
        assert!(matches!(err, SchedulerError::MalformedWorkload(_)));
    }

    #[test]
    fn json_round_trip_is_record_exact() {
        let records = vec![mk_record(1), mk_record(2), mk_record(3)];
        let workload = Workload::from_records(records.clone()).unwrap();

        let json = workload.to_json_string().unwrap();
        let back = Workload::from_json_str(&json).unwrap();

        assert_eq!(back.to_records(), records);
        assert_eq!(back, workload);
    }

    #[test]
    fn priority_serializes_as_tier_name() {
        let json = Workload::from_records(vec![mk_record(1)])
            .unwrap()
            .to_json_string()
            .unwrap();
        assert!(json.contains("\"PREMIUM\""));
    }

    #[test]
    fn garbage_input_is_malformed() {
        let err = Workload::from_json_str("not json").unwrap_err();
        assert!(matches!(err, SchedulerError::MalformedWorkload(_)));
    }
}
