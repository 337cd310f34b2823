//! Post-run scoring aggregates.
//!
//! Each finished job carries its own lateness score; this module rolls them
//! up into the per-priority averages that are the headline outcome of a run.

use std::collections::BTreeMap;
use std::fmt;

use crate::job::Priority;
use crate::plan::ExecutionPlan;

/// Score statistics for one service tier.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TierStats {
    pub jobs: usize,
    pub total_score: u64,
    pub average: f64,
}

/// Per-priority score averages plus the completion window of the run.
/// Lower averages are better.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSummary {
    per_priority: BTreeMap<Priority, TierStats>,
    window_start: Option<u64>,
    window_end: Option<u64>,
    completed: usize,
    dropped: usize,
}

impl ScoreSummary {
    pub fn from_plan(plan: &ExecutionPlan) -> Self {
        let mut per_priority: BTreeMap<Priority, TierStats> = BTreeMap::new();
        for job in plan.completed() {
            if let Some(score) = job.score() {
                let stats = per_priority.entry(job.priority()).or_default();
                stats.jobs += 1;
                stats.total_score += score;
            }
        }
        for stats in per_priority.values_mut() {
            stats.average = stats.total_score as f64 / stats.jobs as f64;
        }

        Self {
            per_priority,
            window_start: plan.completed().iter().map(|j| j.created_time()).min(),
            window_end: plan.max_end_time(),
            completed: plan.completed().len(),
            dropped: plan.dropped().len(),
        }
    }

    pub fn tier(&self, priority: Priority) -> Option<&TierStats> {
        self.per_priority.get(&priority)
    }

    /// Earliest arrival among completed jobs.
    pub fn window_start(&self) -> Option<u64> {
        self.window_start
    }

    /// Latest completion tick.
    pub fn window_end(&self) -> Option<u64> {
        self.window_end
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl fmt::Display for ScoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "average score per priority:")?;
        for priority in Priority::ALL {
            match self.per_priority.get(&priority) {
                Some(stats) => write!(f, " {}:{:.2}", priority, stats.average)?,
                None => write!(f, " {priority}:-")?,
            }
        }
        match (self.window_start, self.window_end) {
            (Some(start), Some(end)) => write!(f, " | window {start}..{end}")?,
            _ => write!(f, " | window empty")?,
        }
        write!(f, " | completed {} dropped {}", self.completed, self.dropped)
    }
}
