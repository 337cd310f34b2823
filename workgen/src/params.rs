//! Generation parameters and priority placement policies.

use crate::error::GenError;

/// How priorities are assigned across the generation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityPolicy {
    /// Uniform over the three tiers.
    Random,
    /// One tier per third of the window, lowest tier first.
    AscendingByPriority,
    /// Regular and Premium over the first two thirds, Enterprise last.
    RegularPremiumThenEnterprise,
    /// Groups of three same-priority jobs at 0.6/0.5/0.5 of capacity,
    /// staggered by `max_duration`.
    HighBandwidthChunks,
}

impl PriorityPolicy {
    pub const ALL: [PriorityPolicy; 4] = [
        PriorityPolicy::Random,
        PriorityPolicy::AscendingByPriority,
        PriorityPolicy::RegularPremiumThenEnterprise,
        PriorityPolicy::HighBandwidthChunks,
    ];

    /// Short name used in generated file names.
    pub fn label(self) -> &'static str {
        match self {
            PriorityPolicy::Random => "random",
            PriorityPolicy::AscendingByPriority => "ascending",
            PriorityPolicy::RegularPremiumThenEnterprise => "reg_prem_ent",
            PriorityPolicy::HighBandwidthChunks => "chunks",
        }
    }
}

/// Knobs shared by every policy.
#[derive(Debug, Clone, Copy)]
pub struct GenParams {
    /// Number of jobs to produce (`HighBandwidthChunks` rounds up to whole
    /// groups of three).
    pub count: usize,
    /// Total capacity the workload will be scheduled against; individual
    /// demands stay at or below half of it (chunk policy excepted).
    pub capacity: u64,
    /// Inclusive start of the arrival window.
    pub start_time: u64,
    /// Exclusive end of the arrival window; also bounds durations.
    pub end_time: u64,
    /// Per-job duration cap for the chunk policy, and its stagger step.
    pub max_duration: u64,
    /// Seed for the generator's RNG.
    pub seed: u64,
}

impl GenParams {
    pub(crate) fn validate(&self) -> Result<(), GenError> {
        if self.count == 0 {
            return Err(GenError::InvalidParams("count must be positive".into()));
        }
        if self.capacity < 2 {
            return Err(GenError::InvalidParams(
                "capacity must be at least 2".into(),
            ));
        }
        if self.end_time < self.start_time + 3 {
            return Err(GenError::InvalidParams(format!(
                "window [{}, {}) is too narrow to place jobs",
                self.start_time, self.end_time
            )));
        }
        if self.max_duration == 0 {
            return Err(GenError::InvalidParams(
                "max_duration must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl Default for GenParams {
    fn default() -> Self {
        Self {
            count: 1000,
            capacity: 50,
            start_time: 0,
            end_time: 255,
            max_duration: 50,
            seed: 0,
        }
    }
}
