//! Queue ordering policy.
//!
//! Every "pick the best job" decision in the engine reduces to one of two
//! total orders, each specified once and used everywhere.

use std::cmp::Ordering;

use crate::job::Job;

/// Admission order: higher priority first, then earliest arrival, then
/// lowest id. Total and stable, so per-tick admission is deterministic.
pub(crate) fn admission_order(a: &Job, b: &Job) -> Ordering {
    b.priority()
        .cmp(&a.priority())
        .then_with(|| a.created_time().cmp(&b.created_time()))
        .then_with(|| a.id().cmp(&b.id()))
}

/// Victim order for shrink sweeps and evictions: cheapest tier first, then
/// the job with the most work left, then lowest id. Taking the most
/// expensive lower-tier job first means one victim suffices more often.
pub(crate) fn victim_order(a: &Job, b: &Job) -> Ordering {
    a.priority()
        .cmp(&b.priority())
        .then_with(|| b.remaining_duration().cmp(&a.remaining_duration()))
        .then_with(|| a.id().cmp(&b.id()))
}
