//! The generators themselves.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use scheduler::job::{IdAllocator, Job, Priority};
use scheduler::workload::Workload;

use crate::error::GenError;
use crate::params::{GenParams, PriorityPolicy};

/// Produce a workload under `policy`, sorted by arrival time.
pub fn generate(params: &GenParams, policy: PriorityPolicy) -> Result<Workload, GenError> {
    params.validate()?;

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut alloc = IdAllocator::new();

    let mut jobs = match policy {
        PriorityPolicy::Random => {
            random_jobs(&mut rng, &mut alloc, params.count, params, params.start_time, params.end_time, None)
        }
        PriorityPolicy::AscendingByPriority => ascending_by_priority(&mut rng, &mut alloc, params),
        PriorityPolicy::RegularPremiumThenEnterprise => {
            regular_premium_then_enterprise(&mut rng, &mut alloc, params)
        }
        PriorityPolicy::HighBandwidthChunks => high_bandwidth_chunks(&mut rng, &mut alloc, params),
    };

    jobs.sort_by_key(Job::created_time);
    debug!(
        policy = policy.label(),
        jobs = jobs.len(),
        seed = params.seed,
        "workload generated"
    );
    Ok(Workload::new(jobs)?)
}

/// Uniformly random jobs within `[window_start, window_end)`. Demands stay
/// at or below half of capacity; durations never outlive the window.
fn random_jobs(
    rng: &mut StdRng,
    alloc: &mut IdAllocator,
    count: usize,
    params: &GenParams,
    window_start: u64,
    window_end: u64,
    priority: Option<Priority>,
) -> Vec<Job> {
    let max_bandwidth = (params.capacity / 2).max(1);
    (0..count)
        .map(|_| {
            let bandwidth = rng.gen_range(1..=max_bandwidth);
            let min_bandwidth = rng.gen_range(0..=bandwidth);
            let created = rng.gen_range(window_start..window_end);
            let duration = rng.gen_range(1..=window_end - created);
            let priority = priority.unwrap_or_else(|| random_priority(rng));
            Job::new(
                alloc.next_id(),
                bandwidth,
                min_bandwidth,
                created,
                duration,
                priority,
            )
        })
        .collect()
}

fn random_priority(rng: &mut StdRng) -> Priority {
    Priority::ALL[rng.gen_range(0..Priority::ALL.len())]
}

/// One tier per third of the window, lowest tier first. The count splits
/// `count/3` each for Premium and Enterprise, remainder to Regular.
fn ascending_by_priority(rng: &mut StdRng, alloc: &mut IdAllocator, params: &GenParams) -> Vec<Job> {
    let per_tier = params.count / 3;
    let regular_count = params.count - 2 * per_tier;

    let span = params.end_time - params.start_time;
    let third = span / 3;
    let first_cut = params.start_time + third;
    let second_cut = params.start_time + 2 * third;

    let mut jobs = random_jobs(
        rng,
        alloc,
        regular_count,
        params,
        params.start_time,
        first_cut,
        Some(Priority::Regular),
    );
    jobs.extend(random_jobs(
        rng,
        alloc,
        per_tier,
        params,
        first_cut,
        second_cut,
        Some(Priority::Premium),
    ));
    jobs.extend(random_jobs(
        rng,
        alloc,
        per_tier,
        params,
        second_cut,
        params.end_time,
        Some(Priority::Enterprise),
    ));
    jobs
}

/// Regular and Premium share the first two thirds of the window; Enterprise
/// arrives in the final third.
fn regular_premium_then_enterprise(
    rng: &mut StdRng,
    alloc: &mut IdAllocator,
    params: &GenParams,
) -> Vec<Job> {
    let per_tier = params.count / 3;
    let regular_count = params.count - 2 * per_tier;

    let span = params.end_time - params.start_time;
    let cut = params.start_time + 2 * (span / 3);

    let mut jobs = random_jobs(
        rng,
        alloc,
        regular_count,
        params,
        params.start_time,
        cut,
        Some(Priority::Regular),
    );
    jobs.extend(random_jobs(
        rng,
        alloc,
        per_tier,
        params,
        params.start_time,
        cut,
        Some(Priority::Premium),
    ));
    jobs.extend(random_jobs(
        rng,
        alloc,
        per_tier,
        params,
        cut,
        params.end_time,
        Some(Priority::Enterprise),
    ));
    jobs
}

/// Groups of three Enterprise jobs sized to collide: 0.6 of capacity plus
/// two at half capacity, each group staggered by `max_duration`.
fn high_bandwidth_chunks(rng: &mut StdRng, alloc: &mut IdAllocator, params: &GenParams) -> Vec<Job> {
    let bandwidths = [
        params.capacity * 6 / 10,
        params.capacity / 2,
        params.capacity / 2,
    ];

    let mut jobs = Vec::new();
    let mut created = params.start_time;
    let mut remaining = params.count;
    while remaining > 0 {
        for bandwidth in bandwidths {
            let bandwidth = bandwidth.max(1);
            let min_bandwidth = rng.gen_range(0..=bandwidth);
            let duration = rng.gen_range(1..=params.max_duration);
            jobs.push(Job::new(
                alloc.next_id(),
                bandwidth,
                min_bandwidth,
                created,
                duration,
                Priority::Enterprise,
            ));
        }
        remaining = remaining.saturating_sub(3);
        created += params.max_duration;
    }
    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use scheduler::{Algorithm, SchedulerConfig};

    fn params(count: usize, capacity: u64) -> GenParams {
        GenParams {
            count,
            capacity,
            start_time: 0,
            end_time: 60,
            max_duration: 10,
            seed: 7,
        }
    }

    #[test]
    fn same_seed_means_same_workload() {
        let p = params(40, 50);
        let a = generate(&p, PriorityPolicy::Random).unwrap();
        let b = generate(&p, PriorityPolicy::Random).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_diverge() {
        let a = generate(&params(40, 50), PriorityPolicy::Random).unwrap();
        let mut p = params(40, 50);
        p.seed = 8;
        let b = generate(&p, PriorityPolicy::Random).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn random_jobs_are_sorted_and_within_window() {
        let p = params(60, 50);
        let workload = generate(&p, PriorityPolicy::Random).unwrap();
        assert_eq!(workload.len(), 60);

        let jobs = workload.jobs();
        for pair in jobs.windows(2) {
            assert!(pair[0].created_time() <= pair[1].created_time());
        }
        for job in jobs {
            assert!(job.bandwidth() <= p.capacity / 2);
            assert!(job.min_bandwidth() <= job.bandwidth());
            assert!(job.created_time() < p.end_time);
            assert!(job.created_time() + job.duration() <= p.end_time);
        }
    }

    #[test]
    fn ascending_policy_places_tiers_in_thirds() {
        let p = params(90, 50);
        let workload = generate(&p, PriorityPolicy::AscendingByPriority).unwrap();
        assert_eq!(workload.len(), 90);

        for job in workload.jobs() {
            match job.priority() {
                Priority::Regular => assert!(job.created_time() < 20),
                Priority::Premium => assert!((20..40).contains(&job.created_time())),
                Priority::Enterprise => assert!((40..60).contains(&job.created_time())),
            }
        }
    }

    #[test]
    fn reg_prem_ent_policy_keeps_enterprise_last() {
        let p = params(90, 50);
        let workload = generate(&p, PriorityPolicy::RegularPremiumThenEnterprise).unwrap();

        for job in workload.jobs() {
            match job.priority() {
                Priority::Regular | Priority::Premium => assert!(job.created_time() < 40),
                Priority::Enterprise => assert!((40..60).contains(&job.created_time())),
            }
        }
    }

    #[test]
    fn chunk_policy_builds_staggered_groups_of_three() {
        let p = params(9, 50);
        let workload = generate(&p, PriorityPolicy::HighBandwidthChunks).unwrap();
        assert_eq!(workload.len(), 9);

        let jobs = workload.jobs();
        for group in 0..3 {
            let start = group as u64 * p.max_duration;
            let members: Vec<_> = jobs
                .iter()
                .filter(|j| j.created_time() == start)
                .collect();
            assert_eq!(members.len(), 3);

            let mut bandwidths: Vec<u64> = members.iter().map(|j| j.bandwidth()).collect();
            bandwidths.sort_unstable();
            assert_eq!(bandwidths, vec![25, 25, 30]);
        }
        assert!(jobs.iter().all(|j| j.priority() == Priority::Enterprise));
    }

    #[test]
    fn chunk_policy_rounds_count_up_to_whole_groups() {
        let workload = generate(&params(7, 50), PriorityPolicy::HighBandwidthChunks).unwrap();
        assert_eq!(workload.len(), 9);
    }

    #[test]
    fn invalid_params_are_rejected() {
        let mut p = params(0, 50);
        assert!(matches!(
            generate(&p, PriorityPolicy::Random),
            Err(GenError::InvalidParams(_))
        ));

        p = params(10, 1);
        assert!(matches!(
            generate(&p, PriorityPolicy::Random),
            Err(GenError::InvalidParams(_))
        ));

        p = params(10, 50);
        p.end_time = p.start_time + 2;
        assert!(matches!(
            generate(&p, PriorityPolicy::Random),
            Err(GenError::InvalidParams(_))
        ));
    }

    #[test]
    fn generated_workloads_schedule_cleanly() {
        // A chunk workload is deliberately oversubscribed; every algorithm
        // must still drain it without an invariant breach.
        let p = params(12, 10);
        for policy in PriorityPolicy::ALL {
            let workload = generate(&p, policy).unwrap();
            for algorithm in Algorithm::ALL {
                let plan = algorithm
                    .scheduler(SchedulerConfig::default())
                    .run(workload.clone(), p.capacity)
                    .unwrap();
                assert_eq!(
                    plan.completed().len(),
                    workload.len(),
                    "{algorithm} {:?}",
                    policy
                );
            }
        }
    }
}
