//! Property suites for the quantified run invariants, over seeded random
//! workloads.

use std::collections::BTreeMap;

use proptest::prelude::*;

use scheduler::job::{Job, JobStatus, Priority, Segment};
use scheduler::plan::ExecutionPlan;
use scheduler::workload::{JobRecord, Workload};
use scheduler::{Algorithm, SchedulerConfig};

const CAPACITY: u64 = 20;

#[derive(Debug, Clone)]
struct JobSpec {
    bandwidth: u64,
    min_bandwidth: u64,
    created: u64,
    duration: u64,
    priority: Priority,
}

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::Regular),
        Just(Priority::Premium),
        Just(Priority::Enterprise),
    ]
}

fn arb_job_spec() -> impl Strategy<Value = JobSpec> {
    (1..=CAPACITY, 0u64..40, 1u64..=12, arb_priority()).prop_flat_map(
        |(bandwidth, created, duration, priority)| {
            (0..=bandwidth).prop_map(move |min_bandwidth| JobSpec {
                bandwidth,
                min_bandwidth,
                created,
                duration,
                priority,
            })
        },
    )
}

fn mk_workload(specs: &[JobSpec]) -> Workload {
    let jobs = specs
        .iter()
        .enumerate()
        .map(|(i, s)| {
            Job::new(
                i as u32 + 1,
                s.bandwidth,
                s.min_bandwidth,
                s.created,
                s.duration,
                s.priority,
            )
        })
        .collect();
    Workload::new(jobs).unwrap()
}

fn run(algorithm: Algorithm, workload: Workload) -> ExecutionPlan {
    algorithm
        .scheduler(SchedulerConfig::default())
        .run(workload, CAPACITY)
        .unwrap()
}

/// Per-tick demand reconstructed from the run segments.
fn usage_by_tick(plan: &ExecutionPlan) -> BTreeMap<u64, u64> {
    let mut usage = BTreeMap::new();
    for job in plan.completed() {
        for segment in job.run_log() {
            for tick in segment.start..=segment.end {
                *usage.entry(tick).or_insert(0) += segment.bandwidth;
            }
        }
    }
    usage
}

fn check_common_invariants(plan: &ExecutionPlan, job_count: usize) {
    // --- Totality: no job is lost ---
    assert_eq!(plan.completed().len() + plan.dropped().len(), job_count);

    for job in plan.completed() {
        assert_eq!(job.status(), JobStatus::Finished);
        assert_eq!(job.remaining_duration(), 0);

        // --- Conservation: segment lengths account for the full duration ---
        let worked: u64 = job.run_log().iter().map(Segment::len).sum();
        assert_eq!(worked, job.duration(), "job {}", job.id());

        // --- Segments are ordered and disjoint, none before arrival ---
        for pair in job.run_log().windows(2) {
            assert!(pair[0].end < pair[1].start, "job {}", job.id());
        }
        assert!(job.run_log()[0].start >= job.created_time());

        // --- Score matches its definition ---
        let end = job.actual_end_time().unwrap();
        let expected = (job.actual_start_time() - job.created_time())
            + (end - job.actual_start_time()).saturating_sub(job.duration());
        assert_eq!(job.score(), Some(expected), "job {}", job.id());
    }

    // --- Capacity: total demand never exceeds the pool, at any tick ---
    for (tick, used) in usage_by_tick(plan) {
        assert!(used <= CAPACITY, "tick {tick}: {used} > {CAPACITY}");
    }

    // --- Grid placement must succeed whenever the capacity invariant held ---
    plan.grid().unwrap();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn all_algorithms_uphold_the_run_invariants(
        specs in prop::collection::vec(arb_job_spec(), 1..24)
    ) {
        for algorithm in Algorithm::ALL {
            let plan = run(algorithm, mk_workload(&specs));
            check_common_invariants(&plan, specs.len());

            // --- Determinism: identical inputs, identical plans ---
            let again = run(algorithm, mk_workload(&specs));
            prop_assert_eq!(&plan, &again);
        }
    }

    #[test]
    fn simple_greedy_never_disturbs_a_running_job(
        specs in prop::collection::vec(arb_job_spec(), 1..24)
    ) {
        let plan = run(Algorithm::SimpleGreedy, mk_workload(&specs));
        for job in plan.completed() {
            prop_assert_eq!(job.bandwidth(), job.original_bandwidth());
            prop_assert_eq!(job.run_log().len(), 1);
            let end = job.actual_end_time().unwrap();
            prop_assert_eq!(end - job.actual_start_time() + 1, job.duration());
        }
    }

    #[test]
    fn compression_is_monotonic_and_bounded(
        specs in prop::collection::vec(arb_job_spec(), 1..24)
    ) {
        let plan = run(Algorithm::GreedyCompression, mk_workload(&specs));
        for job in plan.completed() {
            // A job shrinks at most once, straight to its floor, and never
            // re-expands: at most two segments with non-increasing demand.
            prop_assert!(job.run_log().len() <= 2, "job {}", job.id());
            for pair in job.run_log().windows(2) {
                prop_assert!(pair[0].bandwidth > pair[1].bandwidth);
                prop_assert_eq!(pair[1].start, pair[0].end + 1, "shrinking never pauses the job");
                prop_assert_eq!(pair[1].bandwidth, job.min_bandwidth());
            }
            let last = job.run_log().last().unwrap();
            prop_assert_eq!(last.bandwidth, job.bandwidth());
        }
    }

    #[test]
    fn preemption_keeps_demand_constant_and_priority_ordered(
        specs in prop::collection::vec(arb_job_spec(), 1..24)
    ) {
        let plan = run(Algorithm::PreemptivePriority, mk_workload(&specs));
        for job in plan.completed() {
            for segment in job.run_log() {
                prop_assert_eq!(segment.bandwidth, job.original_bandwidth());
            }

            // Every non-final segment was closed by an eviction, so some job
            // of at least this priority must have started on the next tick.
            for pair in job.run_log().windows(2) {
                let evicted_at = pair[0].end + 1;
                let evictor_exists = plan.completed().iter().any(|other| {
                    other.id() != job.id()
                        && other.priority() >= job.priority()
                        && other.run_log().iter().any(|s| s.start == evicted_at)
                });
                prop_assert!(
                    evictor_exists,
                    "job {} evicted at {} without a higher-or-equal-priority admission",
                    job.id(),
                    evicted_at
                );
            }
        }
    }
}

fn arb_record(id: u32) -> impl Strategy<Value = JobRecord> {
    (0u64..=60, 0u64..50, 1u64..30, arb_priority()).prop_flat_map(
        move |(original, created_time, duration, priority)| {
            (0..=original)
                .prop_flat_map(move |bandwidth| {
                    (0..=bandwidth).prop_map(move |min| (bandwidth, min))
                })
                .prop_map(move |(bandwidth, min_bandwidth)| JobRecord {
                    id,
                    bandwidth,
                    min_bandwidth,
                    original_bandwidth: original,
                    created_time,
                    duration,
                    priority,
                })
        },
    )
}

proptest! {
    #[test]
    fn json_round_trip_is_exact(
        records in prop::collection::vec(arb_record(0), 1..20)
    ) {
        let records: Vec<JobRecord> = records
            .into_iter()
            .enumerate()
            .map(|(i, mut r)| {
                r.id = i as u32 + 1;
                r
            })
            .collect();

        let workload = Workload::from_records(records.clone()).unwrap();
        let json = workload.to_json_string().unwrap();
        let back = Workload::from_json_str(&json).unwrap();

        prop_assert_eq!(back.to_records(), records);
        prop_assert_eq!(back, workload);
    }
}
