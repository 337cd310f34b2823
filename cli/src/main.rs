pub mod cli;

use std::path::{Path, PathBuf};

use clap::Parser;
use tokio::task::JoinSet;

use cli::*;
use common::logger::init_logger;
use scheduler::SchedulerConfig;
use scheduler::score::ScoreSummary;
use scheduler::workload::Workload;
use workgen::{GenParams, PriorityPolicy};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger("bandplan");

    let cli = Cli::parse();
    match cli.command {
        Command::Generate {
            count,
            capacity,
            start_time,
            end_time,
            max_duration,
            seed,
            out_dir,
            policies,
        } => {
            let params = GenParams {
                count,
                capacity,
                start_time,
                end_time,
                max_duration,
                seed,
            };
            generate_workloads(&params, &out_dir, &policies)
        }
        Command::Run {
            workload,
            algo,
            capacity,
            horizon,
            max_ticks,
            show_grid,
        } => {
            let cfg = SchedulerConfig { horizon, max_ticks };
            run_scenarios(workload, algo, capacity, cfg, show_grid).await
        }
    }
}

/// Write one workload file per requested policy into `out_dir`.
fn generate_workloads(
    params: &GenParams,
    out_dir: &Path,
    policies: &[PolicyCli],
) -> anyhow::Result<()> {
    let selected: Vec<PriorityPolicy> = if policies.is_empty() {
        PriorityPolicy::ALL.to_vec()
    } else {
        policies.iter().copied().map(cli_to_policy).collect()
    };

    std::fs::create_dir_all(out_dir)?;
    for policy in selected {
        let workload = workgen::generate(params, policy)?;
        let path = out_dir.join(format!("workload_{}.json", policy.label()));
        std::fs::write(&path, workload.to_json_string()?)?;
        tracing::info!(path = %path.display(), jobs = workload.len(), "workload written");
    }
    Ok(())
}

/// Run every (workload file x algorithm) pair as its own blocking task and
/// print the reports in a stable order. Any scheduler error fails the whole
/// invocation, which is what turns invariant breaches into a non-zero exit.
async fn run_scenarios(
    files: Vec<PathBuf>,
    algo: AlgoCli,
    capacity: u64,
    cfg: SchedulerConfig,
    show_grid: bool,
) -> anyhow::Result<()> {
    let algorithms = cli_to_algorithms(algo);

    let mut scenarios = JoinSet::new();
    for file in files {
        let text = std::fs::read_to_string(&file)
            .map_err(|e| anyhow::anyhow!("reading {}: {e}", file.display()))?;
        let workload = Workload::from_json_str(&text)?;
        tracing::info!(file = %file.display(), jobs = workload.len(), "workload loaded");

        for algorithm in algorithms.iter().copied() {
            let workload = workload.clone();
            let label = format!("{} [{}]", file.display(), algorithm);
            scenarios.spawn_blocking(move || -> anyhow::Result<(String, String)> {
                let plan = algorithm.scheduler(cfg).run(workload, capacity)?;
                let mut report = ScoreSummary::from_plan(&plan).to_string();
                if show_grid {
                    report.push('\n');
                    report.push_str(&plan.grid()?.to_string());
                }
                Ok((label, report))
            });
        }
    }

    let mut results = Vec::new();
    while let Some(joined) = scenarios.join_next().await {
        results.push(joined??);
    }
    results.sort();

    for (label, report) in results {
        println!("{label}: {report}");
    }
    Ok(())
}
