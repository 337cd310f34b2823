use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use scheduler::Algorithm;
use workgen::PriorityPolicy;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AlgoCli {
    Sg,
    Gc,
    Pp,
    All,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PolicyCli {
    Random,
    Ascending,
    RegPremEnt,
    Chunks,
}

#[derive(Debug, Parser)]
#[clap(name = "bandplan", version)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate workload files, one per priority policy
    Generate {
        /// Number of jobs per workload
        #[clap(long, default_value_t = 1000)]
        count: usize,

        /// Total capacity the workloads will be scheduled against
        #[clap(long, default_value_t = 50)]
        capacity: u64,

        /// Inclusive start of the arrival window
        #[clap(long, default_value_t = 0)]
        start_time: u64,

        /// Exclusive end of the arrival window
        #[clap(long, default_value_t = 255)]
        end_time: u64,

        /// Duration cap and stagger step for the chunk policy
        #[clap(long, default_value_t = 50)]
        max_duration: u64,

        /// RNG seed; identical seeds reproduce identical files
        #[clap(long, default_value_t = 42)]
        seed: u64,

        /// Directory the workload files are written into
        #[clap(long, default_value = ".")]
        out_dir: PathBuf,

        /// Policies to generate (comma-separated; default all four)
        #[clap(long, value_enum, value_delimiter = ',')]
        policies: Vec<PolicyCli>,
    },

    /// Run scheduling scenarios and print their score reports
    Run {
        /// Workload files to schedule
        #[clap(long, required = true, num_args = 1..)]
        workload: Vec<PathBuf>,

        /// Algorithm to run, or all three
        #[clap(long, value_enum, default_value = "all")]
        algo: AlgoCli,

        /// Total capacity for every scenario
        #[clap(long, default_value_t = 50)]
        capacity: u64,

        /// Drop jobs whose projected end would pass this tick
        #[clap(long)]
        horizon: Option<u64>,

        /// Fail any scenario exceeding this many ticks
        #[clap(long)]
        max_ticks: Option<u64>,

        /// Print the capacity grid per scenario
        #[clap(long)]
        show_grid: bool,
    },
}

/// Convert the CLI algorithm selection into concrete algorithm tags.
pub(crate) fn cli_to_algorithms(algo: AlgoCli) -> Vec<Algorithm> {
    match algo {
        AlgoCli::Sg => vec![Algorithm::SimpleGreedy],
        AlgoCli::Gc => vec![Algorithm::GreedyCompression],
        AlgoCli::Pp => vec![Algorithm::PreemptivePriority],
        AlgoCli::All => Algorithm::ALL.to_vec(),
    }
}

/// Convert a CLI policy selection into the generator's policy enum.
pub(crate) fn cli_to_policy(policy: PolicyCli) -> PriorityPolicy {
    match policy {
        PolicyCli::Random => PriorityPolicy::Random,
        PolicyCli::Ascending => PriorityPolicy::AscendingByPriority,
        PolicyCli::RegPremEnt => PriorityPolicy::RegularPremiumThenEnterprise,
        PolicyCli::Chunks => PriorityPolicy::HighBandwidthChunks,
    }
}
