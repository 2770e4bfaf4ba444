use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kube-requests")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sum the resource requests declared by Kubernetes manifests")]
#[command(long_about = "Reads Kubernetes manifests, multiplies the container requests of each Deployment, Pod and Job by its replica count or parallelism, and reports the exact per-resource totals.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Total the requests of every manifest under a path
    Total {
        /// Manifest file or directory to scan recursively
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Output format: plain, table, json, yaml
        #[arg(short, long)]
        format: Option<String>,

        /// Stop at the first document that cannot be processed
        #[arg(long)]
        fail_fast: bool,

        /// Process files one at a time instead of in parallel
        #[arg(long)]
        sequential: bool,

        /// Write the report to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Add quantities and print the exact result
    Sum {
        /// Quantities such as 100m, 1.5Gi or 2e3
        #[arg(value_name = "QUANTITY", required = true)]
        quantities: Vec<String>,

        /// Multiply the sum by this factor
        #[arg(long, default_value_t = 1)]
        factor: u64,
    },
}

impl Commands {
    /// Directory searched for a project-local config file.
    pub fn project_dir(&self) -> Option<PathBuf> {
        match self {
            Commands::Total { path, .. } if path.is_dir() => Some(path.clone()),
            Commands::Total { path, .. } => path.parent().map(PathBuf::from),
            Commands::Sum { .. } => None,
        }
    }
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}
