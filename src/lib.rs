//! # kube-requests
//!
//! Sums the resource requests declared by Kubernetes workload manifests with
//! exact quantity arithmetic.
//!
//! Every Deployment, Pod and Job contributes the requests of its pod
//! template's containers, multiplied by its replica count or parallelism.
//! Quantities are kept as exact fractions, so `"10m"` plus `"1"` is exactly
//! `"1010m"` and binary and decimal units mix freely.
//!
//! ## Example
//!
//! ```rust,no_run
//! use kube_requests::{Aggregator, DiscoveryConfig};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let result = Aggregator::new().aggregate_path(Path::new("./deploy"), &DiscoveryConfig::default())?;
//! println!("cpu: {}, memory: {}", result.total.cpu(), result.total.memory());
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;

// Re-export commonly used types and functions
pub use analyzer::{
    AggregationResult, Aggregator, DiscoveryConfig, ManifestRecord, Quantity, ResourceMap,
};
pub use error::{RequestsError, Result};
pub use handlers::*;
use cli::Commands;

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run_command(command: Commands, config: &config::types::Config) -> Result<()> {
    match command {
        Commands::Total {
            path,
            format,
            fail_fast,
            sequential,
            output,
        } => {
            let options = TotalOptions {
                format,
                fail_fast,
                sequential,
                output,
            };
            handlers::handle_total(&path, options, config)
        }
        Commands::Sum { quantities, factor } => handlers::handle_sum(&quantities, factor),
    }
}
