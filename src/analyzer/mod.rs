//! # Analyzer Module
//!
//! Exact resource quantities and the aggregation of workload requests:
//! - `quantity`: parsing, arithmetic and canonical formatting of quantities
//! - `resources`: resource-name to quantity maps
//! - `manifest`: per-kind decoding of Deployments, Pods and Jobs
//! - `source`: manifest discovery and multi-document splitting
//! - `aggregator`: per-manifest records and the grand total
//! - `formatter`: plain, table, JSON and YAML output

pub mod aggregator;
pub mod config;
pub mod formatter;
pub mod manifest;
pub mod quantity;
pub mod resources;
pub mod source;
pub mod types;

pub use aggregator::Aggregator;
pub use config::DiscoveryConfig;
pub use formatter::{OutputFormat, format_result, format_result_to_string};
pub use manifest::{AdapterRegistry, ManifestAdapter, Workload};
pub use quantity::{Quantity, QuantityError, QuantityFormat, Scale};
pub use resources::ResourceMap;
pub use types::{AggregationResult, ManifestDocument, ManifestRecord, SourceId, WorkloadKind};
