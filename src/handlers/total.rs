//! Handler for the `total` command.
//!
//! Aggregates the requests of every manifest under a path and reports the
//! per-manifest records and the grand total.

use crate::analyzer::aggregator::Aggregator;
use crate::analyzer::formatter::{OutputFormat, format_result, format_result_to_string};
use crate::analyzer::types::AggregationResult;
use crate::config::types::Config;
use crate::error::{RequestsError, Result};
use std::path::{Path, PathBuf};

/// Options for the total command, as given on the command line
#[derive(Debug, Clone, Default)]
pub struct TotalOptions {
    /// Output format, overriding the config file
    pub format: Option<String>,
    /// Stop at the first failing document
    pub fail_fast: bool,
    /// Process files one at a time
    pub sequential: bool,
    /// Output file
    pub output: Option<PathBuf>,
}

/// Build the aggregator described by the config and command-line options.
fn build_aggregator(options: &TotalOptions, config: &Config) -> Aggregator {
    Aggregator::new()
        .fail_fast(options.fail_fast || config.aggregation.fail_fast)
        .parallel(config.aggregation.parallel && !options.sequential)
}

/// Aggregate without printing anything.
pub fn compute_total(path: &Path, options: &TotalOptions, config: &Config) -> Result<AggregationResult> {
    build_aggregator(options, config).aggregate_path(path, &config.discovery)
}

/// Handle the `total` command.
///
/// The report is printed even when some documents failed; the failures are
/// then turned into [`RequestsError::PartialFailure`].
pub fn handle_total(path: &Path, options: TotalOptions, config: &Config) -> Result<()> {
    let format = match &options.format {
        Some(name) => OutputFormat::parse(name)
            .ok_or_else(|| RequestsError::InvalidInput(format!("unknown output format: {name}")))?,
        None => config.output.format,
    };
    let memory_scale = config.output.memory_scale()?;

    let result = compute_total(path, &options, config)?;

    if let Some(output_path) = &options.output {
        let report = format_result_to_string(&result, format, memory_scale);
        std::fs::write(output_path, report).map_err(|source| RequestsError::Io {
            path: output_path.clone(),
            source,
        })?;
        println!("Report written to: {}", output_path.display());
    } else {
        format_result(&result, format, memory_scale);
    }

    if result.has_failures() {
        return Err(RequestsError::PartialFailure(result.failures.len()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::quantity::Quantity;
    use tempfile::TempDir;

    const DEPLOYMENT: &str = "kind: Deployment\nmetadata:\n  name: api\nspec:\n  replicas: 4\n  template:\n    spec:\n      containers:\n        - resources:\n            requests:\n              cpu: 250m\n              memory: 256Mi\n";

    #[test]
    fn test_compute_total() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("api.yaml"), DEPLOYMENT).unwrap();

        let result = compute_total(temp.path(), &TotalOptions::default(), &Config::default()).unwrap();
        assert_eq!(result.total.cpu(), Quantity::parse("1").unwrap());
        assert_eq!(result.total.memory(), Quantity::parse("1Gi").unwrap());
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let temp = TempDir::new().unwrap();
        let options = TotalOptions {
            format: Some("csv".to_string()),
            ..Default::default()
        };
        let err = handle_total(temp.path(), options, &Config::default()).unwrap_err();
        assert!(matches!(err, RequestsError::InvalidInput(_)));
    }

    #[test]
    fn test_report_written_and_partial_failure() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("api.yaml"), DEPLOYMENT).unwrap();
        std::fs::write(temp.path().join("bad.yaml"), "kind: Pod\nspec: 3\n").unwrap();
        let report = temp.path().join("report.json");

        let options = TotalOptions {
            format: Some("json".to_string()),
            output: Some(report.clone()),
            ..Default::default()
        };
        let err = handle_total(temp.path(), options, &Config::default()).unwrap_err();
        assert!(matches!(err, RequestsError::PartialFailure(1)));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(report).unwrap()).unwrap();
        assert_eq!(json["total"]["cpu"], "1");
        assert_eq!(json["total"]["memory"], "1Gi");
    }

    #[test]
    fn test_fail_fast_from_config() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("bad.yaml"), "kind: Pod\nspec: 3\n").unwrap();
        let mut config = Config::default();
        config.aggregation.fail_fast = true;

        let err = compute_total(temp.path(), &TotalOptions::default(), &config).unwrap_err();
        assert!(matches!(err, RequestsError::StructuralDecode { .. }));
    }
}
