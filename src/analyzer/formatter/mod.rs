//! Output formatting for aggregation results.
//!
//! Supports multiple output formats: plain log lines, table, JSON and YAML.

mod output;

pub use output::{OutputFormat, format_result, format_result_to_string};
