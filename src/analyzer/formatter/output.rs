//! Output formatting for aggregation results.
//!
//! CPU is always printed as a canonical quantity; memory is printed as a
//! whole number of `memory_scale` units, rounded up.

use crate::analyzer::quantity::Scale;
use crate::analyzer::resources::{CPU, MEMORY, ResourceMap};
use crate::analyzer::types::AggregationResult;
use colored::Colorize;
use serde::{Deserialize, Serialize};

// ============================================================================
// Output Format
// ============================================================================

/// Output format for aggregation results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line per manifest followed by the total (default)
    #[default]
    Plain,
    /// ASCII table format
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "plain" => Some(Self::Plain),
            "table" => Some(Self::Table),
            "json" => Some(Self::Json),
            "yaml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

// ============================================================================
// Formatting Functions
// ============================================================================

/// Format an aggregation result to string.
pub fn format_result_to_string(
    result: &AggregationResult,
    format: OutputFormat,
    memory_scale: Scale,
) -> String {
    match format {
        OutputFormat::Plain => format_plain(result, memory_scale),
        OutputFormat::Table => format_table(result, memory_scale),
        OutputFormat::Json => format_json(result),
        OutputFormat::Yaml => format_yaml(result),
    }
}

/// Format and print an aggregation result.
pub fn format_result(result: &AggregationResult, format: OutputFormat, memory_scale: Scale) {
    println!("{}", format_result_to_string(result, format, memory_scale));
}

fn memory_text(requests: &ResourceMap, scale: Scale) -> String {
    format!("{}{}", requests.memory().scaled_value(scale), scale.suffix())
}

/// Requested resources other than CPU and memory, as `name=value` pairs.
fn extended_resources(requests: &ResourceMap) -> Option<String> {
    let others: Vec<String> = requests
        .iter()
        .filter(|(name, _)| *name != CPU && *name != MEMORY)
        .map(|(name, quantity)| format!("{name}={quantity}"))
        .collect();
    (!others.is_empty()).then(|| others.join(", "))
}

// ============================================================================
// Plain Format
// ============================================================================

fn format_plain(result: &AggregationResult, memory_scale: Scale) -> String {
    let mut output = String::new();

    for record in &result.records {
        output.push_str(&format!(
            "Kind: {}, Object: {} CPU: {}, Memory: {}",
            record.kind,
            record.object_name(),
            record.requests.cpu(),
            memory_text(&record.requests, memory_scale)
        ));
        if let Some(others) = extended_resources(&record.requests) {
            output.push_str(&format!(", Other: {others}"));
        }
        output.push('\n');
    }

    output.push_str(&format!(
        "Total\n\tCPU: {}\n\tMemory: {}\n",
        result.total.cpu(),
        memory_text(&result.total, memory_scale)
    ));
    if let Some(others) = extended_resources(&result.total) {
        output.push_str(&format!("\tOther: {others}\n"));
    }

    for failure in &result.failures {
        output.push_str(&format!("Failed: {failure}\n"));
    }

    output
}

// ============================================================================
// Table Format
// ============================================================================

fn format_table(result: &AggregationResult, memory_scale: Scale) -> String {
    let mut output = String::new();
    let rule = "═".repeat(96);

    output.push_str(&format!("\n{}\n", rule.bright_blue()));
    output.push_str(&format!(
        "{}\n",
        "KUBERNETES RESOURCE REQUESTS".bright_white().bold()
    ));
    output.push_str(&format!("{}\n\n", rule.bright_blue()));

    output.push_str(&format!(
        "{:<12} {:<44} {:>6} {:>12} {:>14}\n",
        "KIND".dimmed(),
        "OBJECT".dimmed(),
        "x".dimmed(),
        "CPU".dimmed(),
        "MEMORY".dimmed()
    ));

    for record in &result.records {
        output.push_str(&format!(
            "{:<12} {:<44} {:>6} {:>12} {:>14}\n",
            record.kind.as_str().cyan(),
            record.object_name(),
            record.factor,
            record.requests.cpu().to_string().yellow(),
            memory_text(&record.requests, memory_scale).yellow()
        ));
    }

    if result.records.is_empty() {
        output.push_str(&format!("{}\n", "No workload declares resource requests.".dimmed()));
    }

    output.push_str(&format!("\n{}\n", "─".repeat(96).dimmed()));
    output.push_str(&format!(
        "{:<63} {:>12} {:>14}\n",
        format!("TOTAL ({} manifests)", result.records.len()).bright_white().bold(),
        result.total.cpu().to_string().green().bold(),
        memory_text(&result.total, memory_scale).green().bold()
    ));
    if let Some(others) = extended_resources(&result.total) {
        output.push_str(&format!("{} {}\n", "Other:".dimmed(), others));
    }

    if result.has_failures() {
        output.push_str(&format!(
            "\n{}\n",
            format!("{} document(s) failed:", result.failures.len()).red().bold()
        ));
        for failure in &result.failures {
            output.push_str(&format!("  {} {}\n", "✗".red(), failure));
        }
    }

    output.push_str(&format!("{}\n", rule.bright_blue()));
    output
}

// ============================================================================
// JSON / YAML Format
// ============================================================================

fn format_json(result: &AggregationResult) -> String {
    serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
}

fn format_yaml(result: &AggregationResult) -> String {
    serde_yaml::to_string(result).unwrap_or_default()
}

// ============================================================================
// Tests
// ============================================================================
