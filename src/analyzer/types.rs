//! Core types for request aggregation.
//!
//! These types identify manifest documents and carry the per-manifest and
//! grand-total results of an aggregation run.

use super::resources::ResourceMap;
use crate::error::RequestsError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

// ============================================================================
// Workload Kind
// ============================================================================

/// Workload kinds whose requests are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WorkloadKind {
    Deployment,
    Pod,
    Job,
}

impl WorkloadKind {
    /// Parse a manifest `kind` field (case-sensitive, as Kubernetes does).
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "Deployment" => Some(Self::Deployment),
            "Pod" => Some(Self::Pod),
            "Job" => Some(Self::Job),
            _ => None,
        }
    }

    /// The manifest `kind` string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deployment => "Deployment",
            Self::Pod => "Pod",
            Self::Job => "Job",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Source Identifier
// ============================================================================

/// Locates one YAML document inside one input file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceId {
    /// File the document was read from.
    pub path: PathBuf,
    /// Zero-based position among the file's non-empty documents.
    pub document: usize,
    /// Number of non-empty documents in the file.
    pub documents_in_file: usize,
}

impl SourceId {
    /// Identifier for a document of a file.
    pub fn new(path: impl Into<PathBuf>, document: usize, documents_in_file: usize) -> Self {
        Self {
            path: path.into(),
            document,
            documents_in_file,
        }
    }

    /// Identifier for content that is a single document.
    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self::new(path, 0, 1)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.documents_in_file > 1 {
            write!(f, "{}[#{}]", self.path.display(), self.document + 1)
        } else {
            write!(f, "{}", self.path.display())
        }
    }
}

impl Serialize for SourceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// Documents and Records
// ============================================================================

/// Raw text of one manifest document.
#[derive(Debug, Clone)]
pub struct ManifestDocument {
    pub source: SourceId,
    pub content: String,
}

impl ManifestDocument {
    pub fn new(source: SourceId, content: impl Into<String>) -> Self {
        Self {
            source,
            content: content.into(),
        }
    }
}

/// Requests of one workload manifest, already multiplied by its factor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestRecord {
    pub kind: WorkloadKind,
    #[serde(rename = "apiVersion", skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    pub namespace: Option<String>,
    pub name: Option<String>,
    pub source: SourceId,
    /// Replica count or parallelism the pod template was multiplied by.
    pub factor: u32,
    pub requests: ResourceMap,
}

impl ManifestRecord {
    /// `namespace/name`, with empty parts for missing metadata.
    pub fn object_name(&self) -> String {
        format!(
            "{}/{}",
            self.namespace.as_deref().unwrap_or_default(),
            self.name.as_deref().unwrap_or_default()
        )
    }
}

// ============================================================================
// Aggregation Result
// ============================================================================

/// Outcome of an aggregation run.
#[derive(Debug, Default, Serialize)]
pub struct AggregationResult {
    /// Contributing manifests, in discovery order.
    pub records: Vec<ManifestRecord>,
    /// Key-wise sum of every record's requests.
    pub total: ResourceMap,
    /// Documents or files that could not be processed.
    #[serde(serialize_with = "serialize_failures")]
    pub failures: Vec<RequestsError>,
}

impl AggregationResult {
    /// Check whether any document failed.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

fn serialize_failures<S: Serializer>(
    failures: &[RequestsError],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(failures.iter().map(ToString::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!(WorkloadKind::parse("Deployment"), Some(WorkloadKind::Deployment));
        assert_eq!(WorkloadKind::parse("Job"), Some(WorkloadKind::Job));
        assert_eq!(WorkloadKind::parse("pod"), None);
        assert_eq!(WorkloadKind::parse("Service"), None);
    }

    #[test]
    fn test_source_id_display() {
        assert_eq!(SourceId::single("a/b.yaml").to_string(), "a/b.yaml");
        assert_eq!(SourceId::new("a/b.yaml", 1, 3).to_string(), "a/b.yaml[#2]");
    }
}
