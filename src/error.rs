//! Error types for kube-requests.

use crate::analyzer::quantity::QuantityError;
use crate::analyzer::types::{SourceId, WorkloadKind};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading, decoding and aggregating manifests.
#[derive(Debug, Error)]
pub enum RequestsError {
    /// A resource request value is not a valid quantity
    #[error("{source_id}: invalid request for resource {resource:?}: {source}")]
    MalformedQuantity {
        source_id: SourceId,
        resource: String,
        #[source]
        source: QuantityError,
    },

    /// The document is not YAML, or its kind/metadata cannot be read
    #[error("{source_id}: failed to decode manifest metadata: {source}")]
    MetadataDecode {
        source_id: SourceId,
        #[source]
        source: serde_yaml::Error,
    },

    /// The kind is supported but the body does not have that kind's shape
    #[error("{source_id}: failed to decode {kind}: {source}")]
    StructuralDecode {
        source_id: SourceId,
        kind: WorkloadKind,
        #[source]
        source: serde_yaml::Error,
    },

    /// Summing or scaling overflowed
    #[error("{context}: {source}")]
    Arithmetic {
        context: String,
        #[source]
        source: QuantityError,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Results were printed but some documents could not be processed
    #[error("{0} manifest document(s) could not be processed")]
    PartialFailure(usize),
}

impl RequestsError {
    /// Source of the offending document, for errors tied to one document.
    pub fn source_id(&self) -> Option<&SourceId> {
        match self {
            Self::MalformedQuantity { source_id, .. }
            | Self::MetadataDecode { source_id, .. }
            | Self::StructuralDecode { source_id, .. } => Some(source_id),
            _ => None,
        }
    }
}

/// Errors raised while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },

    #[error("invalid value for {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },
}

/// Result type alias for kube-requests operations
pub type Result<T> = std::result::Result<T, RequestsError>;
