//! Workload manifest decoding.
//!
//! Only the fields that matter for request aggregation are modelled: the
//! type/object metadata, the replication factor and the containers' resource
//! requests. Everything else in a manifest (labels, probes, volumes, limits)
//! is ignored by the decoder.
//!
//! Each supported kind has a [`ManifestAdapter`] registered in an
//! [`AdapterRegistry`], keyed by the manifest `kind` string.

use super::quantity::Quantity;
use super::resources::{ResourceMap, requests_from_containers};
use super::types::{SourceId, WorkloadKind};
use crate::error::{RequestsError, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

// ============================================================================
// Metadata
// ============================================================================

/// The minimal part of any manifest: kind, apiVersion, name and namespace.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManifestHeader {
    pub kind: Option<String>,
    pub api_version: Option<String>,
    pub metadata: Option<ObjectMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ObjectMeta {
    pub name: Option<String>,
    pub namespace: Option<String>,
}

impl ManifestHeader {
    pub fn name(&self) -> Option<&str> {
        self.metadata.as_ref()?.name.as_deref()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata.as_ref()?.namespace.as_deref()
    }
}

// ============================================================================
// Pod Templates
// ============================================================================

/// A request value as written in YAML: usually a string, sometimes a bare
/// number such as `cpu: 1` or `cpu: 0.5`.
///
/// Integers are tried before floats so that whole numbers up to `u64::MAX`
/// stay exact.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawQuantity {
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
}

impl RawQuantity {
    /// The value in quantity syntax.
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Integer(n) => n.to_string(),
            Self::Unsigned(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResourceRequirements {
    pub requests: Option<BTreeMap<String, RawQuantity>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Container {
    pub name: Option<String>,
    pub resources: Option<ResourceRequirements>,
}

impl Container {
    /// Parsed requests of this container, `None` when it declares none.
    fn requests(&self, source_id: &SourceId) -> Result<Option<ResourceMap>> {
        let Some(raw) = self.resources.as_ref().and_then(|r| r.requests.as_ref()) else {
            return Ok(None);
        };

        let mut requests = ResourceMap::new();
        for (resource, value) in raw {
            let quantity = Quantity::parse(&value.as_text()).map_err(|source| {
                RequestsError::MalformedQuantity {
                    source_id: source_id.clone(),
                    resource: resource.clone(),
                    source,
                }
            })?;
            requests.insert(resource.clone(), quantity);
        }
        Ok(Some(requests))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PodSpec {
    pub containers: Option<Vec<Container>>,
}

impl PodSpec {
    /// Sum of the requests of every container in this pod.
    pub fn requests(&self, source: &SourceId) -> Result<ResourceMap> {
        let mut per_container = Vec::new();
        for container in self.containers.iter().flatten() {
            if let Some(requests) = container.requests(source)? {
                per_container.push(requests);
            }
        }

        requests_from_containers(&per_container).map_err(|e| RequestsError::Arithmetic {
            context: source.to_string(),
            source: e,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PodTemplateSpec {
    pub spec: Option<PodSpec>,
}

impl PodTemplateSpec {
    fn into_pod_spec(template: Option<Self>) -> PodSpec {
        template.and_then(|t| t.spec).unwrap_or_default()
    }
}

// ============================================================================
// Workload Kinds
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Deployment {
    pub spec: Option<DeploymentSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeploymentSpec {
    pub replicas: Option<i64>,
    pub template: Option<PodTemplateSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Pod {
    pub spec: Option<PodSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Job {
    pub spec: Option<JobSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JobSpec {
    pub parallelism: Option<i64>,
    pub template: Option<PodTemplateSpec>,
}

/// A decoded workload: its pod template and declared replication count.
#[derive(Debug, Clone, Default)]
pub struct Workload {
    /// Replica count or parallelism as written, if any.
    pub replicas: Option<i64>,
    pub pod_spec: PodSpec,
}

impl Workload {
    /// Factor the pod template's requests are multiplied by.
    pub fn factor(&self) -> u32 {
        replication_factor(self.replicas)
    }
}

/// Resolve a declared replica count or parallelism.
///
/// Unset, zero and negative counts resolve to 1, matching Kubernetes
/// defaulting of `replicas` and `parallelism`.
pub fn replication_factor(count: Option<i64>) -> u32 {
    match count {
        Some(n) if n > 0 => u32::try_from(n).unwrap_or(u32::MAX),
        _ => 1,
    }
}

// ============================================================================
// Adapters
// ============================================================================

/// Reads the pod template and replication factor of one manifest kind.
pub trait ManifestAdapter: Send + Sync {
    /// Kind handled by this adapter.
    fn kind(&self) -> WorkloadKind;

    /// Decode a manifest of this kind.
    ///
    /// Fails when the body does not have the kind's shape, e.g. a string
    /// where `containers` should be a list.
    fn decode(&self, manifest: serde_yaml::Value) -> std::result::Result<Workload, serde_yaml::Error>;
}

/// `spec.replicas` × `spec.template.spec`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeploymentAdapter;

impl ManifestAdapter for DeploymentAdapter {
    fn kind(&self) -> WorkloadKind {
        WorkloadKind::Deployment
    }

    fn decode(&self, manifest: serde_yaml::Value) -> std::result::Result<Workload, serde_yaml::Error> {
        let spec = serde_yaml::from_value::<Deployment>(manifest)?
            .spec
            .unwrap_or_default();
        Ok(Workload {
            replicas: spec.replicas,
            pod_spec: PodTemplateSpec::into_pod_spec(spec.template),
        })
    }
}

/// `spec`, always once.
#[derive(Debug, Clone, Copy, Default)]
pub struct PodAdapter;

impl ManifestAdapter for PodAdapter {
    fn kind(&self) -> WorkloadKind {
        WorkloadKind::Pod
    }

    fn decode(&self, manifest: serde_yaml::Value) -> std::result::Result<Workload, serde_yaml::Error> {
        let pod = serde_yaml::from_value::<Pod>(manifest)?;
        Ok(Workload {
            replicas: None,
            pod_spec: pod.spec.unwrap_or_default(),
        })
    }
}

/// `spec.parallelism` × `spec.template.spec`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobAdapter;

impl ManifestAdapter for JobAdapter {
    fn kind(&self) -> WorkloadKind {
        WorkloadKind::Job
    }

    fn decode(&self, manifest: serde_yaml::Value) -> std::result::Result<Workload, serde_yaml::Error> {
        let spec = serde_yaml::from_value::<Job>(manifest)?
            .spec
            .unwrap_or_default();
        Ok(Workload {
            replicas: spec.parallelism,
            pod_spec: PodTemplateSpec::into_pod_spec(spec.template),
        })
    }
}

/// Adapters keyed by manifest `kind`.
pub struct AdapterRegistry {
    adapters: HashMap<&'static str, Box<dyn ManifestAdapter>>,
}

impl AdapterRegistry {
    /// A registry without any adapter.
    pub fn empty() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Register an adapter, replacing any adapter for the same kind.
    pub fn register(mut self, adapter: impl ManifestAdapter + 'static) -> Self {
        self.adapters.insert(adapter.kind().as_str(), Box::new(adapter));
        self
    }

    /// Adapter for a manifest kind, `None` when the kind is not aggregated.
    pub fn get(&self, kind: &str) -> Option<&dyn ManifestAdapter> {
        self.adapters.get(kind).map(|a| a.as_ref())
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<_> = self.adapters.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::empty()
            .register(DeploymentAdapter)
            .register(PodAdapter)
            .register(JobAdapter)
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
