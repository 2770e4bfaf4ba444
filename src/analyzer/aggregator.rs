//! Request aggregation across manifests.
//!
//! The [`Aggregator`] turns manifest documents into [`ManifestRecord`]s and
//! folds them into a grand total. It holds no mutable state, so one instance
//! can be shared by the `rayon` workers that process files in parallel.

use super::config::DiscoveryConfig;
use super::manifest::{AdapterRegistry, ManifestHeader};
use super::resources::ResourceMap;
use super::source::{discover_files, read_documents};
use super::types::{AggregationResult, ManifestDocument, ManifestRecord};
use crate::error::{RequestsError, Result};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::path::Path;

/// Outcome of processing one document: a record, a skip, or an error.
type Outcome = Result<Option<ManifestRecord>>;

/// Sums the requests of workload manifests.
#[derive(Debug, Default)]
pub struct Aggregator {
    registry: AdapterRegistry,
    fail_fast: bool,
    parallel: bool,
}

impl Aggregator {
    /// Aggregator for Deployments, Pods and Jobs that keeps going past
    /// failing documents.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom set of adapters.
    pub fn with_registry(mut self, registry: AdapterRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Stop at the first failing document instead of collecting failures.
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Process files on the `rayon` thread pool.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Turn one document into a record.
    ///
    /// Returns `Ok(None)` for documents that are empty, have no adapter for
    /// their kind, or declare no requests at all.
    pub fn process_document(&self, document: &ManifestDocument) -> Outcome {
        let source = &document.source;
        let metadata_error = |e: serde_yaml::Error| RequestsError::MetadataDecode {
            source_id: source.clone(),
            source: e,
        };

        let value: serde_yaml::Value =
            serde_yaml::from_str(&document.content).map_err(metadata_error)?;
        if value.is_null() {
            return Ok(None);
        }
        if !value.is_mapping() {
            return Err(metadata_error(serde::de::Error::custom(
                "manifest is not a mapping",
            )));
        }
        let header: ManifestHeader =
            serde_yaml::from_value(value.clone()).map_err(metadata_error)?;

        let Some(kind) = header.kind.as_deref() else {
            debug!("{source}: no kind, skipping");
            return Ok(None);
        };
        let Some(adapter) = self.registry.get(kind) else {
            debug!("{source}: kind {kind} is not aggregated, skipping");
            return Ok(None);
        };

        let workload = adapter
            .decode(value)
            .map_err(|e| RequestsError::StructuralDecode {
                source_id: source.clone(),
                kind: adapter.kind(),
                source: e,
            })?;

        if let Some(count) = workload.replicas.filter(|n| *n <= 0) {
            warn!("{source}: {kind} declares a count of {count}, counting its pod once");
        }
        let factor = workload.factor();
        let requests = workload
            .pod_spec
            .requests(source)?
            .scale(factor)
            .map_err(|e| RequestsError::Arithmetic {
                context: source.to_string(),
                source: e,
            })?;

        if requests.is_empty() {
            debug!("{source}: {kind} declares no requests, skipping");
            return Ok(None);
        }

        info!(
            "{source}: {kind} {}/{} x{factor}",
            header.namespace().unwrap_or_default(),
            header.name().unwrap_or_default()
        );
        Ok(Some(ManifestRecord {
            kind: adapter.kind(),
            api_version: header.api_version.clone(),
            namespace: header.namespace().map(String::from),
            name: header.name().map(String::from),
            source: source.clone(),
            factor,
            requests,
        }))
    }

    /// Aggregate documents in the given order.
    pub fn aggregate<I>(&self, documents: I) -> Result<AggregationResult>
    where
        I: IntoIterator<Item = ManifestDocument>,
    {
        let mut accumulator = Accumulator::new(self.fail_fast);
        for document in documents {
            accumulator.push(self.process_document(&document))?;
        }
        accumulator.finish()
    }

    /// Discover, read and aggregate every manifest under `root`.
    ///
    /// Records keep discovery order whether or not files are processed in
    /// parallel.
    pub fn aggregate_path(&self, root: &Path, config: &DiscoveryConfig) -> Result<AggregationResult> {
        let discovery = discover_files(root, config)?;
        let mut accumulator = Accumulator::new(self.fail_fast);
        for error in discovery.errors {
            accumulator.push(Err(error))?;
        }

        if self.parallel {
            let per_file: Vec<Vec<Outcome>> = discovery
                .files
                .par_iter()
                .map(|path| self.process_file(path))
                .collect();
            for outcome in per_file.into_iter().flatten() {
                accumulator.push(outcome)?;
            }
        } else {
            for path in &discovery.files {
                for outcome in self.process_file(path) {
                    accumulator.push(outcome)?;
                }
            }
        }

        accumulator.finish()
    }

    fn process_file(&self, path: &Path) -> Vec<Outcome> {
        debug!("Reading {}", path.display());
        match read_documents(path) {
            Ok(documents) => documents
                .iter()
                .map(|document| self.process_document(document))
                .collect(),
            Err(e) => vec![Err(e)],
        }
    }
}

/// Records and failures gathered so far in one run.
struct Accumulator {
    fail_fast: bool,
    records: Vec<ManifestRecord>,
    failures: Vec<RequestsError>,
}

impl Accumulator {
    fn new(fail_fast: bool) -> Self {
        Self {
            fail_fast,
            records: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn push(&mut self, outcome: Outcome) -> Result<()> {
        match outcome {
            Ok(Some(record)) => self.records.push(record),
            Ok(None) => {}
            Err(e) if self.fail_fast => return Err(e),
            Err(e) => {
                warn!("{e}");
                self.failures.push(e);
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<AggregationResult> {
        let total = ResourceMap::sum(self.records.iter().map(|r| &r.requests)).map_err(|e| {
            RequestsError::Arithmetic {
                context: "grand total".to_string(),
                source: e,
            }
        })?;

        Ok(AggregationResult {
            records: self.records,
            total,
            failures: self.failures,
        })
    }
}
