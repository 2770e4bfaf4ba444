use std::path::Path;

use kube_requests::analyzer::types::WorkloadKind;
use kube_requests::{Aggregator, DiscoveryConfig, Quantity, RequestsError};
use tempfile::TempDir;

const MANIFESTS: &str = "tests/manifests";

fn q(text: &str) -> Quantity {
    Quantity::parse(text).unwrap()
}

struct Case<'a> {
    file: &'a str,
    expected: Vec<(WorkloadKind, &'a str, &'a str)>,
}

#[test]
fn aggregates_each_manifest_file() {
    let cases = [
        Case { file: "ignored-object.yaml", expected: vec![] },
        Case { file: "single-deployment.yaml", expected: vec![(WorkloadKind::Deployment, "50m", "500Mi")] },
        Case { file: "single-pod.yaml", expected: vec![(WorkloadKind::Pod, "30m", "40Mi")] },
        Case { file: "single-job.yaml", expected: vec![(WorkloadKind::Job, "100m", "1000Mi")] },
        Case {
            file: "multiple-objects.yaml",
            expected: vec![(WorkloadKind::Deployment, "100m", "500Mi"), (WorkloadKind::Pod, "30m", "40Mi")],
        },
        Case { file: "different-units.yaml", expected: vec![(WorkloadKind::Deployment, "1.01", "1104857600")] },
    ];

    for case in cases {
        let path = Path::new(MANIFESTS).join(case.file);
        let result = Aggregator::new()
            .aggregate_path(&path, &DiscoveryConfig::default())
            .unwrap_or_else(|e| panic!("{}: aggregation failed: {}", case.file, e));

        assert!(!result.has_failures(), "{}: unexpected failures", case.file);
        assert_eq!(result.records.len(), case.expected.len(), "{}", case.file);
        for (record, (kind, cpu, memory)) in result.records.iter().zip(&case.expected) {
            assert_eq!(record.kind, *kind, "{}", case.file);
            assert_eq!(record.object_name(), "some-namespace/some-name", "{}", case.file);
            assert_eq!(record.requests.cpu(), q(cpu), "{}", case.file);
            assert_eq!(record.requests.memory(), q(memory), "{}", case.file);
        }
    }
}

#[test]
fn grand_total_over_directory() {
    let result = Aggregator::new()
        .aggregate_path(Path::new(MANIFESTS), &DiscoveryConfig::default())
        .unwrap();

    assert_eq!(result.records.len(), 6);
    assert_eq!(result.total.cpu(), q("1320m"));
    assert_eq!(result.total.memory(), q("3285895680"));
    assert_eq!(result.total.memory().scaled_value(kube_requests::analyzer::Scale::Mega), 3286);

    let pod = &result.records[2];
    assert_eq!(pod.kind, WorkloadKind::Pod);
    assert_eq!(pod.source.to_string(), "tests/manifests/multiple-objects.yaml[#3]");
}

#[test]
fn parallel_and_sequential_agree() {
    let config = DiscoveryConfig::default();
    let parallel = Aggregator::new()
        .parallel(true)
        .aggregate_path(Path::new(MANIFESTS), &config)
        .unwrap();
    let sequential = Aggregator::new()
        .parallel(false)
        .aggregate_path(Path::new(MANIFESTS), &config)
        .unwrap();

    assert_eq!(parallel.records, sequential.records);
    assert_eq!(parallel.total, sequential.total);
}

#[test]
fn failing_documents_do_not_hide_the_rest() {
    let temp = TempDir::new().unwrap();
    std::fs::copy(
        Path::new(MANIFESTS).join("single-pod.yaml"),
        temp.path().join("a-pod.yaml"),
    )
    .unwrap();
    std::fs::write(
        temp.path().join("b-broken.yaml"),
        "kind: Deployment\nspec:\n  replicas: two\n---\nkind: Pod\nspec:\n  containers:\n    - resources:\n        requests:\n          memory: 12XB\n",
    )
    .unwrap();

    let result = Aggregator::new()
        .aggregate_path(temp.path(), &DiscoveryConfig::default())
        .unwrap();
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.total.cpu(), q("30m"));
    assert_eq!(result.failures.len(), 2);
    assert!(matches!(result.failures[0], RequestsError::StructuralDecode { .. }));
    assert!(matches!(result.failures[1], RequestsError::MalformedQuantity { .. }));
    assert_eq!(
        result.failures[1].source_id().map(ToString::to_string),
        Some(format!("{}[#2]", temp.path().join("b-broken.yaml").display()))
    );

    let err = Aggregator::new()
        .fail_fast(true)
        .aggregate_path(temp.path(), &DiscoveryConfig::default())
        .unwrap_err();
    assert!(matches!(err, RequestsError::StructuralDecode { .. }));
}
