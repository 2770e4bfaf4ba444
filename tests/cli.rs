//! Integration tests for the kube-requests CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn kube_requests() -> Command {
    let mut cmd = Command::cargo_bin("kube-requests").unwrap();
    cmd.env("HOME", env!("CARGO_MANIFEST_DIR"));
    cmd
}

#[test]
fn test_cli_help() {
    kube_requests()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("resource requests"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_total_plain_output() {
    kube_requests()
        .args(["total", "tests/manifests"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Kind: Deployment, Object: some-namespace/some-name CPU: 1010m, Memory: 1105M",
        ))
        .stdout(predicate::str::contains("Kind: Job, Object: some-namespace/some-name CPU: 100m, Memory: 1049M"))
        .stdout(predicate::str::contains("Total\n\tCPU: 1320m\n\tMemory: 3286M"));
}

#[test]
fn test_total_json_output() {
    let output = kube_requests()
        .args(["total", "tests/manifests/multiple-objects.yaml", "--format", "json", "--sequential"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["records"].as_array().unwrap().len(), 2);
    assert_eq!(json["records"][0]["factor"], 2);
    assert_eq!(json["total"]["cpu"], "130m");
    assert_eq!(json["total"]["memory"], "540Mi");
}

#[test]
fn test_total_reports_partial_failure() {
    let temp = TempDir::new().unwrap();
    fs::copy("tests/manifests/single-pod.yaml", temp.path().join("pod.yaml")).unwrap();
    fs::write(temp.path().join("broken.yaml"), "kind: Job\nspec: 12\n").unwrap();

    kube_requests()
        .arg("total")
        .arg(temp.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Total\n\tCPU: 30m"))
        .stdout(predicate::str::contains("failed to decode Job"))
        .stderr(predicate::str::contains("1 manifest document(s) could not be processed"));

    kube_requests()
        .arg("total")
        .arg(temp.path())
        .arg("--fail-fast")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("failed to decode Job"));
}

#[test]
fn test_total_uses_project_config() {
    let temp = TempDir::new().unwrap();
    fs::copy("tests/manifests/single-job.yaml", temp.path().join("job.yaml")).unwrap();
    fs::write(
        temp.path().join(".kube-requests.toml"),
        "[output]\nmemory_scale = \"\"\n",
    )
    .unwrap();

    kube_requests()
        .arg("total")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Memory: 1048576000\n"));
}

#[test]
fn test_total_writes_report_file() {
    let temp = TempDir::new().unwrap();
    let report = temp.path().join("report.txt");

    kube_requests()
        .args(["total", "tests/manifests/single-pod.yaml", "-o"])
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to:"));

    let content = fs::read_to_string(report).unwrap();
    assert!(content.contains("Kind: Pod, Object: some-namespace/some-name CPU: 30m, Memory: 42M"));
}

#[test]
fn test_total_missing_path() {
    kube_requests()
        .args(["total", "does/not/exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: failed to read does/not/exist"));
}

#[test]
fn test_total_rejects_unknown_format() {
    kube_requests()
        .args(["total", "tests/manifests", "--format", "csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown output format: csv"));
}

#[test]
fn test_sum_command() {
    kube_requests()
        .args(["sum", "10m", "1"])
        .assert()
        .success()
        .stdout("1010m\n");

    kube_requests()
        .args(["sum", "100Mi", "1G", "--factor", "2"])
        .assert()
        .success()
        .stdout("2157925Ki\n");

    kube_requests()
        .args(["sum", "1", "ten"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid input: ten"));
}
