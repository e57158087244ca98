//! Command-line behaviour of the `mol-sim` binary.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn mol_sim() -> Command {
    Command::cargo_bin("mol-sim").unwrap()
}

#[test]
fn test_help_exits_with_failure() {
    mol_sim()
        .arg("--help")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("--input"))
        .stdout(predicate::str::contains("--database"));
}

#[test]
fn test_missing_database_is_usage_error() {
    mol_sim()
        .args(["--input", "query.smi"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--database"));
}

#[test]
fn test_missing_input_is_usage_error() {
    mol_sim()
        .args(["--database", "db.smi"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--input"));
}

#[test]
fn test_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "query.mol2", "@<TRIPOS>MOLECULE\n");
    let database = write(dir.path(), "db.smi", "CCO\n");

    mol_sim()
        .current_dir(dir.path())
        .arg("--input")
        .arg(&input)
        .arg("--database")
        .arg(&database)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));

    assert!(!dir.path().join("best_matches.csv").exists());
}

#[test]
fn test_successful_run_writes_default_report() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "query.smi", "CCO\tethanol\nCCC\tpropane\n");
    write(dir.path(), "db.smi", "CCO\tethanol\nCCN\tethylamine\n");

    mol_sim()
        .current_dir(dir.path())
        .args(["--input", "query.smi", "--database", "db.smi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Input file: query.smi (2 molecules, 0 skipped)"))
        .stdout(predicate::str::contains("Best matches written: 2"));

    let csv = std::fs::read_to_string(dir.path().join("best_matches.csv")).unwrap();
    assert!(csv.starts_with("query.smi, db.smi, similarity\nCCO, CCO, 1.0000\n"));
    assert_eq!(csv.lines().count(), 3);
}

#[test]
fn test_json_summary_includes_rows() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "query.smi", "CCO\tethanol\n");
    write(dir.path(), "db.smi", "CCN\tethylamine\nOCC\tethanol\n");

    let output = mol_sim()
        .current_dir(dir.path())
        .args(["--input", "query.smi", "--database", "db.smi"])
        .args(["--output", "hits.csv", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["query_count"], 1);
    assert_eq!(json["database_count"], 2);
    assert_eq!(json["report"]["rows"][0]["database_index"], 1);
    assert_eq!(json["report"]["rows"][0]["database_name"], "ethanol");
    assert!(dir.path().join("hits.csv").exists());
}

#[test]
fn test_empty_database_reports_header_only() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "query.smi", "CCO\tethanol\n");
    write(dir.path(), "db.smi", "");

    mol_sim()
        .current_dir(dir.path())
        .args(["--input", "query.smi", "--database", "db.smi", "--format", "tsv"])
        .assert()
        .success();

    let csv = std::fs::read_to_string(dir.path().join("best_matches.csv")).unwrap();
    assert_eq!(csv, "query.smi, db.smi, similarity\n");
}
