use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn write_zip(path: &Path, members: &[(&str, &str)]) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    for (name, content) in members {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

fn downloads() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_zip(
        &dir.path().join("Homework 1_alice42_attempt_2024-03-01-10-00-00.zip"),
        &[("proj1/Main.txt", "alice main")],
    );
    write_zip(
        &dir.path().join("Homework 1_bob_attempt_2024-03-02-09-30-00.zip"),
        &[("Main.txt", "bob main"), ("tests/Main.txt", "bob test")],
    );
    dir
}

fn subextract() -> Command {
    Command::cargo_bin("subextract").unwrap()
}

#[test]
fn extracts_exact_and_closest_matches() {
    let downloads = downloads();
    let out = TempDir::new().unwrap();

    subextract()
        .arg(out.path())
        .arg(downloads.path())
        .arg("proj1/Main.txt")
        .args(["--output-format", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exact: 1"))
        .stdout(predicate::str::contains("Fuzzy: 1"));

    assert_eq!(
        fs::read_to_string(out.path().join("alice42_Main.txt")).unwrap(),
        "alice main"
    );
    assert_eq!(
        fs::read_to_string(out.path().join("bob_Main.txt")).unwrap(),
        "bob main"
    );
}

#[test]
fn exact_flag_reports_no_match() {
    let downloads = downloads();
    let out = TempDir::new().unwrap();

    subextract()
        .arg(out.path())
        .arg(downloads.path())
        .arg("proj1/Main.txt")
        .args(["--exact", "--output-format", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No match: 1"));

    assert!(out.path().join("alice42_Main.txt").exists());
    assert!(!out.path().join("bob_Main.txt").exists());
}

#[test]
fn excluded_members_fail_with_exit_code_two() {
    let dir = TempDir::new().unwrap();
    write_zip(
        &dir.path().join("hw_carol_a_2024-01-01-x.zip"),
        &[("tests/Check.txt", "only a test")],
    );
    let out = TempDir::new().unwrap();

    subextract()
        .arg(out.path())
        .arg(dir.path())
        .arg("Check.txt")
        .args(["--output-format", "plain"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("FAILED:"));

    assert!(!out.path().join("carol_Check.txt").exists());
}

#[test]
fn json_report_is_parseable() {
    let downloads = downloads();
    let out = TempDir::new().unwrap();

    let output = subextract()
        .arg(out.path())
        .arg(downloads.path())
        .arg("Main.txt")
        .args(["--output-format", "json", "-q"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let report: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(report["summary"]["submitters"], 2);
    assert_eq!(report["summary"]["exact"], 1);
    assert_eq!(report["summary"]["fuzzy"], 1);
}

#[test]
fn json_output_is_one_object_per_line() {
    let downloads = downloads();
    let out = TempDir::new().unwrap();

    let output = subextract()
        .arg(out.path())
        .arg(downloads.path())
        .arg("proj1/Main.txt")
        .args(["--output-format", "json", "-v"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert!(lines.len() > 1);
    assert!(lines.iter().any(|line| line["type"] == "message"));
    let report = lines.last().unwrap();
    assert_eq!(report["summary"]["exact"], 1);
    assert_eq!(report["summary"]["fuzzy"], 1);
}

#[test]
fn empty_archive_directory_exits_with_three() {
    let empty = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    subextract()
        .arg(out.path())
        .arg(empty.path())
        .arg("Main.txt")
        .args(["--output-format", "plain"])
        .assert()
        .code(3);
}

#[test]
fn missing_archive_directory_is_an_error() {
    let out = TempDir::new().unwrap();

    subextract()
        .arg(out.path())
        .arg(out.path().join("nope"))
        .arg("Main.txt")
        .assert()
        .code(1);
}

#[test]
fn dry_run_writes_nothing() {
    let downloads = downloads();
    let out = TempDir::new().unwrap();
    let target = out.path().join("graded");

    subextract()
        .arg(&target)
        .arg(downloads.path())
        .arg("proj1/Main.txt")
        .args(["--dry-run", "--output-format", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alice42"))
        .stdout(predicate::str::contains("bob"));

    assert!(!target.exists());
}

#[test]
fn generate_config_writes_sample() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("subextract.toml");

    subextract()
        .arg("--generate-config")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated sample configuration file"));

    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[scan]"));
    assert!(content.contains("exclude_marker"));
}

#[test]
fn config_file_sets_exact_mode() {
    let downloads = downloads();
    let out = TempDir::new().unwrap();
    let config_path = out.path().join("custom.toml");
    fs::write(&config_path, "[extract]\nexact_only = true\n").unwrap();
    let target = out.path().join("graded");

    subextract()
        .arg(&target)
        .arg(downloads.path())
        .arg("proj1/Main.txt")
        .arg("--config")
        .arg(&config_path)
        .args(["--output-format", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No match: 1"));
}

#[test]
fn files_argument_is_required() {
    subextract()
        .arg("out")
        .arg("downloads")
        .assert()
        .failure()
        .stderr(predicate::str::contains("FILES").or(predicate::str::contains("required")));
}
