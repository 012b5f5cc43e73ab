use assert_cmd::Command;
use flate2::Compression;
use flate2::write::GzEncoder;
use predicates::prelude::*;
use reqprof_cli::commands::input::{InputArgs, load_requests};
use reqprof_core::window::TimeWindow;
use std::ffi::OsStr;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture_path(filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join(filename)
}

#[allow(deprecated)]
fn get_reqprof_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("reqprof")
}

fn stdout_of(args: &[&OsStr]) -> String {
    let mut cmd = Command::new(get_reqprof_bin());
    cmd.args(args);
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}

/// Test that a stats file reproduces the report of the logs it came from
#[test]
fn test_write_then_read_stats() {
    let temp_dir = TempDir::new().unwrap();
    let stats = temp_dir.path().join("requests.stat");
    let app1 = fixture_path("app1.log");
    let app2 = fixture_path("app2.log");

    let from_logs = stdout_of(&[
        OsStr::new("detailed"),
        OsStr::new("--write-stats"),
        stats.as_os_str(),
        app1.as_os_str(),
        app2.as_os_str(),
    ]);
    assert!(stats.exists());

    let from_stats = stdout_of(&[
        OsStr::new("detailed"),
        OsStr::new("--read-stats"),
        stats.as_os_str(),
    ]);

    assert_eq!(from_logs, from_stats);
}

/// Test that loaded stats match freshly parsed requests field for field
#[test]
fn test_stats_file_round_trip_in_process() {
    let temp_dir = TempDir::new().unwrap();
    let stats = temp_dir.path().join("requests.stat");

    let write = InputArgs {
        files: vec![fixture_path("app1.log"), fixture_path("app2.log")],
        write_stats: Some(stats.clone()),
        ..Default::default()
    };
    let parsed = load_requests(&write, &TimeWindow::default()).unwrap();

    let read = InputArgs {
        read_stats: Some(stats),
        ..Default::default()
    };
    let loaded = load_requests(&read, &TimeWindow::default()).unwrap();

    assert_eq!(parsed, loaded);
}

/// Test that a gzip-compressed log reads the same as the plain one
#[test]
fn test_gzip_input_matches_plain() {
    let temp_dir = TempDir::new().unwrap();
    let gz_path = temp_dir.path().join("app1.log.gz");

    let plain = fs::read(fixture_path("app1.log")).unwrap();
    let mut encoder = GzEncoder::new(fs::File::create(&gz_path).unwrap(), Compression::default());
    encoder.write_all(&plain).unwrap();
    encoder.finish().unwrap();

    let app1 = fixture_path("app1.log");
    let from_plain = stdout_of(&[OsStr::new("detailed"), app1.as_os_str()]);
    let from_gz = stdout_of(&[OsStr::new("detailed"), gz_path.as_os_str()]);

    assert_eq!(from_plain, from_gz);
}

/// Test that corrupt lines and orphan events do not stop processing
#[test]
fn test_corrupt_lines_are_skipped() {
    let input = InputArgs {
        files: vec![fixture_path("truncated.log")],
        ..Default::default()
    };

    let requests = load_requests(&input, &TimeWindow::default()).unwrap();

    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, "/index_html");
    assert_eq!(requests[0].elapsed, Some(1.0));
}

#[test]
fn test_corrupt_lines_are_counted_on_stderr() {
    let mut cmd = Command::new(get_reqprof_bin());
    cmd.arg(fixture_path("truncated.log"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("/index_html"))
        .stderr(predicate::str::contains("Skipped 2 corrupt trace lines"));
}

/// Test that a start date after every event leaves nothing to report
#[test]
fn test_start_after_all_events() {
    let mut cmd = Command::new(get_reqprof_bin());
    cmd.arg("cumulative")
        .arg("--start")
        .arg("2030/01/01 00:00:00")
        .arg(fixture_path("app1.log"))
        .arg(fixture_path("app2.log"));

    cmd.assert().success().stdout("No data.\n");
}

#[test]
fn test_bad_date_is_rejected() {
    let mut cmd = Command::new(get_reqprof_bin());
    cmd.arg("cumulative")
        .arg("--start")
        .arg("2001/13/40 00:00:00")
        .arg(fixture_path("app1.log"));

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("bad date 2001/13/40 00:00:00"));
}

#[test]
fn test_read_and_write_stats_conflict() {
    let mut cmd = Command::new(get_reqprof_bin());
    cmd.arg("cumulative")
        .arg("--read-stats")
        .arg("a.stat")
        .arg("--write-stats")
        .arg("b.stat");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_unreadable_stats_file() {
    let mut cmd = Command::new(get_reqprof_bin());
    cmd.arg("cumulative")
        .arg("--read-stats")
        .arg("/definitely/missing/requests.stat");

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to open"));
}
