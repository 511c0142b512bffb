use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("packetmon"))
}

fn repo_root() -> std::path::PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest
        .parent()
        .and_then(|p| p.parent())
        .expect("repo root")
        .to_path_buf()
}

fn golden(case: &str) -> std::path::PathBuf {
    repo_root().join("tests").join("golden").join(case)
}

fn sample_trace() -> std::path::PathBuf {
    golden("build_session").join("input.jsonl")
}

#[test]
fn help_lists_both_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("replay").and(contains("capture")));
    cmd().arg("capture").arg("--help").assert().success();
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.jsonl");

    cmd()
        .arg("replay")
        .arg(missing)
        .assert()
        .failure()
        .code(2)
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn unsupported_capture_extension_is_rejected() {
    cmd()
        .arg("capture")
        .arg(sample_trace())
        .assert()
        .failure()
        .stderr(contains("unsupported input format").and(contains(".pcapng")));
}

#[test]
fn replay_prints_golden_output() {
    let expected =
        std::fs::read_to_string(golden("build_session").join("expected.txt")).expect("expected");
    let assert = cmd()
        .arg("replay")
        .arg(sample_trace())
        .assert()
        .success()
        .stderr(contains("OK:"));
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    assert_eq!(stdout, expected);
}

#[test]
fn replay_writes_output_file() {
    let temp = TempDir::new().expect("tempdir");
    let output = temp.path().join("nested").join("session.out");

    cmd()
        .arg("replay")
        .arg(sample_trace())
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicates::str::is_empty());
    let written = std::fs::read_to_string(&output).expect("output file");
    assert!(written.contains("TEpl @ (100, 50), type: 1"));
}

#[test]
fn output_must_differ_from_input() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("trace.jsonl");
    std::fs::copy(sample_trace(), &input).expect("copy trace");

    cmd()
        .arg("replay")
        .arg(&input)
        .arg("-o")
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("output path must differ from input"));
}

#[test]
fn json_output_is_one_object_per_line() {
    let assert = cmd()
        .arg("replay")
        .arg(sample_trace())
        .arg("--json")
        .arg("--quiet")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let values: Vec<Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("valid json"))
        .collect();
    assert_eq!(values.len(), 7);
    assert_eq!(values[0]["record"]["kind"], "place_tile_entity");
    assert_eq!(values[0]["client_name"], "Ada");
}

#[test]
fn show_noise_prints_suppressed_types() {
    cmd()
        .arg("replay")
        .arg(sample_trace())
        .arg("--show-noise")
        .assert()
        .success()
        .stdout(contains("[Recv] 13 (PlayerUpdate) from: 0 (Ada)"));
}

#[test]
fn classic_profile_prints_tile_square_lines() {
    cmd()
        .arg("replay")
        .arg(golden("tile_squares").join("input.jsonl"))
        .arg("--profile")
        .arg("classic")
        .assert()
        .success()
        .stdout(contains("[Send] 20 (TileSendSquare) ign: -1 (-) | rem: -1 (-)"));
}

#[test]
fn quiet_suppresses_ok_message() {
    cmd()
        .arg("replay")
        .arg(sample_trace())
        .arg("--quiet")
        .assert()
        .success()
        .stderr(contains("OK:").not());
}

#[test]
fn strict_fails_when_decodes_fail() {
    cmd()
        .arg("replay")
        .arg(sample_trace())
        .arg("--strict")
        .assert()
        .failure()
        .code(2)
        .stderr(contains("1 packet(s) failed to decode"));
}

#[test]
fn malformed_trace_reports_line_number() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("broken.jsonl");
    std::fs::write(&input, "{\"event\":\"leave\",\"client\":0}\nnot json\n").expect("write trace");

    cmd()
        .arg("replay")
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("trace line 2"));
}
