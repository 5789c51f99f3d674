//! Drives the harness binaries over real stdin/stdout.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};

const INTEGER_SESSION: &str = concat!(
    "{\"cmd\":\"start\",\"version\":1}\n",
    "{\"cmd\":\"dialect\",\"dialect\":\"https://json-schema.org/draft/2020-12/schema\"}\n",
    "{\"cmd\":\"run\",\"seq\":1,\"case\":{\"description\":\"t\",\"schema\":{\"type\":\"integer\"},",
    "\"tests\":[{\"description\":\"d1\",\"instance\":5,\"valid\":true},{\"description\":\"d2\",\"instance\":\"x\",\"valid\":false}]}}\n",
    "{\"cmd\":\"stop\"}\n",
);

fn binary(name: &str) -> Command {
    let mut cmd = Command::cargo_bin(name).unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn harness() -> Command {
    binary("ihop-jsonschema")
}

fn stdout_lines(output: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(output)
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn assert_integer_session(bin: &str, name: &str) {
    let output = binary(bin).write_stdin(INTEGER_SESSION).output().unwrap();
    assert!(output.status.success());

    let lines = stdout_lines(&output.stdout);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["version"], 1);
    assert_eq!(lines[0]["implementation"]["name"], name);
    assert_eq!(lines[0]["implementation"]["language"], "rust");
    assert!(lines[0]["implementation"]["language_version"]
        .as_str()
        .unwrap()
        .starts_with(|c: char| c.is_ascii_digit()));
    assert!(!lines[0]["implementation"]["version"]
        .as_str()
        .unwrap()
        .is_empty());
    assert_eq!(lines[1], json!({"ok": true}));
    assert_eq!(
        lines[2],
        json!({"seq": 1, "results": [{"valid": true}, {"valid": false}]})
    );
}

#[test]
fn test_full_session_exits_zero() {
    assert_integer_session("ihop-jsonschema", "jsonschema");
}

#[test]
fn test_boon_full_session_exits_zero() {
    assert_integer_session("ihop-boon", "boon");
}

#[test]
fn test_boon_rejects_draft3() {
    let output = binary("ihop-boon")
        .write_stdin(concat!(
            "{\"cmd\":\"start\",\"version\":1}\n",
            "{\"cmd\":\"dialect\",\"dialect\":\"http://json-schema.org/draft-03/schema#\"}\n",
            "{\"cmd\":\"stop\"}\n",
        ))
        .output()
        .unwrap();
    assert!(output.status.success());
    let lines = stdout_lines(&output.stdout);
    assert!(!lines[0]["implementation"]["dialects"]
        .as_array()
        .unwrap()
        .iter()
        .any(|d| d.as_str().is_some_and(|d| d.contains("draft-03"))));
    assert_eq!(lines[1], json!({"ok": false}));
}

#[test]
fn test_unsupported_version_exits_one() {
    harness()
        .write_stdin("{\"cmd\":\"start\",\"version\":2}\n{\"cmd\":\"start\",\"version\":1}\n")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"seq\":-1"))
        .stdout(predicate::str::contains("unsupported protocol version 2"))
        .stdout(predicate::str::contains("implementation").not());
}

#[test]
fn test_non_utf8_input_exits_one() {
    let mut input = b"{\"cmd\":\"start\",\"version\":1}\n".to_vec();
    input.extend_from_slice(b"\xff\n");
    harness()
        .write_stdin(input)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"seq\":-1"))
        .stdout(predicate::str::contains("UTF-8"));
}

#[test]
fn test_unknown_command_exits_one() {
    harness()
        .write_stdin("{\"cmd\":\"start\",\"version\":1}\n{\"cmd\":\"nope\"}\n")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"seq\":-1"))
        .stdout(predicate::str::contains("\"errored\":true"));
}

#[test]
fn test_run_before_start_exits_one() {
    harness()
        .write_stdin("{\"cmd\":\"run\",\"seq\":\"x\",\"case\":{\"description\":\"t\",\"schema\":{},\"tests\":[]}}\n")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Not started"))
        .stdout(predicate::str::contains("\"seq\":\"x\""));
}

#[test]
fn test_end_of_input_exits_zero() {
    harness()
        .write_stdin("{\"cmd\":\"start\",\"version\":1}\n")
        .assert()
        .success();
}

#[test]
fn test_skip_file_applies() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "cases:\n  - description: \"skipped case\"\n    message: \"unsupported\"\n"
    )
    .unwrap();

    let output = harness()
        .arg("--skip-file")
        .arg(file.path())
        .write_stdin(concat!(
            "{\"cmd\":\"start\",\"version\":1}\n",
            "{\"cmd\":\"run\",\"seq\":4,\"case\":{\"description\":\"skipped case\",\"schema\":{},\"tests\":[]}}\n",
            "{\"cmd\":\"stop\"}\n",
        ))
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output.stdout)[1],
        json!({"seq": 4, "skipped": true, "message": "unsupported"})
    );
}

#[test]
fn test_invalid_skip_file_exits_one_before_reading_input() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "cases:\n  - description: \"x\"\n    bogus: 1\n").unwrap();

    harness()
        .arg("--skip-file")
        .arg(file.path())
        .write_stdin("{\"cmd\":\"start\",\"version\":1}\n")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("failed to load skip file"));
}

#[test]
fn test_logs_stay_off_stdout() {
    let output = harness()
        .arg("-vvv")
        .arg("--log-format")
        .arg("json")
        .write_stdin("{\"cmd\":\"start\",\"version\":1}\n{\"cmd\":\"stop\"}\n")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_lines(&output.stdout).len(), 1);
    assert!(!output.stderr.is_empty());
}
