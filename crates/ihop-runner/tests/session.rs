//! End-to-end sessions driven through the serve loop over in-memory
//! streams.

use ihop_core::KnownDialect;
use ihop_runner::{serve, Dispatcher, HostInfo, ServeExit, ServeReport, SkipPolicy};
use ihop_schema::JsonSchemaBackend;
use ihop_state::SessionState;
use serde_json::{json, Value};

const START: &str = r#"{"cmd":"start","version":1}"#;
const STOP: &str = r#"{"cmd":"stop"}"#;

fn session(skips: SkipPolicy, lines: &[&str]) -> (ServeReport, Vec<String>) {
    let mut dispatcher = Dispatcher::new(
        JsonSchemaBackend::new(),
        skips,
        HostInfo::detect(),
    );
    let input = lines.iter().map(|l| format!("{l}\n")).collect::<String>();
    let mut out = Vec::new();
    let report = serve(&mut dispatcher, input.as_bytes(), &mut out).unwrap();
    let output = String::from_utf8(out).unwrap();
    (report, output.lines().map(str::to_string).collect())
}

fn parsed(lines: &[String]) -> Vec<Value> {
    lines
        .iter()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn run_line(seq: &str, case: Value) -> String {
    format!(r#"{{"cmd":"run","seq":{seq},"case":{case}}}"#)
}

#[test]
fn test_integer_type_session() {
    let run = run_line(
        "1",
        json!({
            "description": "t",
            "schema": {"type": "integer"},
            "tests": [
                {"description": "d1", "instance": 5, "valid": true},
                {"description": "d2", "instance": "x", "valid": false},
            ],
        }),
    );
    let (report, lines) = session(SkipPolicy::empty(), &[START, &run, STOP]);
    let responses = parsed(&lines);

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["version"], 1);
    assert_eq!(responses[0]["implementation"]["language"], "rust");
    assert_eq!(
        responses[1],
        json!({"seq": 1, "results": [{"valid": true}, {"valid": false}]})
    );
    assert_eq!(report.exit, ServeExit::Stopped);
}

#[test]
fn test_run_before_start_is_fatal() {
    let run = run_line("1", json!({"description": "t", "schema": {}, "tests": []}));
    let (report, lines) = session(SkipPolicy::empty(), &[&run, START]);
    let responses = parsed(&lines);

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["errored"], true);
    assert_eq!(responses[0]["seq"], 1);
    assert_eq!(report.exit.exit_code(), 1);
    assert_eq!(report.processed_lines, 1);
}

#[test]
fn test_seq_is_echoed_byte_for_byte() {
    let case = json!({"description": "t", "schema": true, "tests": []});
    let seqs = [
        "123456789012345678901234567890",
        r#""abc""#,
        r#"[1,{"k":"v"}]"#,
        "1.50",
    ];
    let runs: Vec<String> = seqs.iter().map(|s| run_line(s, case.clone())).collect();
    let mut input: Vec<&str> = vec![START];
    input.extend(runs.iter().map(String::as_str));
    let (_, lines) = session(SkipPolicy::empty(), &input);

    for (seq, line) in seqs.iter().zip(&lines[1..]) {
        assert_eq!(line, &format!(r#"{{"seq":{seq},"results":[]}}"#));
    }
}

#[test]
fn test_skipped_case_from_yaml_policy() {
    let skips = SkipPolicy::from_yaml_str(
        r#"
cases:
  - description: "unsupported feature"
    message: "not implemented"
    issue_url: "https://example.org/issues/9"
"#,
    )
    .unwrap();
    let run = run_line(
        r#""s1""#,
        json!({"description": "unsupported feature", "schema": {}, "tests": [{"description": "t", "instance": 1}]}),
    );
    let (report, lines) = session(skips, &[START, &run, STOP]);

    assert_eq!(
        parsed(&lines)[1],
        json!({
            "seq": "s1",
            "skipped": true,
            "message": "not implemented",
            "issue_url": "https://example.org/issues/9",
        })
    );
    assert_eq!(report.stats.cases_skipped, 1);
}

#[test]
fn test_dialect_scoped_skip_only_applies_under_that_dialect() {
    let skips = SkipPolicy::from_yaml_str(
        r#"
cases:
  - description: "c"
    message: "draft7 only"
    dialect: draft7
"#,
    )
    .unwrap();
    let case = json!({"description": "c", "schema": {}, "tests": []});
    let draft7 = format!(
        r#"{{"cmd":"dialect","dialect":"{}"}}"#,
        KnownDialect::Draft7.uri()
    );
    let first = run_line("1", case.clone());
    let second = run_line("2", case);
    let (_, lines) = session(skips, &[START, &first, &draft7, &second]);
    let responses = parsed(&lines);

    assert_eq!(responses[1], json!({"seq": 1, "results": []}));
    assert_eq!(responses[2], json!({"ok": true}));
    assert_eq!(responses[3]["skipped"], true);
}

#[test]
fn test_registry_resolves_remote_reference() {
    let run = run_line(
        "3",
        json!({
            "description": "remote ref",
            "schema": {"$ref": "https://ex/a"},
            "registry": {"https://ex/a": {"type": "string"}},
            "tests": [
                {"description": "string", "instance": "hello"},
                {"description": "number", "instance": 42},
            ],
        }),
    );
    let (_, lines) = session(SkipPolicy::empty(), &[START, &run]);
    assert_eq!(
        parsed(&lines)[1],
        json!({"seq": 3, "results": [{"valid": true}, {"valid": false}]})
    );
}

#[test]
fn test_dialect_negotiation() {
    let draft202012 = format!(
        r#"{{"cmd":"dialect","dialect":"{}"}}"#,
        KnownDialect::Draft202012.uri()
    );
    let draft3 = format!(
        r#"{{"cmd":"dialect","dialect":"{}"}}"#,
        KnownDialect::Draft3.uri()
    );
    let (report, lines) = session(
        SkipPolicy::empty(),
        &[START, &draft202012, &draft202012, &draft3, STOP],
    );
    let responses = parsed(&lines);

    assert_eq!(responses[1], json!({"ok": true}));
    assert_eq!(responses[2], json!({"ok": true}));
    assert_eq!(responses[3], json!({"ok": false}));
    assert_eq!(report.exit, ServeExit::Stopped);
}

#[test]
fn test_unknown_command_is_fatal_with_sentinel_seq() {
    let (report, lines) = session(SkipPolicy::empty(), &[START, r#"{"cmd":"frobnicate"}"#, STOP]);
    let responses = parsed(&lines);

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[1]["seq"], -1);
    assert_eq!(responses[1]["errored"], true);
    assert!(responses[1]["context"]["message"]
        .as_str()
        .unwrap()
        .contains("frobnicate"));
    assert_eq!(report.exit.exit_code(), 1);
}

#[test]
fn test_case_error_does_not_end_session() {
    let bad = run_line(
        "1",
        json!({"description": "bad", "schema": {"type": "not-a-type"}, "tests": [{"description": "t", "instance": 1}]}),
    );
    let good = run_line(
        "2",
        json!({"description": "good", "schema": {"minimum": 2}, "tests": [{"description": "t", "instance": 1}]}),
    );
    let (report, lines) = session(SkipPolicy::empty(), &[START, &bad, &good, STOP]);
    let responses = parsed(&lines);

    assert_eq!(responses[1]["seq"], 1);
    assert_eq!(responses[1]["errored"], true);
    assert!(responses[1]["context"]["message"].is_string());
    assert!(responses[1]["context"]["traceback"].is_string());
    assert_eq!(responses[2], json!({"seq": 2, "results": [{"valid": false}]}));
    assert_eq!(report.exit, ServeExit::Stopped);
}

#[test]
fn test_second_start_is_fatal() {
    let (report, lines) = session(SkipPolicy::empty(), &[START, START]);
    assert_eq!(lines.len(), 2);
    assert!(matches!(report.exit, ServeExit::Fatal { .. }));
}

#[test]
fn test_out_of_range_number_instance_does_not_end_session() {
    let huge = r#"{"cmd":"run","seq":1,"case":{"description":"huge","schema":{"type":"number"},"tests":[{"description":"t","instance":1e400}]}}"#;
    let after = run_line(
        "2",
        json!({"description": "after", "schema": true, "tests": [{"description": "t", "instance": 1}]}),
    );
    let (report, lines) = session(SkipPolicy::empty(), &[START, huge, &after, STOP]);
    let responses = parsed(&lines);

    assert_eq!(responses.len(), 3);
    assert_eq!(responses[1]["seq"], 1);
    assert!(responses[1].get("errored").is_none());
    assert_eq!(responses[1]["results"].as_array().map(Vec::len), Some(1));
    assert_eq!(responses[2], json!({"seq": 2, "results": [{"valid": true}]}));
    assert_eq!(report.exit, ServeExit::Stopped);
}

#[test]
fn test_unsupported_version_leaves_session_not_started() {
    let mut dispatcher = Dispatcher::new(
        JsonSchemaBackend::new(),
        SkipPolicy::empty(),
        HostInfo::detect(),
    );
    let mut out = Vec::new();
    let report = serve(
        &mut dispatcher,
        "{\"cmd\":\"start\",\"version\":2}\n".as_bytes(),
        &mut out,
    )
    .unwrap();

    assert_eq!(report.exit.exit_code(), 1);
    assert_eq!(dispatcher.session().state(), SessionState::NotStarted);
    let fatal: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(fatal["seq"], -1);
}
