use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file
}

fn agspect() -> Command {
    Command::cargo_bin("agspect").expect("binary built")
}

#[test]
fn test_parse_dialogue_body_as_json() {
    let file = write_temp(
        r#"{
            "model": "claude-sonnet-4",
            "load_skills": ["web-search"],
            "messages": [{ "role": "user", "content": "hello" }]
        }"#,
    );

    agspect()
        .args(["--format", "json", "parse"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"mode\": \"dialogue\""))
        .stdout(predicate::str::contains("web-search"))
        .stdout(predicate::str::contains("\"role\": \"user\""));
}

#[test]
fn test_parse_sse_stream_plain_output() {
    let file = write_temp(concat!(
        "event: message_start\n",
        "data: {\"type\":\"message_start\",\"message\":{\"model\":\"claude-sonnet-4\",\"role\":\"assistant\"}}\n",
        "\n",
        "event: content_block_start\n",
        "data: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"text\"}}\n",
        "\n",
        "event: content_block_delta\n",
        "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"hi there\"}}\n",
        "\n",
        "event: message_delta\n",
        "data: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"end_turn\"}}\n",
        "\n",
    ));

    agspect()
        .arg("parse")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Stream response body (4 frames)"))
        .stdout(predicate::str::contains("claude-sonnet-4"))
        .stdout(predicate::str::contains("end_turn"))
        .stdout(predicate::str::contains("hi there"));
}

#[test]
fn test_parse_target_flag() {
    let file = write_temp(r#"{"messages": []}"#);

    agspect()
        .args(["--format", "json", "parse", "--target", "request"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"target\": \"request\""));
}

#[test]
fn test_frames_command_json_lines_fallback() {
    let file = write_temp("{\"type\":\"response.created\"}\nnot json\n");

    agspect()
        .args(["--format", "json", "frames"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"event_label\": \"response.created\""))
        .stdout(predicate::str::contains("\"event_label\": \"raw_line\""));
}

#[test]
fn test_detect_command() {
    let file = write_temp(
        r#"{
            "timestamp": "2025-06-01T12:00:00Z",
            "host": "api.anthropic.com",
            "path": "/v1/messages",
            "method": "POST",
            "request_headers": { "user-agent": "claude-cli/1.0.118 (external, cli)" },
            "response_headers": { "content-type": "text/event-stream" }
        }"#,
    );

    agspect()
        .arg("detect")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Claude"))
        .stdout(predicate::str::contains("anthropic"))
        .stdout(predicate::str::contains("sse"));
}

#[test]
fn test_missing_file_fails_with_context() {
    agspect()
        .args(["parse", "/nonexistent/body.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read body file"));
}
