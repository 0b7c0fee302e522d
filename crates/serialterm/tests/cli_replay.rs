#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::Value;

fn capture_file(tag: &str, contents: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "serialterm-cli-{tag}-{}-{}.bin",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::write(&path, contents).expect("capture file should be writable");
    path
}

fn serialterm(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_serialterm"))
        .arg("--log-level")
        .arg("error")
        .args(args)
        .env_remove("SERIALTERM_BAUD")
        .env_remove("SERIALTERM_DATA_BITS")
        .env_remove("SERIALTERM_PARITY")
        .env_remove("SERIALTERM_STOP_BITS")
        .output()
        .expect("serialterm should run")
}

fn json_events(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("each stdout line is JSON"))
        .collect()
}

fn received_texts(events: &[Value]) -> Vec<String> {
    events
        .iter()
        .filter(|event| event["kind"] == "received")
        .map(|event| event["text"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn replay_prints_complete_lines_as_json() {
    let path = capture_file("json", b"$GPGGA,1*47\r\n\nOK\r\nunterminated");

    let output = serialterm(&[
        "--format",
        "json",
        "replay",
        path.to_str().unwrap(),
        "--chunk-size",
        "1",
    ]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let events = json_events(&output);
    assert_eq!(received_texts(&events), ["$GPGGA,1*47", "", "OK"]);

    let first = &events[0];
    assert_eq!(first["kind"], "status");
    assert!(first["text"].as_str().unwrap().starts_with("opened "));
    assert_eq!(events.last().unwrap()["kind"], "status");
    for event in &events {
        assert_eq!(event["time"].as_str().unwrap().len(), 8);
        assert!(event["timestamp"].as_str().is_some());
    }

    let _ = std::fs::remove_file(&path);
}

#[test]
fn replay_pretty_output_uses_clock_prefix_and_crlf() {
    let path = capture_file("pretty", b"hello\nworld\r\n");

    let output = serialterm(&["--format", "pretty", "replay", path.to_str().unwrap()]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.split_terminator("\r\n").collect();
    assert_eq!(lines.len(), 4, "opened + 2 lines + closed: {stdout:?}");
    for line in &lines {
        assert!(line.starts_with('['));
        assert_eq!(&line[9..11], "] ");
    }
    assert!(lines[1].ends_with("] hello"));
    assert!(lines[2].ends_with("] world"));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn replay_stops_after_count_lines() {
    let mut capture = Vec::new();
    for i in 0..50 {
        capture.extend_from_slice(format!("row {i}\r\n").as_bytes());
    }
    let path = capture_file("count", &capture);

    let output = serialterm(&[
        "--format",
        "json",
        "replay",
        path.to_str().unwrap(),
        "--count",
        "3",
        "--delay-ms",
        "1",
    ]);

    assert!(output.status.success());
    assert_eq!(received_texts(&json_events(&output)), ["row 0", "row 1", "row 2"]);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn replay_of_missing_file_fails_with_transport_error() {
    let output = serialterm(&["replay", "/nonexistent/serialterm/capture.bin"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("open failed"));
}

#[test]
fn config_rejects_invalid_baud_with_usage_code() {
    let output = serialterm(&["config", "COM3", "--baud", "96oo"]);
    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("96oo"));
}

#[test]
fn config_prints_normalized_settings() {
    let output = serialterm(&[
        "--format",
        "json",
        "config",
        "/dev/ttyUSB0",
        "--baud",
        "115200",
        "--parity",
        "E",
        "--stop-bits",
        "2",
    ]);

    assert!(output.status.success());
    let config: Value = serde_json::from_slice(&output.stdout).expect("config is JSON");
    assert_eq!(config["port"], "/dev/ttyUSB0");
    assert_eq!(config["baud_rate"], 115200);
    assert_eq!(config["data_bits"], 8);
    assert_eq!(config["parity"], "even");
    assert_eq!(config["frame"], "8E2");
}

#[test]
fn settings_fall_back_to_environment() {
    let output = Command::new(env!("CARGO_BIN_EXE_serialterm"))
        .args(["--format", "pretty", "config", "COM3"])
        .env("SERIALTERM_BAUD", "57600")
        .env("SERIALTERM_DATA_BITS", "7")
        .env("SERIALTERM_PARITY", "odd")
        .env_remove("SERIALTERM_STOP_BITS")
        .output()
        .expect("serialterm should run");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "COM3 @ 57600 baud (7O1)"
    );
}
