//! End-to-end checks of the `busrelay` binary's argument and config handling.
//!
//! These never open a listener or a connection: every case fails during
//! startup, before any network activity.

use std::fs;
use std::process::{Command, Output};

use tempfile::TempDir;

fn busrelay(args: &[&str], dir: &TempDir) -> Output {
    Command::new(env!("CARGO_BIN_EXE_busrelay"))
        .args(args)
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run busrelay binary")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_emulate_requires_server() {
    let dir = TempDir::new().unwrap();
    let output = busrelay(&["emulate", "--emulator-id", "emu"], &dir);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("relay address is required"));
}

#[test]
fn test_emulate_requires_emulator_id() {
    let dir = TempDir::new().unwrap();
    let output = busrelay(&["emulate", "--server", "ws://127.0.0.1:1"], &dir);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("emulator id is required"));
}

#[test]
fn test_out_of_range_argument_is_rejected() {
    let dir = TempDir::new().unwrap();
    let output = busrelay(&["emulate", "--websockets-number", "21"], &dir);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("out of range"));
}

#[test]
fn test_invalid_verbosity_is_rejected() {
    let dir = TempDir::new().unwrap();
    let output = busrelay(&["--verbosity", "15", "serve"], &dir);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("0, 10, 20, 30, 40, 50"));
}

#[test]
fn test_invalid_config_file_value_is_reported() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("busrelay.ini"),
        "[emulator]\nrefresh_timeout = 0\n",
    )
    .unwrap();

    let output = busrelay(&["emulate"], &dir);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("emulator.refresh_timeout = '0'"));
}

#[test]
fn test_missing_explicit_config_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let output = busrelay(&["--config", "nope.ini", "serve"], &dir);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("nope.ini"));
}

#[test]
fn test_missing_routes_directory_is_reported() {
    let dir = TempDir::new().unwrap();
    let output = busrelay(
        &[
            "emulate",
            "--server",
            "ws://127.0.0.1:1",
            "--emulator-id",
            "emu",
            "--routes-dir",
            "no-such-dir",
        ],
        &dir,
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("no-such-dir"));
}
