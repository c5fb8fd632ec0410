//! Runs the compiled binary

use std::io::Write;
use std::process::{Command, Output};

fn ses(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ses"))
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run ses binary")
}

#[test]
fn test_version_flag() {
    let output = ses(&["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("ses "));
    assert!(stdout.contains("api "));
}

#[test]
fn test_demo_run_prints_pass_statistics() {
    let config = tempfile::NamedTempFile::new().unwrap();
    let output = ses(&[
        "--config-file",
        config.path().to_str().unwrap(),
        "--log-level",
        "off",
        "--no-color",
        "--messages",
        "4",
        "--passes",
        "2",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Hello World #0"));
    assert!(stdout.contains("Hello from a group"));
    assert!(stdout.contains("posted: 6 admitted, 0 rejected"));
    assert!(stdout.contains("pass 1:"));
    assert!(stdout.contains("pass 2:"));
    assert!(!stdout.contains("pass 3:"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    let output = ses(&["--config-file", missing.to_str().unwrap(), "--no-color"]);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_invalid_config_value_fails() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "[manager]\nmax_discards = 0").unwrap();

    let output = ses(&[
        "--config-file",
        config.path().to_str().unwrap(),
        "--log-level",
        "error",
        "--no-color",
    ]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(format!("{}{}", stdout, stderr).contains("manager.max_discards"));
}

#[test]
fn test_unknown_flag_rejected() {
    let output = ses(&["--plugins"]);

    assert!(!output.status.success());
}
