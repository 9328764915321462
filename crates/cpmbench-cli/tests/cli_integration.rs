//! Integration tests for the cpmbench CLI.

use cpmbench_core as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing as _;
use tracing_subscriber as _;

/// `LXI D,msg; MVI C,9; CALL 5; MVI C,0; CALL 5; msg: "HI$"`
const HELLO: &[u8] = &[
    0x11, 0x0D, 0x01, 0x0E, 0x09, 0xCD, 0x05, 0x00, 0x0E, 0x00, 0xCD, 0x05, 0x00, b'H', b'I', b'$',
];

fn binary_path() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    path.pop();
    path.join("cpmbench")
}

fn create_program(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn run_cli(args: &[&str]) -> Output {
    Command::new(binary_path())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run cpmbench")
}

#[test]
fn runs_program_and_prints_console_then_ticks() {
    let temp_dir = tempfile::tempdir().unwrap();
    let program = create_program(temp_dir.path(), "hello.com", HELLO);

    let output = run_cli(&["-i", program.to_str().unwrap()]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("HI"), "{stdout}");
    assert!(stdout.contains("ticks:"), "{stdout}");
    assert!(stdout.trim_end().ends_with("68"), "{stdout}");
    assert!(output.stderr.is_empty());
}

#[test]
fn all_stats_report_memory_and_registers() {
    let temp_dir = tempfile::tempdir().unwrap();
    let program = create_program(temp_dir.path(), "hello.com", HELLO);

    let output = run_cli(&["--stats", "all", program.to_str().unwrap()]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("memory reads:"), "{stdout}");
    assert!(stdout.contains("pc reads:"), "{stdout}");
    assert!(stdout.contains("is_halted writes:"), "{stdout}");
}

#[test]
fn missing_program_fails_with_open_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let missing = temp_dir.path().join("missing.com");

    let output = run_cli(&[missing.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.starts_with("cpmbench: cannot open file '"), "{stderr}");
    assert!(output.stdout.is_empty());
}

#[test]
fn empty_program_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let program = create_program(temp_dir.path(), "empty.com", &[]);

    let output = run_cli(&[program.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("is empty"), "{stderr}");
}

#[test]
fn oversized_program_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let program = create_program(temp_dir.path(), "big.com", &vec![0; 0xFF01]);

    let output = run_cli(&[program.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("is too large"), "{stderr}");
}

#[test]
fn usage_error_prints_usage_to_stderr() {
    let output = run_cli(&[]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("missing program path"), "{stderr}");
    assert!(stderr.contains("Usage: cpmbench"), "{stderr}");
}

#[test]
fn help_prints_usage_to_stdout() {
    let output = run_cli(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("Usage: cpmbench"));
}

#[test]
fn z80_flag_fails_with_unknown_engine() {
    let output = run_cli(&["-z", "p.com"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.starts_with("cpmbench: unknown engine 'z80'"), "{stderr}");
    assert!(output.stdout.is_empty());
}
