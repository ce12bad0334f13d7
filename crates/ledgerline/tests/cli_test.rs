//! Tests for the `ledgerline-report` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn report(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ledgerline-report"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run ledgerline-report")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn setup() -> TempDir {
    let dir = TempDir::new().unwrap();
    let ledgers = dir.path().join("ledgers");
    fs::create_dir_all(&ledgers).unwrap();
    fs::write(ledgers.join("a.csv"), "2023-01-01,Cash,,100,0\n").unwrap();
    fs::write(ledgers.join("b.csv"), "2023-06-01,Cash,,0,40\n").unwrap();
    dir
}

#[test]
fn test_all_reports() {
    let dir = setup();
    let ledgers = dir.path().join("ledgers");
    let out = dir.path().join("out");

    let output = report(&[
        "--ledger-dir",
        path_arg(&ledgers),
        "--output-dir",
        path_arg(&out),
        "all",
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("accounts: finished in "));
    assert!(lines[1].starts_with("yearly: finished in "));
    assert!(lines[2].starts_with("fs: finished in "));

    assert_eq!(
        fs::read_to_string(out.join("yearly.csv")).unwrap(),
        "Financial Year,Cash Balance\n2023,60.00\n"
    );
    assert_eq!(
        fs::read_to_string(out.join("accounts.csv")).unwrap(),
        "Account,Balance\nCash,60.00\n"
    );
    assert!(out.join("fs.csv").exists());
}

#[test]
fn test_sequential_flag() {
    let dir = setup();
    let out = dir.path().join("out");

    let output = report(&[
        "yearly",
        "--sequential",
        "--ledger-dir",
        path_arg(&dir.path().join("ledgers")),
        "--output-dir",
        path_arg(&out),
    ]);
    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(out.join("yearly.csv")).unwrap(),
        "Financial Year,Cash Balance\n2023,60.00\n"
    );
}

#[test]
fn test_config_file() {
    let dir = setup();
    let config = dir.path().join("ledgerline.json");
    let out = dir.path().join("from-config");
    fs::write(
        &config,
        format!(
            r#"{{"ledger_dir": {:?}, "output_dir": {:?}, "workers": 2}}"#,
            path_arg(&dir.path().join("ledgers")),
            path_arg(&out),
        ),
    )
    .unwrap();

    let output = report(&["--config", path_arg(&config), "accounts"]);
    assert!(output.status.success());
    assert!(out.join("accounts.csv").exists());
}

#[test]
fn test_missing_ledger_dir_fails() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");

    let output = report(&[
        "--ledger-dir",
        path_arg(&dir.path().join("missing")),
        "--output-dir",
        path_arg(&out),
        "statement",
    ]);
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("fs: failed: "));
    assert!(!out.join("fs.csv").exists());
}

#[test]
fn test_bad_config_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("bad.json");
    fs::write(&config, r#"{"workerz": 2}"#).unwrap();

    let output = report(&["--config", path_arg(&config), "accounts"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load config"));
}
