//! End-to-end tests for the van-tutor binary.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{NamedTempFile, TempDir};

/// Command with an isolated config directory so a developer's own config
/// file never leaks into the test.
fn van_tutor(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("van-tutor").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let home = TempDir::new().unwrap();
    van_tutor(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("match"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_check_meaningful_query_succeeds() {
    let home = TempDir::new().unwrap();
    van_tutor(&home)
        .args(["check", "Đăm Săn"])
        .assert()
        .success()
        .stdout(predicate::str::contains("normalized: dam san"))
        .stdout(predicate::str::contains("meaningful: yes"));
}

#[test]
fn test_check_noise_query_fails() {
    let home = TempDir::new().unwrap();
    van_tutor(&home)
        .args(["check", "d a m"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("meaningful: no"));
}

#[test]
fn test_match_uses_builtin_curriculum() {
    let home = TempDir::new().unwrap();
    van_tutor(&home)
        .args(["match", "chu nguoi tu tu"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.00  Chữ người tử tù"))
        .stdout(predicate::str::contains("Best match: Chữ người tử tù"));
}

#[test]
fn test_match_reads_topics_file() {
    let home = TempDir::new().unwrap();
    let mut topics = NamedTempFile::new().unwrap();
    writeln!(topics, "# custom list").unwrap();
    writeln!(topics, "Bình Ngô đại cáo").unwrap();
    writeln!(topics, "Hịch tướng sĩ").unwrap();

    van_tutor(&home)
        .args(["match", "hich tuong si", "--topics-file"])
        .arg(topics.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Hịch tướng sĩ"))
        .stdout(predicate::str::contains("Bình Ngô").not());
}

#[test]
fn test_match_json_output() {
    let home = TempDir::new().unwrap();
    let output = van_tutor(&home)
        .args(["match", "tay tien", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["status"], "ranked");
    assert_eq!(value["best_match"]["topic"], "Tây Tiến");
}

#[test]
fn test_match_rejected_query_exits_nonzero() {
    let home = TempDir::new().unwrap();
    van_tutor(&home)
        .args(["match", "ab"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("not meaningful"));
}

#[test]
fn test_config_file_topics_file_is_used() {
    let home = TempDir::new().unwrap();
    let mut topics = NamedTempFile::new().unwrap();
    writeln!(topics, "Hịch tướng sĩ").unwrap();

    let config_dir = home.path().join("van-tutor");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        format!("topics_file = \"{}\"\n", topics.path().display()),
    )
    .unwrap();

    van_tutor(&home)
        .args(["match", "hich tuong si"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Best match: Hịch tướng sĩ"));
}

#[test]
fn test_invalid_config_file_is_reported() {
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join("van-tutor");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "window_max = 0\n").unwrap();

    van_tutor(&home)
        .args(["check", "dam san"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("window_max"));
}
