//! Integration tests for the castplayer binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use crate::helpers::fixtures_dir;

/// Command with config and cache directories isolated in `home`.
fn castplayer(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("castplayer").expect("binary builds");
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_CACHE_HOME", home.path().join("cache"))
        .env("NO_COLOR", "1");
    cmd
}

// ============================================================================
// Help Output Tests
// ============================================================================

#[test]
fn help_lists_subcommands() {
    let home = TempDir::new().unwrap();
    castplayer(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("play"))
        .stdout(predicate::str::contains("info"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn play_help_shows_options() {
    let home = TempDir::new().unwrap();
    castplayer(&home)
        .args(["play", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--loop"))
        .stdout(predicate::str::contains("--size"))
        .stdout(predicate::str::contains("fit-width"))
        .stdout(predicate::str::contains("<FILE>"));
}

// ============================================================================
// Info
// ============================================================================

#[test]
fn info_describes_v3_recording() {
    let home = TempDir::new().unwrap();
    castplayer(&home)
        .arg("info")
        .arg(fixtures_dir().join("demo_v3.cast"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Version:  3"))
        .stdout(predicate::str::contains("Size:     80x24"))
        .stdout(predicate::str::contains("Markers:  2"))
        .stdout(predicate::str::contains("Title:    build demo"))
        .stdout(predicate::str::contains("Build started"));
}

#[test]
fn info_describes_v2_recording() {
    let home = TempDir::new().unwrap();
    castplayer(&home)
        .arg("info")
        .arg(fixtures_dir().join("demo_v2.cast"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Version:  2"))
        .stdout(predicate::str::contains("Size:     40x10"))
        .stdout(predicate::str::contains("Markers:  0"));
}

#[test]
fn info_rejects_malformed_recording() {
    let home = TempDir::new().unwrap();
    castplayer(&home)
        .arg("info")
        .arg(fixtures_dir().join("broken.cast"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

// ============================================================================
// Play argument handling
// ============================================================================

#[test]
fn play_missing_file_fails_before_touching_terminal() {
    let home = TempDir::new().unwrap();
    castplayer(&home)
        .args(["play", "does-not-exist.cast"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn play_rejects_unknown_size_policy() {
    let home = TempDir::new().unwrap();
    castplayer(&home)
        .arg("play")
        .arg(fixtures_dir().join("demo_v3.cast"))
        .args(["--size", "stretch"])
        .assert()
        .code(2);
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn config_path_uses_config_dir() {
    let home = TempDir::new().unwrap();
    let expected = home
        .path()
        .join("config")
        .join("castplayer")
        .join("config.toml");
    castplayer(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.display().to_string()));
}

#[test]
fn config_show_prints_defaults_without_file() {
    let home = TempDir::new().unwrap();
    castplayer(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[playback]"))
        .stdout(predicate::str::contains("loop = false"))
        .stdout(predicate::str::contains("grace_period_ms = 1000"));
}

#[test]
fn config_show_reflects_file() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("config").join("castplayer");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        "[playback]\nloop = true\nsize = \"fit-both\"\n",
    )
    .unwrap();

    castplayer(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("loop = true"))
        .stdout(predicate::str::contains("size = \"fit-both\""));
}

#[test]
fn invalid_config_is_reported() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("config").join("castplayer");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "[playback\n").unwrap();

    castplayer(&home)
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config"));
}
