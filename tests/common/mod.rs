//! Shared test helpers for integration tests
//!
//! Every command runs with a temporary home directory so that the
//! developer's own configuration never leaks into a test.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo;
use assert_cmd::Command;
use tempfile::TempDir;

/// Helper to create an empty home directory
pub fn setup_home() -> TempDir {
    TempDir::new().unwrap()
}

/// Helper to get a tp command running in `home`
pub fn tp(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("tp"));
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("TP_CONFIG")
        .env_remove("TP_LOG")
        .env_remove("PAGER");
    cmd
}

/// Helper to write the user configuration file, returning its path
pub fn write_user_config(home: &TempDir, text: &str) -> PathBuf {
    let dir = home.path().join(".config").join("tp");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("tp.conf");
    fs::write(&path, text).unwrap();
    path
}

/// Helper to write a configuration file outside the searched locations
pub fn write_extra_config(home: &TempDir, text: &str) -> PathBuf {
    let path = home.path().join("extra.conf");
    fs::write(&path, text).unwrap();
    path
}
