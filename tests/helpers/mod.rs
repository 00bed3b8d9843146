//! Test helpers for xircd integration tests
//!
//! This module provides helper functions to write configuration files into
//! temporary directories and to run parse passes over them.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use tempfile::TempDir;

use xircd::diagnostics::CollectingSink;
use xircd::parser::{read_from, ParseSummary};
use xircd::settings::Settings;

/// Path used in diagnostics for in-memory parses
pub const TEST_CONFIG: &str = "test.conf";

/// Parse configuration text held in memory
///
/// # Returns
/// * The populated settings, the pass summary, and every diagnostic reported
pub fn parse_str(text: &str) -> (Settings<'static>, ParseSummary, CollectingSink) {
    let mut settings = Settings::new(Path::new(TEST_CONFIG));
    let mut sink = CollectingSink::new();
    let summary = read_from(text.as_bytes(), &mut settings, &mut sink)
        .expect("in-memory sources are always readable");
    (settings, summary, sink)
}

/// Helper function to create a temp directory for tests, respecting CARGO_TARGET_TMPDIR if set
pub fn create_temp_dir() -> Result<TempDir, Box<dyn std::error::Error>> {
    if let Ok(cargo_target_tmpdir) = env::var("CARGO_TARGET_TMPDIR") {
        fs::create_dir_all(&cargo_target_tmpdir)?;
        Ok(TempDir::new_in(cargo_target_tmpdir)?)
    } else {
        Ok(TempDir::new()?)
    }
}

/// Helper function to write a configuration file with the given content
pub fn write_config(
    dir: &Path,
    filename: &str,
    content: &str,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Build an xircd command reading the given configuration file
///
/// `RUST_LOG` is cleared so the test environment cannot change what is logged.
pub fn xircd_cmd(config: &Path) -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("xircd")?;
    cmd.env_remove("RUST_LOG").arg("-c").arg(config);
    Ok(cmd)
}
