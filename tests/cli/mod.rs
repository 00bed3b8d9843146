//! End-to-end tests for the xircd binary

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;

use crate::helpers::{create_temp_dir, write_config, xircd_cmd};

#[test]
fn test_valid_config_starts() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = create_temp_dir()?;
    let config = write_config(temp_dir.path(), "xircd.conf", "timeout 30\n")?;

    xircd_cmd(&config)?
        .assert()
        .success()
        .stderr(predicate::str::contains("xircd: xircd 0.1.0 starting."));

    Ok(())
}

#[test]
fn test_invalid_config_reports_every_line() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = create_temp_dir()?;
    let config = write_config(
        temp_dir.path(),
        "bad.conf",
        "debug\nbogus\ntimeout\ntimeout abc\nkeepalive 5\n",
    )?;
    let shown = config.display().to_string();

    xircd_cmd(&config)?
        .assert()
        .code(78)
        .stderr(predicate::str::contains(format!(
            "{}:2: unknown or invalid keyword 'bogus'",
            shown
        )))
        .stderr(predicate::str::contains(format!(
            "{}:3: insufficient arguments to keyword 'timeout'",
            shown
        )))
        .stderr(predicate::str::contains(format!(
            "{}:4: invalid value 'abc' for keyword 'timeout'",
            shown
        )))
        .stderr(predicate::str::contains("3 error(s) found, not starting"))
        .stderr(predicate::str::contains("starting.").not());

    Ok(())
}

#[test]
fn test_missing_config_is_noinput() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = create_temp_dir()?;
    let config = temp_dir.path().join("absent.conf");

    xircd_cmd(&config)?
        .assert()
        .code(66)
        .stderr(predicate::str::contains("unable to read config file"));

    Ok(())
}

#[test]
fn test_log_file_destination() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = create_temp_dir()?;
    let log_path = temp_dir.path().join("xircd.log");
    let config = write_config(
        temp_dir.path(),
        "xircd.conf",
        &format!("log-file \"{}\"\n", log_path.display()),
    )?;

    xircd_cmd(&config)?.assert().success();

    let contents = fs::read_to_string(&log_path)?;
    assert!(contents.contains("xircd: xircd 0.1.0 starting."));
    Ok(())
}

#[test]
fn test_unopenable_log_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = create_temp_dir()?;
    let log_path = temp_dir.path().join("missing-dir").join("xircd.log");
    let config = write_config(
        temp_dir.path(),
        "xircd.conf",
        &format!("log-file \"{}\"\n", log_path.display()),
    )?;

    xircd_cmd(&config)?
        .assert()
        .code(73)
        .stderr(predicate::str::contains("unable to open logpath"));

    Ok(())
}

#[test]
fn test_debug_flag_logs_to_stderr() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = create_temp_dir()?;
    let log_path = temp_dir.path().join("xircd.log");
    let config = write_config(
        temp_dir.path(),
        "xircd.conf",
        &format!("log-file \"{}\"\nkeepalive 60\n", log_path.display()),
    )?;

    xircd_cmd(&config)?
        .arg("-d")
        .assert()
        .success()
        .stderr(predicate::str::contains("keepalive 60"))
        .stderr(predicate::str::contains("starting."));

    assert!(!log_path.exists());
    Ok(())
}

#[test]
fn test_syslog_without_socket_falls_back() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = create_temp_dir()?;
    let config = write_config(temp_dir.path(), "xircd.conf", "log-syslog\n")?;

    let assert = xircd_cmd(&config)?.assert().success();

    // Only a host without a syslog daemon exercises the fallback
    if !Path::new("/dev/log").exists() {
        assert
            .stderr(predicate::str::contains(
                "unable to connect to syslog at /dev/log",
            ))
            .stderr(predicate::str::contains("starting."));
    }

    Ok(())
}

#[test]
fn test_rust_log_overrides_level() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = create_temp_dir()?;
    let config = write_config(temp_dir.path(), "xircd.conf", "keepalive 60\n")?;

    // Without -d or RUST_LOG the debug summary is hidden
    xircd_cmd(&config)?
        .assert()
        .success()
        .stderr(predicate::str::contains("keepalive 60").not());

    xircd_cmd(&config)?
        .env("RUST_LOG", "debug")
        .assert()
        .success()
        .stderr(predicate::str::contains("configuration loaded"))
        .stderr(predicate::str::contains("keepalive 60"));

    Ok(())
}

#[test]
fn test_dump_prints_settings() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = create_temp_dir()?;
    let config = write_config(
        temp_dir.path(),
        "xircd.conf",
        "timeout 30\nclient irc.example.net 6667\npassword hunter2\nendclient\n",
    )?;

    xircd_cmd(&config)?
        .arg("--dump")
        .assert()
        .success()
        .stdout(predicate::str::contains("timeout = 30"))
        .stdout(predicate::str::contains("hostname = \"irc.example.net\""))
        .stdout(predicate::str::contains("hunter2").not());

    Ok(())
}

#[test]
fn test_version_flag() -> Result<(), Box<dyn std::error::Error>> {
    Command::cargo_bin("xircd")?
        .arg("-v")
        .assert()
        .success()
        .stdout(predicate::str::contains("xircd version 0.1.0"));

    Ok(())
}

#[test]
fn test_unknown_option_is_usage_error() -> Result<(), Box<dyn std::error::Error>> {
    Command::cargo_bin("xircd")?
        .arg("--no-such-option")
        .assert()
        .code(64);

    Ok(())
}
