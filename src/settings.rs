//! Settings store for xircd
//!
//! This module provides the single structure holding every resolved
//! configuration value. It is created with defaults by the caller before
//! parsing, mutated only by the directive handlers during a parse pass, and
//! then consulted by logging and the rest of the daemon.
//!
//! The store is an explicit value threaded through the parser rather than
//! process-wide global state. Every string it holds is exclusively owned, so
//! replacing a value drops the previous one, and `release` consumes the store
//! so it cannot be released twice or used afterwards.

use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;

use crate::error::XircdResult;

/// Where log records should be written once logging starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDestination<'s> {
    /// Standard error (debug mode, or nothing configured)
    Stderr,
    /// The local syslog daemon
    Syslog,
    /// Append to the given file
    File(&'s Path),
}

/// A downstream client declared in a `client` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Client {
    /// Hostname of the client
    pub hostname: String,
    /// Port of the client
    pub port: u16,
    /// Optional password, never rendered in dumps
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

impl Client {
    /// Create a client with no password
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        Client {
            hostname: hostname.into(),
            port,
            password: None,
        }
    }

    /// Replace the password, dropping any previous value
    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = Some(password.into());
    }
}

/// Resolved daemon configuration
///
/// The configuration file path is borrowed from the caller that supplied it;
/// everything else is owned by the store.
#[derive(Debug, Serialize)]
pub struct Settings<'a> {
    /// Path to the configuration file
    config_path: &'a Path,

    /// Run in debugging mode
    debug: bool,

    /// Log to syslog instead of a file
    log_syslog: bool,

    /// Log file used when not logging to syslog
    #[serde(skip_serializing_if = "Option::is_none")]
    log_path: Option<PathBuf>,

    /// Default timeout
    timeout: u32,

    /// Interval between keepalives
    keepalive: u32,

    /// Every client committed from a `client` block, in file order
    clients: Vec<Client>,
}

impl<'a> Settings<'a> {
    /// Create a settings store with defaults
    ///
    /// All flags start false, numeric fields zero, the log path unset and the
    /// client list empty, so an empty configuration file still yields a fully
    /// defined store.
    ///
    /// # Arguments
    /// * `config_path` - Path of the configuration file, owned by the caller
    pub fn new(config_path: &'a Path) -> Self {
        Settings {
            config_path,
            debug: false,
            log_syslog: false,
            log_path: None,
            timeout: 0,
            keepalive: 0,
            clients: Vec::new(),
        }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &'a Path {
        self.config_path
    }

    /// Get the debug flag
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Set the debug flag
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Get whether syslog is selected
    pub fn log_syslog(&self) -> bool {
        self.log_syslog
    }

    /// Select or deselect syslog
    pub fn set_log_syslog(&mut self, log_syslog: bool) {
        self.log_syslog = log_syslog;
    }

    /// Get the configured log file, if any
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Store a log file path and make it the active destination
    ///
    /// The previous path, if any, is dropped.
    pub fn set_log_file(&mut self, path: impl Into<PathBuf>) {
        self.log_path = Some(path.into());
        self.log_syslog = false;
    }

    /// Get the default timeout
    pub fn timeout(&self) -> u32 {
        self.timeout
    }

    /// Set the default timeout
    pub fn set_timeout(&mut self, timeout: u32) {
        self.timeout = timeout;
    }

    /// Get the keepalive interval
    pub fn keepalive(&self) -> u32 {
        self.keepalive
    }

    /// Set the keepalive interval
    pub fn set_keepalive(&mut self, keepalive: u32) {
        self.keepalive = keepalive;
    }

    /// Get the committed clients
    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    /// Append a client built from a validated block
    pub fn add_client(&mut self, client: Client) {
        self.clients.push(client);
    }

    /// Resolve where logging should go
    ///
    /// Debug mode always logs to stderr. Otherwise syslog wins when selected,
    /// then the log file, and stderr is the fallback when neither is set.
    pub fn log_destination(&self) -> LogDestination<'_> {
        if self.debug {
            LogDestination::Stderr
        } else if self.log_syslog {
            LogDestination::Syslog
        } else {
            match self.log_path.as_deref() {
                Some(path) => LogDestination::File(path),
                None => LogDestination::Stderr,
            }
        }
    }

    /// Render the settings as TOML
    ///
    /// # Returns
    /// * `Ok(String)` with the rendered document
    /// * `Err` if a value cannot be represented (e.g. a non UTF-8 path)
    pub fn to_toml(&self) -> XircdResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Release everything the store owns
    ///
    /// Consumes the store, dropping the log path and every client. The
    /// configuration path is left alone since it belongs to the caller.
    ///
    /// # Returns
    /// * The number of clients that were released
    pub fn release(self) -> usize {
        let Settings {
            log_path, clients, ..
        } = self;

        let released = clients.len();
        drop(log_path);
        drop(clients);

        debug!("released settings ({released} clients)");
        released
    }
}
