//! xircd library crate
//!
//! This is the library component of xircd, containing the configuration
//! interpreter the daemon runs before entering its main loop. The library
//! provides:
//!
//! - A settings store created with defaults and populated from a config file
//! - A keyword-dispatch parser with exact arity checks and case-insensitive keywords
//! - Scope tables and a scope stack for block-structured directives (`client` ... `endclient`)
//! - Typed value handlers that never confuse a parsed zero with a parse failure
//! - Per-line diagnostics with file and line context, reported without stopping the pass
//! - Logging that starts on stderr and moves to a log file or syslog once configured
//!
//! A typical bootstrap looks like:
//!
//! ```no_run
//! use std::path::Path;
//! use xircd::diagnostics::LogSink;
//! use xircd::parser::read_config;
//! use xircd::settings::Settings;
//!
//! let mut settings = Settings::new(Path::new("/etc/xircd.conf"));
//! let summary = read_config(&mut settings, &mut LogSink)?;
//! if summary.valid {
//!     println!("timeout is {}", settings.timeout());
//! }
//! settings.release();
//! # Ok::<(), xircd::error::XircdError>(())
//! ```

pub mod cli;
pub mod diagnostics;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod parser;
pub mod scope;
pub mod settings;
pub mod tokenizer;
