//! xircd - a lightweight IRC daemon
//!
//! This binary is the daemon's bootstrap: it reads the configuration file into
//! the settings store, reports every problem in the file in one pass, and
//! moves logging to its configured destination before handing over to the
//! rest of the daemon.
//!
//! # Program Flow
//!
//! 1. Parse command-line arguments
//! 2. Install the logger on stderr
//! 3. Create the settings store with defaults
//! 4. Read the configuration file, reporting each bad line
//! 5. Stop with a sysexits code if the file is unreadable or invalid
//! 6. Start logging to the configured destination
//! 7. Release the settings and stop logging on the way out

use std::process::ExitCode;

use anyhow::{Context, Result};
use log::{debug, error, info, warn};

use xircd::cli::{self, exit, XircdArgs};
use xircd::diagnostics::LogSink;
use xircd::error::XircdError;
use xircd::logging;
use xircd::parser;
use xircd::settings::Settings;

/// Main entry point for the xircd daemon
///
/// Handles the exits that happen before any setup (usage errors, help and
/// version output) and maps everything else through `run`.
fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(exit::USAGE)
            } else {
                ExitCode::from(exit::OK)
            };
        }
    };

    if args.version {
        println!("xircd version {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::from(exit::OK);
    }

    match run(&args) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("xircd: {err:#}");
            ExitCode::from(exit::SOFTWARE)
        }
    }
}

/// Bootstrap the daemon from parsed arguments
///
/// # Returns
/// * `Ok(code)` with the sysexits code to terminate with
/// * `Err` with context for failures that have no dedicated exit code
fn run(args: &XircdArgs) -> Result<u8> {
    let logger = logging::init(args.debug).context("Failed to initialize logging")?;

    let mut settings = Settings::new(&args.config);
    if args.debug {
        settings.set_debug(true);
    }

    // The sink has already reported an unreadable source
    let summary = match parser::read_config(&mut settings, &mut LogSink) {
        Ok(summary) => summary,
        Err(XircdError::SourceUnreadable { .. }) => return Ok(exit::NOINPUT),
        Err(err) => return Err(err).context("Failed to read configuration"),
    };

    if !summary.valid {
        error!(
            "{}: {} error(s) found, not starting",
            args.config.display(),
            summary.errors
        );
        return Ok(exit::CONFIG);
    }

    debug!(
        "{}: configuration loaded ({} lines)",
        args.config.display(),
        summary.lines
    );

    if args.dump {
        print!(
            "{}",
            settings.to_toml().context("Failed to render settings")?
        );
        settings.release();
        return Ok(exit::OK);
    }

    if let Err(err) = logger.start(&settings) {
        error!("{err}");
        return Ok(exit::CANTCREAT);
    }

    info!("xircd {} starting.", env!("CARGO_PKG_VERSION"));
    debug!(
        "timeout {}, keepalive {}, {} client(s)",
        settings.timeout(),
        settings.keepalive(),
        settings.clients().len()
    );

    info!("shutting down.");
    settings.release();
    if let Err(err) = logger.end() {
        warn!("{err}");
    }

    Ok(exit::OK)
}
