//! Logging for the xircd daemon
//!
//! The global logger is installed once, before the configuration is read, so
//! parse diagnostics go to stderr. Once the settings are known,
//! `LogHandle::start` swaps the destination to the configured log file or
//! to syslog without reinstalling the logger.
//!
//! Records written to stderr or a file look like
//! `<timestamp> [<pid>]: xircd: <message>`; syslog records carry the usual
//! `<priority>xircd[<pid>]: ` prefix with the daemon facility.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
#[cfg(unix)]
use std::os::unix::net::UnixDatagram;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{info, warn, Level, LevelFilter};

use crate::error::{XircdError, XircdResult};
use crate::settings::{LogDestination, Settings};

/// Program name used in every record
const IDENT: &str = "xircd";

/// Local syslog socket
#[cfg(unix)]
pub const SYSLOG_SOCKET: &str = "/dev/log";

/// syslog facility LOG_DAEMON, already shifted
const FACILITY_DAEMON: u8 = 3 << 3;

/// The syslog priority for a record of the given level
pub fn syslog_priority(level: Level) -> u8 {
    let severity = match level {
        Level::Error => 3,
        Level::Warn => 4,
        Level::Info => 6,
        Level::Debug | Level::Trace => 7,
    };
    FACILITY_DAEMON | severity
}

/// Write one formatted record
///
/// Syslog records are a single datagram each, so they carry no newline.
fn format_record<W: Write>(
    out: &mut W,
    syslog: bool,
    level: Level,
    timestamp: &dyn fmt::Display,
    pid: u32,
    message: &fmt::Arguments<'_>,
) -> io::Result<()> {
    if syslog {
        write!(
            out,
            "<{}>{}[{}]: {}",
            syslog_priority(level),
            IDENT,
            pid,
            message
        )
    } else {
        writeln!(out, "{} [{}]: {}: {}", timestamp, pid, IDENT, message)
    }
}

enum Destination {
    Stderr,
    File(File),
    #[cfg(unix)]
    Syslog(UnixDatagram),
}

/// Where formatted records currently go
///
/// Shared between the installed logger's writer and the `LogHandle`.
struct LogRouter {
    destination: Mutex<Destination>,
}

impl LogRouter {
    fn new() -> Self {
        LogRouter {
            destination: Mutex::new(Destination::Stderr),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Destination> {
        self.destination
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_syslog(&self) -> bool {
        match *self.lock() {
            #[cfg(unix)]
            Destination::Syslog(_) => true,
            _ => false,
        }
    }

    /// Install a new destination and flush the one it replaces
    ///
    /// The new destination is in place even when the flush fails.
    fn switch(&self, destination: Destination) -> io::Result<()> {
        let previous = std::mem::replace(&mut *self.lock(), destination);
        match previous {
            Destination::File(mut file) => file.flush(),
            _ => Ok(()),
        }
    }

    fn write_record(&self, buf: &[u8]) -> io::Result<usize> {
        match &mut *self.lock() {
            Destination::Stderr => io::stderr().write_all(buf)?,
            Destination::File(file) => file.write_all(buf)?,
            #[cfg(unix)]
            Destination::Syslog(socket) => {
                let record = buf.strip_suffix(b"\n").unwrap_or(buf);
                socket.send(record)?;
            }
        }
        Ok(buf.len())
    }

    fn flush(&self) -> io::Result<()> {
        match &mut *self.lock() {
            Destination::Stderr => io::stderr().flush(),
            Destination::File(file) => file.flush(),
            #[cfg(unix)]
            Destination::Syslog(_) => Ok(()),
        }
    }
}

struct RouterWriter(Arc<LogRouter>);

impl Write for RouterWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write_record(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

/// Handle on the installed logger
pub struct LogHandle {
    router: Arc<LogRouter>,
    /// `RUST_LOG` was set and owns the level filter
    env_filter: bool,
}

/// Install the global logger, writing to stderr
///
/// Without `RUST_LOG`, debug records are shown only when `debug` is set.
/// When `RUST_LOG` is present it decides the level on its own, and the
/// debug flag no longer changes it.
///
/// # Returns
/// * `Ok(LogHandle)` used to redirect and end logging
/// * `Err(XircdError::Logger)` if a logger was already installed
pub fn init(debug: bool) -> XircdResult<LogHandle> {
    let router = Arc::new(LogRouter::new());
    let format_router = Arc::clone(&router);
    let pid = std::process::id();
    let env_filter = std::env::var_os(env_logger::DEFAULT_FILTER_ENV).is_some();

    env_logger::Builder::new()
        .filter_level(LevelFilter::Debug)
        .parse_default_env()
        .format(move |buf, record| {
            let timestamp = buf.timestamp_seconds();
            format_record(
                buf,
                format_router.is_syslog(),
                record.level(),
                &timestamp,
                pid,
                record.args(),
            )
        })
        .target(env_logger::Target::Pipe(Box::new(RouterWriter(Arc::clone(
            &router,
        )))))
        .try_init()?;

    let handle = LogHandle { router, env_filter };
    handle.apply_level(debug);
    Ok(handle)
}

/// The level cap for the debug flag, or `None` when `RUST_LOG` decides
fn max_level(debug: bool, env_filter: bool) -> Option<LevelFilter> {
    match (env_filter, debug) {
        (true, _) => None,
        (false, true) => Some(LevelFilter::Debug),
        (false, false) => Some(LevelFilter::Info),
    }
}

impl LogHandle {
    fn apply_level(&self, debug: bool) {
        if let Some(level) = max_level(debug, self.env_filter) {
            log::set_max_level(level);
        }
    }

    /// Redirect logging to the destination the settings select
    ///
    /// # Arguments
    /// * `settings` - The parsed configuration
    ///
    /// # Returns
    /// * `Ok(())` once records go to the new destination
    /// * `Err(XircdError::LogFileUnavailable)` if the log file cannot be opened;
    ///   logging stays on stderr
    /// * `Err(XircdError::LogFlush)` if the previous destination failed to flush
    pub fn start(&self, settings: &Settings<'_>) -> XircdResult<()> {
        self.apply_level(settings.debug());

        match settings.log_destination() {
            LogDestination::Stderr => self.switch(Destination::Stderr),
            LogDestination::File(path) => {
                let file = open_log_file(path).map_err(|source| {
                    XircdError::LogFileUnavailable {
                        path: path.to_path_buf(),
                        source,
                    }
                })?;
                self.switch(Destination::File(file))
            }
            LogDestination::Syslog => self.start_syslog(),
        }
    }

    #[cfg(unix)]
    fn start_syslog(&self) -> XircdResult<()> {
        self.start_syslog_at(Path::new(SYSLOG_SOCKET))
    }

    #[cfg(not(unix))]
    fn start_syslog(&self) -> XircdResult<()> {
        warn!("syslog is not available on this platform; using stderr");
        self.switch(Destination::Stderr)
    }

    /// Send records to the syslog socket at `socket_path`
    ///
    /// Falls back to stderr with a warning if the socket cannot be reached.
    #[cfg(unix)]
    pub fn start_syslog_at(&self, socket_path: &Path) -> XircdResult<()> {
        let connected = UnixDatagram::unbound().and_then(|socket| {
            socket.connect(socket_path)?;
            Ok(socket)
        });
        match connected {
            Ok(socket) => self.switch(Destination::Syslog(socket)),
            Err(err) => {
                warn!(
                    "unable to connect to syslog at {}: {}; using stderr",
                    socket_path.display(),
                    err
                );
                self.switch(Destination::Stderr)
            }
        }
    }

    /// True while records are sent to syslog
    pub fn is_syslog(&self) -> bool {
        self.router.is_syslog()
    }

    /// Flush and close the configured destination, reverting to stderr
    ///
    /// # Returns
    /// * `Err(XircdError::LogFlush)` if the closed destination failed to flush;
    ///   records go to stderr either way
    pub fn end(&self) -> XircdResult<()> {
        info!("logging stopped");
        self.switch(Destination::Stderr)
    }

    fn switch(&self, destination: Destination) -> XircdResult<()> {
        self.router
            .switch(destination)
            .map_err(|source| XircdError::LogFlush { source })
    }
}

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
