//! CLI argument parsing module for xircd
//!
//! This module handles parsing command-line arguments using the clap crate.
//! It defines the daemon's command-line interface and the sysexits-style
//! exit codes the binary reports.
//!
//! Key features of the CLI:
//! - Selection of the configuration file with `-c`
//! - Forced debug mode with `-d`, which also keeps the daemon in the foreground
//! - Version output with `-v`
//! - A `--dump` mode that prints the resolved settings and exits

use std::path::PathBuf;

use clap::Parser;

/// Configuration file used when `-c` is not given
pub const DEFAULT_CONFIG_PATH: &str = "xircd.conf";

/// Exit codes, following sysexits(3)
pub mod exit {
    /// Successful termination
    pub const OK: u8 = 0;
    /// Command line usage error
    pub const USAGE: u8 = 64;
    /// Configuration file missing or unreadable
    pub const NOINPUT: u8 = 66;
    /// Internal software error
    pub const SOFTWARE: u8 = 70;
    /// Log destination could not be created
    pub const CANTCREAT: u8 = 73;
    /// Configuration file has errors
    pub const CONFIG: u8 = 78;
}

/// Command-line arguments for xircd
#[derive(Parser, Debug)]
#[clap(
    name = "xircd",
    about = "Lightweight IRC daemon",
    disable_version_flag = true
)]
pub struct XircdArgs {
    /// Path to the configuration file
    ///
    /// The file is read once at startup. Every problem found in it is
    /// reported with its line number before the daemon gives up.
    #[clap(
        short,
        long,
        value_name = "FILE",
        default_value = DEFAULT_CONFIG_PATH,
        help = "Configuration file to read"
    )]
    pub config: PathBuf,

    /// Run in debugging mode
    ///
    /// Same as a `debug` line in the configuration file: debug records are
    /// logged and all output goes to stderr.
    #[clap(short, long, help = "Run in debugging mode")]
    pub debug: bool,

    /// Print the version and exit
    #[clap(short = 'v', long, help = "Print version information and exit")]
    pub version: bool,

    /// Print the resolved settings as TOML and exit
    ///
    /// Useful for checking how a configuration file was understood. Client
    /// passwords are never printed.
    #[clap(long, help = "Print the resolved settings and exit")]
    pub dump: bool,
}

/// Parse command-line arguments into the XircdArgs structure
///
/// # Returns
/// * `Ok(XircdArgs)` - Command-line arguments successfully parsed
/// * `Err(clap::Error)` - Usage error, or a help request; the caller prints it
pub fn parse_args() -> Result<XircdArgs, clap::Error> {
    XircdArgs::try_parse()
}
