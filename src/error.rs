//! Error handling for xircd
//!
//! This module defines the error types for the configuration interpreter and
//! the daemon bootstrap around it. Every failure is carried as a value: the
//! dispatch loop turns the per-line variants into diagnostics and keeps
//! scanning, while `SourceUnreadable` aborts the read outright.
//!
//! The module uses thiserror to minimize boilerplate code and keep the
//! user-facing wording in one place.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::scope::ScopeKind;

/// XircdError represents all possible errors that can occur while bootstrapping xircd
///
/// The variants fall into three groups:
/// - Fatal source errors (the configuration file cannot be read at all)
/// - Per-line errors (unknown keyword, wrong arity, bad value, block structure)
/// - Startup errors outside the parser (logging destination, settings dump)
#[derive(Error, Debug)]
pub enum XircdError {
    /// The configuration source could not be opened or read
    #[error("unable to read config file '{}': {source}", .path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The first token of a line matches no keyword of the active scope
    #[error("unknown or invalid keyword '{keyword}'{}", scope_hint(.valid_in))]
    UnknownKeyword {
        keyword: String,
        /// Another scope in which the keyword would have been legal
        valid_in: Option<ScopeKind>,
    },

    /// A known keyword was given the wrong number of tokens
    #[error("{kind} to keyword '{keyword}'")]
    ArityMismatch {
        keyword: &'static str,
        kind: ArityKind,
    },

    /// A handler could not coerce its argument
    #[error("invalid value '{value}' for keyword '{keyword}': {reason}")]
    ValueInvalid {
        keyword: &'static str,
        value: String,
        reason: ValueError,
    },

    /// A block was still open when the input ended
    #[error("block '{keyword}' opened at line {opened_at} is never closed")]
    UnterminatedBlock {
        keyword: &'static str,
        opened_at: usize,
    },

    /// A block terminator was dispatched with no block open
    #[error("'{keyword}' without a matching block")]
    UnbalancedBlock { keyword: &'static str },

    /// The configured log file could not be opened for appending
    #[error("unable to open logpath '{}': {source}", .path.display())]
    LogFileUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The previous log destination could not be flushed when switching away
    #[error("unable to flush log destination: {source}")]
    LogFlush {
        #[source]
        source: io::Error,
    },

    /// The token pattern failed to compile
    #[error("invalid token pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The global logger was already installed
    #[error("logger already initialized: {0}")]
    Logger(#[from] log::SetLoggerError),

    /// The settings could not be rendered as TOML
    #[error("unable to render settings: {0}")]
    Dump(#[from] toml::ser::Error),
}

/// Which side of the exact arity a directive missed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArityKind {
    /// Fewer tokens than the keyword requires
    TooFew,
    /// More tokens than the keyword requires
    TooMany,
}

impl fmt::Display for ArityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArityKind::TooFew => write!(f, "insufficient arguments"),
            ArityKind::TooMany => write!(f, "extra argument(s)"),
        }
    }
}

/// Reasons a textual value failed numeric coercion
///
/// A successfully parsed zero is never represented here, so a value of `0`
/// and a parse failure cannot be confused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("empty value")]
    Empty,

    #[error("not a base-10 unsigned integer")]
    NotANumber,

    #[error("negative values are not allowed")]
    Negative,

    #[error("out of range for a {bits}-bit unsigned value")]
    Overflow { bits: u32 },
}

fn scope_hint(valid_in: &Option<ScopeKind>) -> String {
    match valid_in {
        Some(ScopeKind::Root) => " (only valid at top level)".to_string(),
        Some(kind) => format!(" (only valid inside a '{}' block)", kind.name()),
        None => String::new(),
    }
}

/// Result type alias for operations that can produce an XircdError
pub type XircdResult<T> = std::result::Result<T, XircdError>;
