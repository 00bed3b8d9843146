//! Diagnostics reporting for configuration parsing
//!
//! The dispatch loop never aborts on a bad line; it reports the problem
//! through a `DiagnosticSink` and keeps going, so a single pass surfaces
//! every defect in the file. The sink is the seam between the parser and
//! logging:
//!
//! - `LogSink` forwards every diagnostic to the `log` facade
//! - `CollectingSink` keeps them in memory for callers that want to inspect them

use std::fmt;
use std::path::{Path, PathBuf};

use log::Level;

use crate::error::{ArityKind, XircdError};

/// The category of problem a diagnostic describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    SourceUnreadable,
    UnknownKeyword,
    ArityMismatch(ArityKind),
    ValueInvalid,
    UnterminatedBlock,
    UnbalancedBlock,
    Other,
}

impl From<&XircdError> for DiagnosticKind {
    fn from(err: &XircdError) -> Self {
        match err {
            XircdError::SourceUnreadable { .. } => DiagnosticKind::SourceUnreadable,
            XircdError::UnknownKeyword { .. } => DiagnosticKind::UnknownKeyword,
            XircdError::ArityMismatch { kind, .. } => DiagnosticKind::ArityMismatch(*kind),
            XircdError::ValueInvalid { .. } => DiagnosticKind::ValueInvalid,
            XircdError::UnterminatedBlock { .. } => DiagnosticKind::UnterminatedBlock,
            XircdError::UnbalancedBlock { .. } => DiagnosticKind::UnbalancedBlock,
            XircdError::LogFileUnavailable { .. }
            | XircdError::LogFlush { .. }
            | XircdError::Pattern(_)
            | XircdError::Logger(_)
            | XircdError::Dump(_) => DiagnosticKind::Other,
        }
    }
}

/// One detected problem, with file and line context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity passed on to the logger
    pub severity: Level,
    /// Configuration file the problem was found in
    pub path: PathBuf,
    /// 1-based line number; `None` for problems with the file as a whole
    pub line: Option<usize>,
    /// Category of the problem
    pub kind: DiagnosticKind,
    /// Human-readable description naming the offending keyword or value
    pub message: String,
}

impl Diagnostic {
    /// Build an error-level diagnostic for a problem on a given line
    pub fn at_line(path: &Path, line: usize, err: &XircdError) -> Self {
        Diagnostic {
            severity: Level::Error,
            path: path.to_path_buf(),
            line: Some(line),
            kind: DiagnosticKind::from(err),
            message: err.to_string(),
        }
    }

    /// Build an error-level diagnostic for the file as a whole
    pub fn for_file(path: &Path, err: &XircdError) -> Self {
        Diagnostic {
            severity: Level::Error,
            path: path.to_path_buf(),
            line: None,
            kind: DiagnosticKind::from(err),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}: {}", self.path.display(), line, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Receives diagnostics as the parser detects them
pub trait DiagnosticSink {
    /// Report a single problem
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `log` facade at their own severity
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        log::log!(diagnostic.severity, "{}", diagnostic);
    }
}

/// Retains diagnostics in the order they were reported
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    diagnostics: Vec<Diagnostic>,
}

impl CollectingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the diagnostics reported so far
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of diagnostics reported so far
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// True if nothing has been reported
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Line numbers of every line-level diagnostic, in report order
    pub fn lines(&self) -> Vec<usize> {
        self.diagnostics.iter().filter_map(|d| d.line).collect()
    }

    /// Take ownership of the collected diagnostics
    pub fn into_inner(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
