//! Configuration file parser for xircd
//!
//! This module implements the dispatch loop: it reads the configuration
//! source line by line, tokenizes each line, resolves the keyword against the
//! active scope table, checks the exact arity, and applies the bound
//! directive to the settings store.
//!
//! A bad line never stops the pass. Unknown keywords, arity mismatches and
//! invalid values are reported through the `DiagnosticSink` with file and
//! line context, the file is marked invalid, and scanning continues so every
//! defect is reported in one run. Only an unreadable source aborts the read.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::{XircdError, XircdResult};
use crate::handlers;
use crate::scope::{ScopeKind, ScopeStack};
use crate::settings::Settings;
use crate::tokenizer::{line_text, Tokenizer};

/// Outcome of a completed parse pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseSummary {
    /// True if no line produced a diagnostic
    pub valid: bool,
    /// Number of lines read, including blank and comment lines
    pub lines: usize,
    /// Number of diagnostics reported
    pub errors: usize,
}

/// Read the configuration file named by the settings store
///
/// Opens `settings.config_path()` and runs a full pass over it.
///
/// # Arguments
/// * `settings` - Store to populate; should hold defaults
/// * `sink` - Receives one diagnostic per detected problem
///
/// # Returns
/// * `Ok(ParseSummary)` once the whole file has been scanned; check `valid`
/// * `Err(XircdError::SourceUnreadable)` if the file cannot be opened or read,
///   after reporting it to the sink
pub fn read_config(
    settings: &mut Settings<'_>,
    sink: &mut dyn DiagnosticSink,
) -> XircdResult<ParseSummary> {
    let path = settings.config_path();

    let file = match File::open(path) {
        Ok(file) => file,
        Err(source) => {
            let err = XircdError::SourceUnreadable {
                path: path.to_path_buf(),
                source,
            };
            sink.report(Diagnostic::for_file(path, &err));
            return Err(err);
        }
    };

    read_from(BufReader::new(file), settings, sink)
}

/// Run a parse pass over any buffered source
///
/// Diagnostics name `settings.config_path()` as the file.
///
/// # Arguments
/// * `reader` - The configuration text
/// * `settings` - Store to populate
/// * `sink` - Receives one diagnostic per detected problem
///
/// Lines are read as raw bytes. Text that is not valid UTF-8 is not a read
/// failure: inside a comment it is ignored, elsewhere it shows up as a bad
/// keyword or value on its own line.
///
/// # Returns
/// * `Ok(ParseSummary)` once the source is exhausted
/// * `Err(XircdError::SourceUnreadable)` if the reader itself fails
pub fn read_from<R: BufRead>(
    mut reader: R,
    settings: &mut Settings<'_>,
    sink: &mut dyn DiagnosticSink,
) -> XircdResult<ParseSummary> {
    let path = settings.config_path();
    let mut pass = ParsePass::new(path, settings, sink)?;
    let mut raw = Vec::new();

    loop {
        raw.clear();
        match reader.read_until(b'\n', &mut raw) {
            Ok(0) => break,
            Ok(_) => pass.dispatch_line(&raw),
            Err(source) => {
                let err = XircdError::SourceUnreadable {
                    path: path.to_path_buf(),
                    source,
                };
                pass.sink.report(Diagnostic::for_file(path, &err));
                return Err(err);
            }
        }
    }

    Ok(pass.finish())
}

/// State of one parse pass; discarded when the pass ends
struct ParsePass<'p, 's, 'a> {
    path: &'p Path,
    settings: &'s mut Settings<'a>,
    sink: &'s mut dyn DiagnosticSink,
    tokenizer: Tokenizer,
    scopes: ScopeStack,
    line: usize,
    valid: bool,
    errors: usize,
}

impl<'p, 's, 'a> ParsePass<'p, 's, 'a> {
    fn new(
        path: &'p Path,
        settings: &'s mut Settings<'a>,
        sink: &'s mut dyn DiagnosticSink,
    ) -> XircdResult<Self> {
        Ok(ParsePass {
            path,
            settings,
            sink,
            tokenizer: Tokenizer::new()?,
            scopes: ScopeStack::new(),
            line: 0,
            valid: true,
            errors: 0,
        })
    }

    /// Handle one raw line; never fails, problems become diagnostics
    fn dispatch_line(&mut self, raw: &[u8]) {
        self.line += 1;

        let tokens = self.tokenizer.tokenize(&line_text(raw));
        // An empty quoted keyword counts as a blank line
        if tokens.first().map_or(true, |keyword| keyword.is_empty()) {
            return;
        }

        if let Err(err) = self.dispatch(&tokens) {
            self.fail(self.line, &err);
        }
    }

    fn dispatch(&mut self, tokens: &[String]) -> XircdResult<()> {
        let table = self.scopes.current();
        let def = table
            .lookup(&tokens[0])
            .ok_or_else(|| XircdError::UnknownKeyword {
                keyword: tokens[0].clone(),
                valid_in: ScopeKind::home_of(&tokens[0], table.kind()),
            })?;

        def.check_arity(tokens.len())?;

        handlers::apply(def, tokens, self.line, self.settings, &mut self.scopes)
    }

    fn fail(&mut self, line: usize, err: &XircdError) {
        self.valid = false;
        self.errors += 1;
        self.scopes.poison();
        self.sink.report(Diagnostic::at_line(self.path, line, err));
    }

    /// Close out the pass, reporting and discarding any block left open
    fn finish(mut self) -> ParseSummary {
        while let Some(block) = self.scopes.pop() {
            let err = XircdError::UnterminatedBlock {
                keyword: block.keyword,
                opened_at: block.opened_at,
            };
            self.fail(block.opened_at, &err);
        }

        debug!(
            "{}: read {} lines, {} errors",
            self.path.display(),
            self.line,
            self.errors
        );

        ParseSummary {
            valid: self.valid,
            lines: self.line,
            errors: self.errors,
        }
    }
}
