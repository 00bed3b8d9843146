//! Line tokenizer for configuration files
//!
//! Splits one raw line into the ordered tokens the dispatch loop resolves.
//! Tokens are separated by whitespace; a double-quoted run is one token with
//! the quotes removed, so values such as paths may contain spaces. A `#`
//! anywhere on the line starts a comment, quoted or not.
//!
//! Lines arrive as raw bytes. The line ending and comment are cut before the
//! text is decoded, so bytes that are not UTF-8 inside a comment are never
//! looked at; elsewhere they decode to U+FFFD and surface as a bad keyword
//! or value on that line.

use std::borrow::Cow;

use regex::Regex;

use crate::error::XircdResult;

/// One line's tokens; token 0 is the keyword
pub type TokenSequence = Vec<String>;

/// Matches a quoted token or a run of non-whitespace
const TOKEN_PATTERN: &str = r#""([^"]*)"|(\S+)"#;

/// Remove the comment, if any, from a raw line
pub fn strip_comment(line: &[u8]) -> &[u8] {
    match line.iter().position(|&b| b == b'#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Remove a trailing `\n` or `\r\n`
pub fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// The text of a raw line that the tokenizer should see
///
/// Drops the line ending and comment, then decodes what is left. Invalid
/// UTF-8 is replaced rather than rejected.
pub fn line_text(raw: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(strip_comment(strip_line_ending(raw)))
}

/// Splits configuration lines into tokens
#[derive(Debug, Clone)]
pub struct Tokenizer {
    pattern: Regex,
}

impl Tokenizer {
    /// Create a tokenizer
    pub fn new() -> XircdResult<Self> {
        Ok(Tokenizer {
            pattern: Regex::new(TOKEN_PATTERN)?,
        })
    }

    /// Tokenize a line that has already had its comment removed
    ///
    /// # Arguments
    /// * `line` - The line without its trailing newline
    ///
    /// # Returns
    /// * The tokens in order; empty for blank lines
    pub fn tokenize(&self, line: &str) -> TokenSequence {
        self.pattern
            .captures_iter(line)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|token| token.as_str().to_string())
            .collect()
    }
}
