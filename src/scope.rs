//! Scope tables and the scope stack for xircd
//!
//! A scope is the set of directives legal at a given point in the
//! configuration file. Each scope is described by an immutable `ScopeTable`
//! of keyword definitions; the parser keeps a `ScopeStack` whose innermost
//! frame decides which table the next line is resolved against.
//!
//! Structural directives move the cursor:
//! - `Directive::Enter` pushes a child table together with the entity being built
//! - `Directive::Leave` pops it again, handing the entity back for commit or discard
//!
//! The root table is always the bottom frame and can never be popped, so a
//! stack created for one parse pass cannot leak state into another.

use crate::error::{ArityKind, XircdError, XircdResult};
use crate::settings::Client;

/// The distinct kinds of scope a configuration file can be in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Global keywords, active from the first line
    Root,
    /// Keywords inside a `client <host> <port>` ... `endclient` block
    Client,
}

impl ScopeKind {
    /// Every scope kind, in lookup order for wrong-scope hints
    pub const ALL: [ScopeKind; 2] = [ScopeKind::Root, ScopeKind::Client];

    /// Get the keyword table describing this scope
    pub fn table(self) -> &'static ScopeTable {
        match self {
            ScopeKind::Root => &ROOT_SCOPE,
            ScopeKind::Client => &CLIENT_SCOPE,
        }
    }

    /// Name used in diagnostics
    pub fn name(self) -> &'static str {
        match self {
            ScopeKind::Root => "root",
            ScopeKind::Client => "client",
        }
    }

    /// Find another scope in which `keyword` would have been legal
    ///
    /// # Arguments
    /// * `keyword` - The unmatched keyword text
    /// * `except` - The scope that already failed to match it
    ///
    /// # Returns
    /// * `Some(ScopeKind)` naming the first other scope that defines the keyword
    /// * `None` if no scope knows it
    pub fn home_of(keyword: &str, except: ScopeKind) -> Option<ScopeKind> {
        Self::ALL
            .into_iter()
            .filter(|kind| *kind != except)
            .find(|kind| kind.table().lookup(keyword).is_some())
    }
}

/// Unsigned fields a `SetUint` directive can target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UintField {
    Timeout,
    Keepalive,
}

/// Flags a `SetBool` directive can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolField {
    Debug,
    LogSyslog,
}

/// String fields a `SetString` directive can replace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringField {
    /// Password of the client block currently being built
    ClientPassword,
}

/// The typed operation bound to a keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Parse the second token as an unsigned integer into a field
    SetUint(UintField),
    /// Raise a flag; presence of the directive means true
    SetBool(BoolField),
    /// Replace a string field with the second token
    SetString(StringField),
    /// Store the second token as the log file and make it the active destination
    SetLogFile,
    /// Open a nested block of the given kind
    Enter(ScopeKind),
    /// Close the innermost block
    Leave,
}

/// One keyword legal in a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordDef {
    /// Keyword text, matched case-insensitively
    pub keyword: &'static str,
    /// Exact token count including the keyword itself
    pub arity: usize,
    /// What the keyword does once its arity is satisfied
    pub directive: Directive,
}

impl KeywordDef {
    const fn new(keyword: &'static str, arity: usize, directive: Directive) -> Self {
        KeywordDef {
            keyword,
            arity,
            directive,
        }
    }

    /// Check a line's token count against the exact arity
    ///
    /// # Arguments
    /// * `token_count` - Number of tokens on the line, keyword included
    ///
    /// # Returns
    /// * `Ok(())` if the count matches exactly
    /// * `Err(XircdError::ArityMismatch)` for too few or too many tokens
    pub fn check_arity(&self, token_count: usize) -> XircdResult<()> {
        let kind = if token_count < self.arity {
            ArityKind::TooFew
        } else if token_count > self.arity {
            ArityKind::TooMany
        } else {
            return Ok(());
        };

        Err(XircdError::ArityMismatch {
            keyword: self.keyword,
            kind,
        })
    }
}

/// The ordered keyword definitions of one scope
#[derive(Debug)]
pub struct ScopeTable {
    kind: ScopeKind,
    keywords: &'static [KeywordDef],
}

impl ScopeTable {
    /// The scope this table describes
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    /// All definitions, in table order
    pub fn keywords(&self) -> &'static [KeywordDef] {
        self.keywords
    }

    /// Resolve a keyword against this table
    ///
    /// Definitions are scanned in table order and compared case-insensitively;
    /// the first match wins.
    pub fn lookup(&self, keyword: &str) -> Option<&'static KeywordDef> {
        self.keywords
            .iter()
            .find(|def| def.keyword.eq_ignore_ascii_case(keyword))
    }
}

static ROOT_KEYWORDS: [KeywordDef; 6] = [
    KeywordDef::new("debug", 1, Directive::SetBool(BoolField::Debug)),
    KeywordDef::new("timeout", 2, Directive::SetUint(UintField::Timeout)),
    KeywordDef::new("keepalive", 2, Directive::SetUint(UintField::Keepalive)),
    KeywordDef::new("log-syslog", 1, Directive::SetBool(BoolField::LogSyslog)),
    KeywordDef::new("log-file", 2, Directive::SetLogFile),
    KeywordDef::new("client", 3, Directive::Enter(ScopeKind::Client)),
];

static CLIENT_KEYWORDS: [KeywordDef; 2] = [
    KeywordDef::new("password", 2, Directive::SetString(StringField::ClientPassword)),
    KeywordDef::new("endclient", 1, Directive::Leave),
];

static ROOT_SCOPE: ScopeTable = ScopeTable {
    kind: ScopeKind::Root,
    keywords: &ROOT_KEYWORDS,
};

static CLIENT_SCOPE: ScopeTable = ScopeTable {
    kind: ScopeKind::Client,
    keywords: &CLIENT_KEYWORDS,
};

/// Entity under construction inside a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockEntity {
    Client(Client),
}

/// A block opened by an `Enter` directive and not yet closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// The keyword that opened the block
    pub keyword: &'static str,
    /// The partially built entity
    pub entity: BlockEntity,
    /// Line of the opening directive
    pub opened_at: usize,
    /// False once any line of the block (or its opener) failed
    pub valid: bool,
}

#[derive(Debug)]
struct Frame {
    table: &'static ScopeTable,
    block: Option<Block>,
}

/// The scope cursor for one parse pass
///
/// Holds the root frame plus one frame per open block. The innermost frame's
/// table is the active scope.
#[derive(Debug)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    /// Create a stack positioned at the root scope
    pub fn new() -> Self {
        ScopeStack {
            frames: vec![Frame {
                table: ScopeKind::Root.table(),
                block: None,
            }],
        }
    }

    /// The active scope table
    pub fn current(&self) -> &'static ScopeTable {
        self.frames
            .last()
            .map(|frame| frame.table)
            .unwrap_or_else(|| ScopeKind::Root.table())
    }

    /// Number of open blocks (zero at top level)
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// Enter a nested scope
    ///
    /// # Arguments
    /// * `kind` - The scope to switch to
    /// * `block` - The entity that the block's directives will populate
    pub fn push(&mut self, kind: ScopeKind, block: Block) {
        self.frames.push(Frame {
            table: kind.table(),
            block: Some(block),
        });
    }

    /// Leave the innermost scope
    ///
    /// # Returns
    /// * `Some(Block)` with the entity that was being built
    /// * `None` if only the root scope is active
    pub fn pop(&mut self) -> Option<Block> {
        if self.frames.len() > 1 {
            self.frames.pop().and_then(|frame| frame.block)
        } else {
            None
        }
    }

    /// The innermost open block, if any
    pub fn current_block_mut(&mut self) -> Option<&mut Block> {
        self.frames.last_mut().and_then(|frame| frame.block.as_mut())
    }

    /// Mark the innermost open block as failed
    ///
    /// Does nothing at top level.
    pub fn poison(&mut self) {
        if let Some(block) = self.current_block_mut() {
            block.valid = false;
        }
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
