//! Directive handlers
//!
//! Each keyword definition carries a typed `Directive`; this module applies
//! it to the settings store (or to the block entity being built) once the
//! dispatch loop has checked the line's arity. Handlers return a
//! `XircdResult` and never panic on bad input: a failure becomes a diagnostic
//! in the dispatch loop and scanning continues.

use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;

use log::debug;

use crate::error::{ValueError, XircdError, XircdResult};
use crate::scope::{
    Block, BlockEntity, BoolField, Directive, KeywordDef, ScopeKind, ScopeStack, StringField,
    UintField,
};
use crate::settings::{Client, Settings};

/// Parse a base-10 unsigned integer
///
/// Only ASCII digits are accepted: no sign, no surrounding whitespace, no
/// radix prefix. A parsed zero is `Ok(0)`, never an error.
///
/// # Arguments
/// * `text` - The token to parse
///
/// # Returns
/// * `Ok(T)` with the parsed value
/// * `Err(ValueError)` describing why the text is not a valid `T`
pub fn parse_unsigned<T>(text: &str) -> Result<T, ValueError>
where
    T: FromStr<Err = ParseIntError>,
{
    if text.is_empty() {
        return Err(ValueError::Empty);
    }

    if !text.bytes().all(|b| b.is_ascii_digit()) {
        let negative = text
            .strip_prefix('-')
            .map(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
            .unwrap_or(false);
        return Err(if negative {
            ValueError::Negative
        } else {
            ValueError::NotANumber
        });
    }

    text.parse::<T>().map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow => ValueError::Overflow {
            bits: (std::mem::size_of::<T>() * 8) as u32,
        },
        IntErrorKind::Empty => ValueError::Empty,
        _ => ValueError::NotANumber,
    })
}

/// Apply a keyword's directive to a validated line
///
/// # Arguments
/// * `def` - The matched keyword definition
/// * `tokens` - The line's tokens, already checked against `def.arity`
/// * `line` - 1-based line number, recorded on blocks opened here
/// * `settings` - The store being populated
/// * `scopes` - The scope cursor for this pass
///
/// # Returns
/// * `Ok(())` if the directive was applied
/// * `Err` if a value was invalid or the block structure was broken
pub fn apply(
    def: &KeywordDef,
    tokens: &[String],
    line: usize,
    settings: &mut Settings<'_>,
    scopes: &mut ScopeStack,
) -> XircdResult<()> {
    match def.directive {
        Directive::SetUint(field) => set_uint(def, tokens, field, settings),
        Directive::SetBool(field) => {
            set_bool(field, settings);
            Ok(())
        }
        Directive::SetString(field) => set_string(def, tokens, field, scopes),
        Directive::SetLogFile => {
            settings.set_log_file(&tokens[1]);
            Ok(())
        }
        Directive::Enter(kind) => enter_scope(def, tokens, line, kind, scopes),
        Directive::Leave => leave_scope(def, settings, scopes),
    }
}

fn set_uint(
    def: &KeywordDef,
    tokens: &[String],
    field: UintField,
    settings: &mut Settings<'_>,
) -> XircdResult<()> {
    let value = parse_unsigned::<u32>(&tokens[1]).map_err(|reason| XircdError::ValueInvalid {
        keyword: def.keyword,
        value: tokens[1].clone(),
        reason,
    })?;

    match field {
        UintField::Timeout => settings.set_timeout(value),
        UintField::Keepalive => settings.set_keepalive(value),
    }
    Ok(())
}

fn set_bool(field: BoolField, settings: &mut Settings<'_>) {
    match field {
        BoolField::Debug => settings.set_debug(true),
        BoolField::LogSyslog => settings.set_log_syslog(true),
    }
}

fn set_string(
    def: &KeywordDef,
    tokens: &[String],
    field: StringField,
    scopes: &mut ScopeStack,
) -> XircdResult<()> {
    match field {
        StringField::ClientPassword => match scopes.current_block_mut() {
            Some(Block {
                entity: BlockEntity::Client(client),
                ..
            }) => {
                client.set_password(tokens[1].as_str());
                Ok(())
            }
            None => Err(XircdError::UnknownKeyword {
                keyword: def.keyword.to_string(),
                valid_in: Some(ScopeKind::Client),
            }),
        },
    }
}

/// Open a block
///
/// The scope switch happens even when the opener's own values are invalid,
/// so the block's body is still resolved against the child table. The
/// failed block is marked invalid and discarded when it is closed.
fn enter_scope(
    def: &KeywordDef,
    tokens: &[String],
    line: usize,
    kind: ScopeKind,
    scopes: &mut ScopeStack,
) -> XircdResult<()> {
    let (entity, result) = match kind {
        ScopeKind::Client => {
            let port = parse_unsigned::<u16>(&tokens[2]);
            let client = Client::new(tokens[1].as_str(), *port.as_ref().unwrap_or(&0));
            let result = port.map(|_| ()).map_err(|reason| XircdError::ValueInvalid {
                keyword: def.keyword,
                value: tokens[2].clone(),
                reason,
            });
            (BlockEntity::Client(client), result)
        }
        ScopeKind::Root => {
            return Err(XircdError::UnknownKeyword {
                keyword: def.keyword.to_string(),
                valid_in: None,
            })
        }
    };

    scopes.push(
        kind,
        Block {
            keyword: def.keyword,
            entity,
            opened_at: line,
            valid: result.is_ok(),
        },
    );
    result
}

/// Close the innermost block, committing its entity if it validated
fn leave_scope(
    def: &KeywordDef,
    settings: &mut Settings<'_>,
    scopes: &mut ScopeStack,
) -> XircdResult<()> {
    let block = scopes.pop().ok_or(XircdError::UnbalancedBlock {
        keyword: def.keyword,
    })?;

    match block.entity {
        BlockEntity::Client(client) if block.valid => settings.add_client(client),
        BlockEntity::Client(client) => debug!(
            "discarding client '{}' opened at line {}",
            client.hostname, block.opened_at
        ),
    }
    Ok(())
}
