//! Tests for block-structured scopes
//!
//! These tests verify the scope stack as the parser drives it:
//! 1. Entering a block switches the active keyword table
//! 2. Errors inside a block poison it, and closing a poisoned block discards it
//! 3. Valid blocks are committed to the settings store in file order

use xircd::diagnostics::DiagnosticKind;

use crate::helpers::parse_str;

#[test]
fn test_valid_blocks_are_committed_in_order() {
    let text = "\
client first.example.net 6667
    password one
endclient
client second.example.net 7000
ENDCLIENT
";
    let (settings, summary, sink) = parse_str(text);

    assert!(summary.valid, "unexpected diagnostics: {:?}", sink.diagnostics());
    let clients = settings.clients();
    assert_eq!(clients.len(), 2);
    assert_eq!(clients[0].hostname, "first.example.net");
    assert_eq!(clients[0].password.as_deref(), Some("one"));
    assert_eq!(clients[1].hostname, "second.example.net");
    assert_eq!(clients[1].port, 7000);
    assert_eq!(clients[1].password, None);
}

#[test]
fn test_bad_opener_still_enters_block() {
    // Port out of range: the body must still be read as client keywords
    let text = "\
client irc.example.net 70000
    password secret
endclient
timeout 10
";
    let (settings, summary, sink) = parse_str(text);

    assert!(!summary.valid);
    assert_eq!(sink.len(), 1, "only the opener is wrong: {:?}", sink.diagnostics());
    assert_eq!(sink.diagnostics()[0].line, Some(1));
    assert_eq!(sink.diagnostics()[0].kind, DiagnosticKind::ValueInvalid);

    // The failed client is discarded and the cursor is back at top level
    assert!(settings.clients().is_empty());
    assert_eq!(settings.timeout(), 10);
}

#[test]
fn test_error_inside_block_discards_it() {
    let text = "\
client irc.example.net 6667
    password
endclient
client ok.example.net 6667
endclient
";
    let (settings, summary, sink) = parse_str(text);

    assert!(!summary.valid);
    assert_eq!(sink.lines(), vec![2]);
    assert_eq!(settings.clients().len(), 1);
    assert_eq!(settings.clients()[0].hostname, "ok.example.net");
}

#[test]
fn test_root_keyword_inside_block_is_hinted() {
    let text = "\
client irc.example.net 6667
    timeout 5
endclient
";
    let (settings, summary, sink) = parse_str(text);

    assert!(!summary.valid);
    assert_eq!(
        sink.diagnostics()[0].to_string(),
        "test.conf:2: unknown or invalid keyword 'timeout' (only valid at top level)"
    );
    assert_eq!(settings.timeout(), 0);
    assert!(settings.clients().is_empty());
}

#[test]
fn test_block_keywords_at_top_level_are_unknown() {
    let (_, summary, sink) = parse_str("endclient\npassword x\n");

    assert!(!summary.valid);
    assert_eq!(sink.len(), 2);
    assert!(sink
        .diagnostics()
        .iter()
        .all(|d| d.kind == DiagnosticKind::UnknownKeyword));
    assert_eq!(
        sink.diagnostics()[0].message,
        "unknown or invalid keyword 'endclient' (only valid inside a 'client' block)"
    );
}

#[test]
fn test_unterminated_block_reported_at_opener() {
    let text = "\
debug
client irc.example.net 6667
    password secret
";
    let (settings, summary, sink) = parse_str(text);

    assert!(!summary.valid);
    assert_eq!(sink.len(), 1);
    let diagnostic = &sink.diagnostics()[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::UnterminatedBlock);
    assert_eq!(
        diagnostic.to_string(),
        "test.conf:2: block 'client' opened at line 2 is never closed"
    );
    assert!(settings.debug());
    assert!(settings.clients().is_empty());
}

#[test]
fn test_opener_arity_error_does_not_enter_block() {
    let text = "\
client irc.example.net
endclient
";
    let (_, summary, sink) = parse_str(text);

    assert!(!summary.valid);
    let kinds: Vec<DiagnosticKind> = sink.diagnostics().iter().map(|d| d.kind).collect();
    assert_eq!(kinds.len(), 2);
    assert!(matches!(kinds[0], DiagnosticKind::ArityMismatch(_)));
    assert_eq!(kinds[1], DiagnosticKind::UnknownKeyword);
}
