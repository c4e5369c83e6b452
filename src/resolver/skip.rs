//! Trivia and attribute skipping.
//!
//! Whitespace, comments and whole `#[...]` attribute blocks are opaque
//! to the declaration scanners.  Attribute blocks may contain their own
//! brackets (`#[Attr([1, 2], new Foo())]`), so a block is matched with an
//! explicit depth counter over every bracket kind rather than by looking
//! for the next `]`.

use crate::tokens::{Token, TokenKind};

/// Index of the `#[` matching the attribute closer at `closer`.
///
/// Returns `None` if the brackets are unbalanced.
pub(crate) fn attribute_opener(tokens: &[Token], closer: usize) -> Option<usize> {
    let mut depth: usize = 0;
    let mut i = closer;
    loop {
        let kind = tokens.get(i)?.kind;
        if kind.is_closer() {
            depth += 1;
        } else if kind.is_opener() {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return (kind == TokenKind::AttributeOpen).then_some(i);
            }
        }
        i = i.checked_sub(1)?;
    }
}

/// Index of the `]` matching the attribute opener at `opener`.
pub(crate) fn attribute_closer(tokens: &[Token], opener: usize) -> Option<usize> {
    let mut depth: usize = 0;
    for (i, token) in tokens.iter().enumerate().skip(opener) {
        if token.kind.is_opener() {
            depth += 1;
        } else if token.kind.is_closer() {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return (token.kind == TokenKind::AttributeClose).then_some(i);
            }
        }
    }
    None
}

/// Starting at `cursor` (inclusive) and moving backward, the first token
/// that is neither trivia nor part of an attribute block.
///
/// `None` means the start of the stream was reached.
pub(crate) fn skip_backward(tokens: &[Token], cursor: usize) -> Option<usize> {
    let mut i = cursor;
    loop {
        let kind = tokens.get(i)?.kind;
        if kind.is_trivia() {
            i = i.checked_sub(1)?;
        } else if kind == TokenKind::AttributeClose {
            i = attribute_opener(tokens, i)?.checked_sub(1)?;
        } else {
            return Some(i);
        }
    }
}

/// Starting at `cursor` (inclusive) and moving forward, the first token
/// that is neither trivia nor part of an attribute block.
///
/// `None` means the end of the stream was reached.
pub(crate) fn skip_forward(tokens: &[Token], cursor: usize) -> Option<usize> {
    let mut i = cursor;
    loop {
        let kind = tokens.get(i)?.kind;
        if kind.is_trivia() {
            i += 1;
        } else if kind == TokenKind::AttributeOpen {
            i = attribute_closer(tokens, i)? + 1;
        } else {
            return Some(i);
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
