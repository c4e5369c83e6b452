//! Backward declaration scanner.
//!
//! Starting at a variable, walks backward over the declared type and the
//! modifier keywords until it reaches the token that ends the previous
//! statement or opens the class body:
//!
//! ```text
//!   {  #[Attr]  public static  ?Foo\Bar  $a = [1, 2],  $b ;
//!   ^           ^^^^^^^^^^^^^  ^^^^^^^^  ^^            ^^
//!   boundary    modifiers      type      leader        variable
//! ```
//!
//! Later members of a group declaration first hop back to the group's
//! first variable (the "leader"), skipping default values wholesale, so
//! that every member shares the leader's modifiers and type.
//!
//! The walk itself is a small state machine over [`ScanState`]; each
//! significant token is first reduced to a [`Seen`] class and then fed
//! through [`transition`].

use crate::error::RejectReason;
use crate::tokens::{Token, TokenKind};
use crate::types::{Modifier, ModifierSet};

use super::skip::skip_backward;

// ─── State machine ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScanState {
    /// Directly in front of the variable, or inside its type.
    SeekingType,
    /// In front of the type, collecting modifier keywords.
    SeekingModifier,
    /// Found the token the declaration starts after.
    AtBoundary(usize),
    Rejected(RejectReason),
}

/// How the backward scan classifies one significant token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Seen {
    /// Part of a type expression.
    TypeToken,
    Modifier(Modifier),
    /// `{`, `;` or `}`.
    Boundary,
    /// Anything that cannot precede a property declaration.
    Stop(RejectReason),
}

/// Next state after seeing `seen` at `index`.
pub(crate) fn transition(state: ScanState, seen: Seen, index: usize) -> ScanState {
    match (state, seen) {
        (ScanState::AtBoundary(_) | ScanState::Rejected(_), _) => state,
        (_, Seen::Boundary) => ScanState::AtBoundary(index),
        (_, Seen::Modifier(_)) => ScanState::SeekingModifier,
        (ScanState::SeekingType, Seen::TypeToken) => ScanState::SeekingType,
        // A type written in front of the modifiers is not a declaration.
        (ScanState::SeekingModifier, Seen::TypeToken) => {
            ScanState::Rejected(RejectReason::Expression)
        }
        (_, Seen::Stop(reason)) => ScanState::Rejected(reason),
    }
}

/// Classify the significant token at `index`.
pub(crate) fn see(tokens: &[Token], index: usize) -> Seen {
    let kind = tokens[index].kind;
    if let Some(modifier) = kind.as_modifier() {
        return Seen::Modifier(modifier);
    }
    if kind.is_type_token() {
        return Seen::TypeToken;
    }
    match kind {
        // `?>` ends a statement, so code after the next open tag starts one.
        TokenKind::Semicolon | TokenKind::OpenCurly | TokenKind::CloseCurly | TokenKind::OpenTag => {
            Seen::Boundary
        }
        TokenKind::Global => Seen::Stop(RejectReason::GlobalStatement),
        TokenKind::OpenParen | TokenKind::OpenSquare => Seen::Stop(opener_reason(tokens, index)),
        _ => Seen::Stop(RejectReason::Expression),
    }
}

/// Why a variable directly inside the bracket at `opener` is not a
/// declaration: parameter list, closure `use` list, or some expression.
fn opener_reason(tokens: &[Token], opener: usize) -> RejectReason {
    if tokens[opener].kind != TokenKind::OpenParen {
        return RejectReason::Expression;
    }
    let Some(before) = prev_skipped(tokens, opener) else {
        return RejectReason::Expression;
    };
    match tokens[before].kind {
        TokenKind::Use => RejectReason::ClosureUse,
        TokenKind::Function | TokenKind::Fn => RejectReason::Parameter,
        // `function &(...)`, `function name(...)`, `function &name(...)`
        TokenKind::Amp | TokenKind::Identifier => {
            let declared = prev_skipped(tokens, before).is_some_and(|i| {
                let kind = tokens[i].kind;
                kind == TokenKind::Function
                    || (kind == TokenKind::Amp
                        && prev_skipped(tokens, i)
                            .is_some_and(|j| tokens[j].kind == TokenKind::Function))
            });
            if declared {
                RejectReason::Parameter
            } else {
                RejectReason::Expression
            }
        }
        _ => RejectReason::Expression,
    }
}

/// Nearest significant token strictly before `index`, attribute blocks
/// skipped.
fn prev_skipped(tokens: &[Token], index: usize) -> Option<usize> {
    index.checked_sub(1).and_then(|p| skip_backward(tokens, p))
}

// ─── Group declarations ─────────────────────────────────────────────────────

/// Given the comma in front of a group member, find the previous member's
/// variable.  Its default value, if any, is skipped without looking
/// inside nested brackets.
fn previous_member(tokens: &[Token], comma: usize) -> Result<usize, RejectReason> {
    let mut depth: usize = 0;
    let mut in_value = false;
    let mut cursor = comma;

    loop {
        let index = prev_skipped(tokens, cursor).ok_or(RejectReason::MissingBoundary)?;
        let kind = tokens[index].kind;

        if depth > 0 {
            if kind.is_closer() {
                depth += 1;
            } else if kind.is_opener() {
                depth -= 1;
            }
            cursor = index;
            continue;
        }

        match kind {
            TokenKind::Variable if !in_value => return Ok(index),
            TokenKind::Equals => {
                let target = prev_skipped(tokens, index).ok_or(RejectReason::MissingBoundary)?;
                return if tokens[target].kind == TokenKind::Variable {
                    Ok(target)
                } else {
                    Err(RejectReason::Expression)
                };
            }
            TokenKind::Global => return Err(RejectReason::GlobalStatement),
            TokenKind::Comma | TokenKind::Semicolon | TokenKind::CloseCurly => {
                return Err(RejectReason::Expression);
            }
            k if k.is_opener() => return Err(opener_reason(tokens, index)),
            k if k.is_closer() => {
                depth = 1;
                in_value = true;
            }
            _ => in_value = true,
        }
        cursor = index;
    }
}

/// First variable of the group declaration `variable` belongs to
/// (`variable` itself when it is not a later group member).
pub(crate) fn group_leader(tokens: &[Token], variable: usize) -> Result<usize, RejectReason> {
    let mut current = variable;
    while let Some(prev) = prev_skipped(tokens, current) {
        if tokens[prev].kind != TokenKind::Comma {
            break;
        }
        current = previous_member(tokens, prev)?;
    }
    Ok(current)
}

// ─── Scan ───────────────────────────────────────────────────────────────────

/// What precedes a property declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DeclarationPrefix {
    /// Modifier keywords in source order, with their token indices.
    pub modifiers: Vec<(usize, Modifier)>,
    /// The `{`, `;` or `}` the declaration follows.
    pub declaration_start: usize,
    /// First variable of the declaration; differs from the resolved
    /// variable for later members of a group.
    pub leader: usize,
}

impl DeclarationPrefix {
    pub(crate) fn modifier_set(&self) -> ModifierSet {
        ModifierSet::from_source_order(self.modifiers.iter().map(|&(_, m)| m))
    }

    /// Index the type expression starts scanning from: just after the last
    /// modifier, or after the boundary when there are none.
    pub(crate) fn type_start(&self) -> usize {
        self.modifiers
            .last()
            .map_or(self.declaration_start, |&(index, _)| index)
            + 1
    }
}

/// Scan backward from the variable at `variable` to its declaration start.
pub(crate) fn scan_declaration(tokens: &[Token], variable: usize) -> Result<DeclarationPrefix, RejectReason> {
    let leader = group_leader(tokens, variable)?;
    let mut state = ScanState::SeekingType;
    let mut modifiers = Vec::new();
    let mut cursor = leader;

    loop {
        let index = prev_skipped(tokens, cursor).ok_or(RejectReason::MissingBoundary)?;
        let seen = see(tokens, index);
        if let Seen::Modifier(modifier) = seen {
            modifiers.push((index, modifier));
        }
        state = transition(state, seen, index);
        tracing::trace!(index, ?seen, ?state, "declaration scan step");

        match state {
            ScanState::AtBoundary(start) => {
                modifiers.reverse();
                return Ok(DeclarationPrefix {
                    modifiers,
                    declaration_start: start,
                    leader,
                });
            }
            ScanState::Rejected(reason) => return Err(reason),
            ScanState::SeekingType | ScanState::SeekingModifier => cursor = index,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenStream;
    use crate::types::Visibility;

    fn variable(stream: &TokenStream, name: &str) -> usize {
        stream
            .iter()
            .position(|t| t.kind == TokenKind::Variable && t.text == name)
            .unwrap_or_else(|| panic!("variable {name} not found"))
    }

    #[test]
    fn test_transition_table() {
        use ScanState::*;
        let public = Seen::Modifier(Modifier::Visibility(Visibility::Public));

        assert_eq!(transition(SeekingType, Seen::TypeToken, 3), SeekingType);
        assert_eq!(transition(SeekingType, public, 3), SeekingModifier);
        assert_eq!(transition(SeekingType, Seen::Boundary, 3), AtBoundary(3));
        assert_eq!(transition(SeekingModifier, public, 2), SeekingModifier);
        assert_eq!(transition(SeekingModifier, Seen::Boundary, 2), AtBoundary(2));
        assert_eq!(
            transition(SeekingModifier, Seen::TypeToken, 2),
            Rejected(RejectReason::Expression)
        );
        assert_eq!(
            transition(SeekingType, Seen::Stop(RejectReason::Parameter), 1),
            Rejected(RejectReason::Parameter)
        );
        // Terminal states stay put.
        assert_eq!(transition(AtBoundary(4), public, 1), AtBoundary(4));
        assert_eq!(
            transition(Rejected(RejectReason::ClosureUse), Seen::Boundary, 1),
            Rejected(RejectReason::ClosureUse)
        );
    }

    #[test]
    fn test_scan_collects_modifiers_in_source_order() {
        let stream = TokenStream::tokenize("<?php class A { static public ?int $x; }");
        let tokens = stream.as_slice();
        let prefix = scan_declaration(tokens, variable(&stream, "$x")).expect("declaration");
        let mods: Vec<Modifier> = prefix.modifiers.iter().map(|&(_, m)| m).collect();
        assert_eq!(
            mods,
            vec![Modifier::Static, Modifier::Visibility(Visibility::Public)]
        );
        assert_eq!(tokens[prefix.declaration_start].kind, TokenKind::OpenCurly);
        assert_eq!(tokens[prefix.type_start() - 1].text, "public");
    }

    #[test]
    fn test_group_leader_skips_default_values() {
        let stream = TokenStream::tokenize(concat!(
            "<?php class A {\n",
            "    private $a = array('k' => [1, 2]), $b = __DIR__ . '/x',\n",
            "        $c, $d = FOO;\n",
            "}\n",
        ));
        let tokens = stream.as_slice();
        let a = variable(&stream, "$a");
        for name in ["$a", "$b", "$c", "$d"] {
            assert_eq!(group_leader(tokens, variable(&stream, name)), Ok(a), "{name}");
        }
    }

    #[test]
    fn test_scan_rejections() {
        let cases = [
            ("<?php class A { function f(int $x) {} }", RejectReason::Parameter),
            ("<?php class A { function f($a = [1, 2], $x) {} }", RejectReason::Parameter),
            ("<?php class A { function __construct(private int $x) {} }", RejectReason::Parameter),
            ("<?php function f() { global $y, $x; }", RejectReason::GlobalStatement),
            ("<?php $f = function () use ($y, $x) {};", RejectReason::ClosureUse),
            ("<?php class A { public $y = $x; }", RejectReason::Expression),
            ("<?php class A { public $y = [1, $x]; }", RejectReason::Expression),
            ("<?php class A { int public $x; }", RejectReason::Expression),
        ];
        for (src, expected) in cases {
            let stream = TokenStream::tokenize(src);
            let x = variable(&stream, "$x");
            assert_eq!(
                scan_declaration(stream.as_slice(), x).map(|p| p.declaration_start),
                Err(expected),
                "{src}"
            );
        }
    }

    #[test]
    fn test_scan_runs_off_stream_start() {
        let stream = TokenStream::from_tokens(vec![Token {
            kind: TokenKind::Variable,
            text: "$x".to_string(),
            index: 0,
            line: 1,
            scope_stack: Vec::new(),
        }]);
        assert_eq!(
            scan_declaration(stream.as_slice(), 0),
            Err(RejectReason::MissingBoundary)
        );
    }
}
