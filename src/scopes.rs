//! Scope annotation.
//!
//! Walks a token vector once and gives every token its `scope_stack`:
//! the brace-delimited frames that strictly enclose it, outermost first.
//!
//! The kind of a frame is decided by the last structural keyword seen
//! before its `{` at the same parenthesis depth:
//!
//! | Keyword                  | Frame kind         |
//! |--------------------------|--------------------|
//! | `class Name`             | `Class`            |
//! | `new class`              | `AnonymousClass`   |
//! | `trait` / `interface`    | `Trait` / `Interface` |
//! | `enum Name`              | `Enum`             |
//! | `function name`          | `Function`         |
//! | `function (`             | `Closure`          |
//! | `namespace Name {`       | `Namespace`        |
//! | anything else            | `Block`            |
//!
//! A `;` at the keyword's depth cancels it (abstract and interface
//! methods, `namespace Foo;`).  Keywords inside parentheses wait on their
//! own depth, so a closure passed to `new class(...)` does not take the
//! class's `{`.

use crate::tokens::{ScopeFrame, ScopeKind, Token, TokenKind};

/// A structural keyword waiting for its `{`.
#[derive(Debug, Clone, Copy)]
struct Pending {
    kind: ScopeKind,
    paren_depth: usize,
}

/// A frame under construction, linked to its parent.
#[derive(Debug, Clone, Copy)]
struct Frame {
    frame: ScopeFrame,
    parent: Option<usize>,
}

fn next_significant(tokens: &[Token], from: usize) -> Option<&Token> {
    tokens[from..].iter().find(|t| !t.kind.is_trivia())
}

fn prev_significant(tokens: &[Token], before: usize) -> Option<&Token> {
    tokens[..before].iter().rev().find(|t| !t.kind.is_trivia())
}

/// Frame kind introduced by the keyword at `index`, if it opens one.
fn pending_kind(tokens: &[Token], index: usize) -> Option<ScopeKind> {
    let next = next_significant(tokens, index + 1).map(|t| t.kind);
    match tokens[index].kind {
        TokenKind::Class => {
            let anonymous = prev_significant(tokens, index).is_some_and(|t| t.kind == TokenKind::New);
            Some(if anonymous {
                ScopeKind::AnonymousClass
            } else {
                ScopeKind::Class
            })
        }
        TokenKind::Trait => Some(ScopeKind::Trait),
        TokenKind::Interface => Some(ScopeKind::Interface),
        TokenKind::Enum => Some(ScopeKind::Enum),
        TokenKind::Function => {
            // `function &name()` is still named.
            let after_ref = match next {
                Some(TokenKind::Amp) => next_significant(tokens, index + 1)
                    .and_then(|amp| next_significant(tokens, amp.index + 1))
                    .map(|t| t.kind),
                other => other,
            };
            Some(if after_ref == Some(TokenKind::Identifier) {
                ScopeKind::Function
            } else {
                ScopeKind::Closure
            })
        }
        TokenKind::Namespace => match next {
            Some(TokenKind::Identifier | TokenKind::OpenCurly) => Some(ScopeKind::Namespace),
            _ => None,
        },
        _ => None,
    }
}

/// Fill in `scope_stack` for every token.
///
/// Token `index` fields must already match their positions.
pub(crate) fn annotate(tokens: &mut [Token]) {
    let mut frames: Vec<Frame> = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    let mut innermost: Vec<Option<usize>> = Vec::with_capacity(tokens.len());
    let mut pending: Vec<Pending> = Vec::new();
    let mut paren_depth: usize = 0;

    for i in 0..tokens.len() {
        let kind = tokens[i].kind;

        // A closer is not inside the frame it closes.
        if kind == TokenKind::CloseCurly
            && let Some(id) = open.pop()
        {
            frames[id].frame.closer_index = Some(i);
        }

        innermost.push(open.last().copied());

        match kind {
            TokenKind::OpenParen | TokenKind::OpenSquare | TokenKind::AttributeOpen => {
                paren_depth += 1
            }
            TokenKind::CloseParen | TokenKind::CloseSquare | TokenKind::AttributeClose => {
                paren_depth = paren_depth.saturating_sub(1);
                while pending.last().is_some_and(|p| p.paren_depth > paren_depth) {
                    pending.pop();
                }
            }
            TokenKind::Semicolon => {
                if pending.last().is_some_and(|p| p.paren_depth == paren_depth) {
                    pending.pop();
                }
            }
            TokenKind::OpenCurly => {
                let frame_kind = match pending.last().copied() {
                    Some(p) if p.paren_depth == paren_depth => {
                        pending.pop();
                        p.kind
                    }
                    _ => ScopeKind::Block,
                };
                frames.push(Frame {
                    frame: ScopeFrame {
                        kind: frame_kind,
                        opener_index: i,
                        closer_index: None,
                    },
                    parent: open.last().copied(),
                });
                open.push(frames.len() - 1);
            }
            _ => {
                if let Some(kind) = pending_kind(tokens, i) {
                    // A later keyword at the same depth replaces the earlier one.
                    if pending.last().is_some_and(|p| p.paren_depth == paren_depth) {
                        pending.pop();
                    }
                    pending.push(Pending { kind, paren_depth });
                }
            }
        }
    }

    for (token, inner) in tokens.iter_mut().zip(innermost) {
        let mut stack = Vec::new();
        let mut cursor = inner;
        while let Some(id) = cursor {
            stack.push(frames[id].frame);
            cursor = frames[id].parent;
        }
        stack.reverse();
        token.scope_stack = stack;
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use crate::tokens::{ScopeKind, TokenKind, TokenStream};

    fn stack_of(stream: &TokenStream, name: &str) -> Vec<ScopeKind> {
        stream
            .iter()
            .find(|t| t.kind == TokenKind::Variable && t.text == name)
            .map(|t| t.scope_stack.iter().map(|f| f.kind).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_class_method_and_closure_frames() {
        let stream = TokenStream::tokenize(concat!(
            "<?php\n",
            "class A {\n",
            "    public $prop;\n",
            "    function run($param) {\n",
            "        if (true) { $local = 1; }\n",
            "        $f = function () use ($param) { return $inner; };\n",
            "    }\n",
            "}\n",
        ));
        assert_eq!(stack_of(&stream, "$prop"), vec![ScopeKind::Class]);
        // Parameters sit before the function body opens.
        assert_eq!(stack_of(&stream, "$param"), vec![ScopeKind::Class]);
        assert_eq!(
            stack_of(&stream, "$local"),
            vec![ScopeKind::Class, ScopeKind::Function, ScopeKind::Block]
        );
        assert_eq!(
            stack_of(&stream, "$inner"),
            vec![ScopeKind::Class, ScopeKind::Function, ScopeKind::Closure]
        );
    }

    #[test]
    fn test_interface_method_semicolon_cancels_pending() {
        let stream = TokenStream::tokenize("<?php interface I { function f($a); public $x; }");
        assert_eq!(stack_of(&stream, "$x"), vec![ScopeKind::Interface]);
    }

    #[test]
    fn test_anonymous_class_and_enum() {
        let stream = TokenStream::tokenize(concat!(
            "<?php\n",
            "$o = new class(1) { public $a; };\n",
            "enum Suit: string { case Hearts = 'H'; protected $b; }\n",
        ));
        assert_eq!(stack_of(&stream, "$a"), vec![ScopeKind::AnonymousClass]);
        assert_eq!(stack_of(&stream, "$b"), vec![ScopeKind::Enum]);
        assert!(stack_of(&stream, "$o").is_empty());
    }

    #[test]
    fn test_closure_argument_to_anonymous_class() {
        let stream = TokenStream::tokenize(concat!(
            "<?php\n",
            "$o = new class(function () { return $inner; }, fn () => 1) {\n",
            "    public int $x;\n",
            "};\n",
        ));
        assert_eq!(stack_of(&stream, "$inner"), vec![ScopeKind::Closure]);
        assert_eq!(stack_of(&stream, "$x"), vec![ScopeKind::AnonymousClass]);
    }

    #[test]
    fn test_opener_and_closer_indices_pair_up() {
        let stream = TokenStream::tokenize("<?php class A { function f() { $x; } }");
        let x = stream
            .iter()
            .find(|t| t.text == "$x")
            .map(|t| t.scope_stack.clone())
            .unwrap_or_default();
        assert_eq!(x.len(), 2);
        for frame in &x {
            assert_eq!(stream[frame.opener_index].kind, TokenKind::OpenCurly);
            let closer = frame.closer_index.expect("frame should be closed");
            assert_eq!(stream[closer].kind, TokenKind::CloseCurly);
            assert!(closer > frame.opener_index);
        }
        // The opener and closer themselves sit outside their frame.
        let class_frame = x[0];
        assert!(stream[class_frame.opener_index].scope_stack.is_empty());
        assert!(
            stream[class_frame.closer_index.unwrap_or_default()]
                .scope_stack
                .is_empty()
        );
    }

    #[test]
    fn test_unclosed_frame_has_no_closer() {
        let stream = TokenStream::tokenize("<?php class A { public $x;");
        let frame = stream
            .iter()
            .find(|t| t.text == "$x")
            .and_then(|t| t.innermost_scope().copied());
        assert_eq!(frame.map(|f| f.kind), Some(ScopeKind::Class));
        assert_eq!(frame.and_then(|f| f.closer_index), None);
    }
}
