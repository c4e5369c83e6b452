//! Declared type collection.
//!
//! Reads the tokens between the last modifier and the variable and joins
//! the type tokens back together without the whitespace and comments that
//! may sit between them:
//!
//! ```text
//!   ? /* c */ array                  =>  ?array
//!   \MyNamespace \ MyClass \ // c
//!       Foo                          =>  \MyNamespace\MyClass\Foo
//!   int | string /* c */ | INT       =>  int|string|INT
//!   ?Foo&Bar                         =>  ?Foo&Bar
//! ```
//!
//! Casing and duplicates are preserved.  Whether the type is legal PHP
//! (`callable|void`) is not this module's concern.

use crate::tokens::{Token, TokenKind};

use super::skip::skip_forward;

/// A declared type as written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CollectedType {
    /// Canonical text, `?` first when nullable; empty when untyped.
    pub text: String,
    pub nullable: bool,
    /// First type token (after any `?`).
    pub first_token: Option<usize>,
    /// Last type token.
    pub last_token: Option<usize>,
}

/// Collect the type written in `start..end`.
///
/// The scanner has already checked that only type tokens, trivia and
/// attributes occur in the range; anything else is ignored here.
pub(crate) fn collect_type(tokens: &[Token], start: usize, end: usize) -> CollectedType {
    let mut collected = CollectedType::default();
    let mut cursor = start;

    while let Some(i) = skip_forward(tokens, cursor) {
        if i >= end {
            break;
        }
        let token = &tokens[i];
        if token.kind == TokenKind::Nullable {
            collected.nullable = true;
        } else if token.kind.is_type_text() {
            collected.text.push_str(&token.text);
            collected.first_token.get_or_insert(i);
            collected.last_token = Some(i);
        }
        cursor = i + 1;
    }

    if collected.text.is_empty() {
        // A lone `?` is no type at all.
        return CollectedType::default();
    }
    if collected.nullable {
        collected.text.insert(0, '?');
    }
    collected
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenStream;

    /// Collect the type in front of `$x` in a one-property class, starting
    /// right after `public`.
    fn type_of(decl: &str) -> CollectedType {
        let src = format!("<?php class A {{ public {decl} $x; }}");
        let stream = TokenStream::tokenize(&src);
        let tokens = stream.as_slice();
        let start = tokens
            .iter()
            .position(|t| t.text == "public")
            .map(|i| i + 1)
            .unwrap_or_default();
        let end = tokens
            .iter()
            .position(|t| t.text == "$x")
            .unwrap_or_default();
        collect_type(tokens, start, end)
    }

    #[test]
    fn test_collect_strips_trivia() {
        let collected = type_of("? /* comment */ array");
        assert_eq!(collected.text, "?array");
        assert!(collected.nullable);
    }

    #[test]
    fn test_collect_multiline_namespace() {
        let collected = type_of("\\MyNamespace \\ MyClass \\\n    // note\n    Foo");
        assert_eq!(collected.text, "\\MyNamespace\\MyClass\\Foo");
        assert!(!collected.nullable);
    }

    #[test]
    fn test_collect_preserves_case_and_duplicates() {
        assert_eq!(type_of("int | string /* c */ | INT").text, "int|string|INT");
        assert_eq!(type_of("?Foo&Bar").text, "?Foo&Bar");
    }

    #[test]
    fn test_collect_empty_and_token_positions() {
        assert_eq!(type_of(""), CollectedType::default());

        let src = "<?php class A { public ?int $x; }";
        let stream = TokenStream::tokenize(src);
        let tokens = stream.as_slice();
        let int = tokens.iter().position(|t| t.text == "int");
        let x = tokens.iter().position(|t| t.text == "$x").unwrap_or_default();
        let public = tokens.iter().position(|t| t.text == "public").unwrap_or_default();
        let collected = collect_type(tokens, public + 1, x);
        assert_eq!(collected.first_token, int);
        assert_eq!(collected.last_token, int);
    }
}
