//! Token stream model.
//!
//! A [`TokenStream`] is a flat, immutable array of [`Token`]s.  Each token
//! carries its kind, its raw source text, its position in the array, the
//! source line it starts on, and the stack of scope frames (class,
//! function, ...) that enclose it.  The stream is built once per file by
//! [`TokenStream::tokenize`] and then only read.

use crate::types::{Modifier, Visibility};

// ─── Token kinds ────────────────────────────────────────────────────────────

/// The closed set of token kinds the resolver distinguishes.
///
/// Kinds that only matter to the tokenizer itself (operators, literals)
/// are grouped into coarse buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `<?php` or `<?=`.
    OpenTag,
    /// `?>`.
    CloseTag,
    /// Text outside of PHP tags.
    InlineHtml,
    /// `$name`.
    Variable,
    /// `public`, `protected`, `private`.
    Visibility(Visibility),
    Static,
    Readonly,
    /// Legacy `var`.
    Var,
    /// `?` in front of a type.
    Nullable,
    /// `|` between type atoms.
    TypeUnion,
    /// `&` between type atoms.
    TypeIntersection,
    /// `\`.
    NsSeparator,
    /// `namespace`, both as a declaration keyword and as the
    /// `namespace\Name` relative-name operator.
    Namespace,
    /// Names and reserved type keywords (`int`, `array`, `self`, `null`...).
    Identifier,
    Class,
    Interface,
    Trait,
    Enum,
    Function,
    /// Arrow function `fn`.
    Fn,
    New,
    Use,
    Global,
    Const,
    /// Any other reserved word (`return`, `if`, `abstract`, ...).
    Keyword,
    /// `#[`.
    AttributeOpen,
    /// The `]` closing an attribute block.
    AttributeClose,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,
    OpenSquare,
    CloseSquare,
    Comma,
    Semicolon,
    Colon,
    DoubleColon,
    /// Plain assignment `=`.
    Equals,
    /// Ternary `?`.
    Question,
    /// Bitwise `|`.
    Pipe,
    /// Bitwise or by-reference `&`.
    Amp,
    /// `...`.
    Ellipsis,
    /// Any other operator.
    Operator,
    /// Single/double quoted, backtick, heredoc and nowdoc strings.
    StringLiteral,
    Number,
    Whitespace,
    /// Line, block and doc comments.
    Comment,
    /// Input the lexer could not classify.
    Unknown,
}

impl TokenKind {
    /// Whitespace and comments.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }

    /// The property modifier this kind represents, if any.
    pub fn as_modifier(self) -> Option<Modifier> {
        match self {
            TokenKind::Visibility(v) => Some(Modifier::Visibility(v)),
            TokenKind::Static => Some(Modifier::Static),
            TokenKind::Readonly => Some(Modifier::Readonly),
            TokenKind::Var => Some(Modifier::Var),
            _ => None,
        }
    }

    /// A token that contributes text to a declared type: names, `\`,
    /// `namespace`, and the union/intersection operators.
    pub fn is_type_text(self) -> bool {
        matches!(
            self,
            TokenKind::Identifier
                | TokenKind::NsSeparator
                | TokenKind::Namespace
                | TokenKind::TypeUnion
                | TokenKind::TypeIntersection
        )
    }

    /// Any token that may appear inside a declared type, including the
    /// nullable marker.
    pub fn is_type_token(self) -> bool {
        self == TokenKind::Nullable || self.is_type_text()
    }

    /// Opening bracket of any flavour, attribute openers included.
    pub fn is_opener(self) -> bool {
        matches!(
            self,
            TokenKind::OpenParen
                | TokenKind::OpenSquare
                | TokenKind::OpenCurly
                | TokenKind::AttributeOpen
        )
    }

    /// Closing bracket of any flavour, attribute closers included.
    pub fn is_closer(self) -> bool {
        matches!(
            self,
            TokenKind::CloseParen
                | TokenKind::CloseSquare
                | TokenKind::CloseCurly
                | TokenKind::AttributeClose
        )
    }
}

// ─── Scopes ─────────────────────────────────────────────────────────────────

/// Structural kind of a brace-delimited scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Class,
    Trait,
    AnonymousClass,
    Interface,
    Enum,
    Function,
    Closure,
    /// A braced `namespace Foo { ... }` block; still file level.
    Namespace,
    /// Control-flow and other non-structural braces.
    Block,
}

/// One enclosing scope of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeFrame {
    pub kind: ScopeKind,
    /// Index of the `{` token.
    pub opener_index: usize,
    /// Index of the matching `}`; `None` when the input ends first.
    pub closer_index: Option<usize>,
}

// ─── Tokens ─────────────────────────────────────────────────────────────────

/// A single token of a PHP file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw source text.
    pub text: String,
    /// Position of this token in its stream.
    pub index: usize,
    /// 1-based line the token starts on.
    pub line: u32,
    /// Enclosing scopes, outermost first.
    pub scope_stack: Vec<ScopeFrame>,
}

impl Token {
    /// The innermost enclosing frame, if any.
    pub fn innermost_scope(&self) -> Option<&ScopeFrame> {
        self.scope_stack.last()
    }
}

/// An immutable, index-addressed sequence of tokens for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Wrap an already-built token vector. Indices are renumbered so that
    /// `tokens[i].index == i` holds.
    pub fn from_tokens(mut tokens: Vec<Token>) -> Self {
        for (i, token) in tokens.iter_mut().enumerate() {
            token.index = i;
        }
        Self { tokens }
    }

    /// Tokenize PHP source text and annotate scopes.
    pub fn tokenize(source: &str) -> Self {
        crate::tokenizer::tokenize(source)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Kind of the token at `index`; `None` past the end.
    pub fn kind(&self, index: usize) -> Option<TokenKind> {
        self.tokens.get(index).map(|t| t.kind)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }
}

impl std::ops::Index<usize> for TokenStream {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.tokens[index]
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
