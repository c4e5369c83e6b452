//! PHP tokenizer producing a [`TokenStream`].
//!
//! Lexing happens in three passes:
//!
//!   1. **Tag splitting and lexing.**  Inline HTML is split from PHP code
//!      at `<?php` / `<?=` / `?>` boundaries (located with `memchr`), and
//!      each PHP segment is lexed with a `logos` lexer.  Strings,
//!      heredocs and comments come out as single opaque tokens.
//!   2. **Contextual retokenization.**  A flat lexer cannot tell a
//!      nullable `?` from a ternary `?`, or a union `|` from a bitwise one,
//!      so these are decided here by looking at the surrounding
//!      significant tokens.  Attribute closers are matched and keywords
//!      used as names are demoted to identifiers.
//!   3. **Scope annotation**, done by the `scopes` module.
//!
//! The tokenizer never fails.  Input it cannot classify becomes
//! [`TokenKind::Unknown`], and unterminated strings or comments run to
//! the end of their PHP segment.

use logos::Logos;
use memchr::memmem;

use crate::scopes;
use crate::tokens::{Token, TokenKind, TokenStream};
use crate::types::Visibility;

// ─── Raw lexer ──────────────────────────────────────────────────────────────

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
    #[regex(r"[ \t\r\n\x0C]+")]
    Whitespace,

    #[token("//", line_comment)]
    #[token("#", line_comment)]
    #[token("/*", block_comment)]
    Comment,

    #[token("#[")]
    AttributeOpen,

    #[regex(r"\$[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*")]
    Variable,

    #[regex(r"[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*")]
    Name,

    #[regex(r"[0-9][0-9a-zA-Z_]*(\.[0-9_]*)?")]
    #[regex(r"\.[0-9][0-9_]*")]
    Number,

    #[token("'", single_quoted)]
    #[token("\"", double_quoted)]
    #[token("`", backtick)]
    #[token("<<<", heredoc)]
    StringLiteral,

    #[token("?>")]
    CloseTag,

    #[token("{")]
    OpenCurly,
    #[token("}")]
    CloseCurly,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("[")]
    OpenSquare,
    #[token("]")]
    CloseSquare,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token("::")]
    DoubleColon,
    #[token("=")]
    Equals,
    #[token("?")]
    Question,
    #[token("|")]
    Pipe,
    #[token("&")]
    Amp,
    #[token("\\")]
    Backslash,
    #[token("...")]
    Ellipsis,

    #[token("->")]
    #[token("?->")]
    #[token("=>")]
    #[token("==")]
    #[token("===")]
    #[token("!=")]
    #[token("!==")]
    #[token("<>")]
    #[token("<")]
    #[token(">")]
    #[token("<=")]
    #[token(">=")]
    #[token("<=>")]
    #[token("??")]
    #[token("??=")]
    #[token("||")]
    #[token("&&")]
    #[token("|=")]
    #[token("&=")]
    #[token("^=")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token(".=")]
    #[token("%=")]
    #[token("**=")]
    #[token("<<=")]
    #[token(">>=")]
    #[token("<<")]
    #[token(">>")]
    #[token("**")]
    #[token("++")]
    #[token("--")]
    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("/")]
    #[token("%")]
    #[token(".")]
    #[token("!")]
    #[token("~")]
    #[token("^")]
    #[token("@")]
    #[token("$")]
    Operator,
}

/// `//` and `#` comments stop at the end of the line or before a `?>`.
fn line_comment(lex: &mut logos::Lexer<RawToken>) -> bool {
    let rest = lex.remainder().as_bytes();
    let line = memchr::memchr(b'\n', rest).unwrap_or(rest.len());
    let len = memmem::find(&rest[..line], b"?>").unwrap_or(line);
    lex.bump(len);
    true
}

/// `/* ... */` and `/** ... */`; runs to end of input when unterminated.
fn block_comment(lex: &mut logos::Lexer<RawToken>) -> bool {
    let rest = lex.remainder().as_bytes();
    let len = memmem::find(rest, b"*/").map_or(rest.len(), |i| i + 2);
    lex.bump(len);
    true
}

/// Length of a quoted string body up to and including `quote`, honouring
/// backslash escapes.
fn quoted_len(rest: &[u8], quote: u8) -> usize {
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            b'\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    rest.len()
}

fn single_quoted(lex: &mut logos::Lexer<RawToken>) -> bool {
    let len = quoted_len(lex.remainder().as_bytes(), b'\'');
    lex.bump(len);
    true
}

fn double_quoted(lex: &mut logos::Lexer<RawToken>) -> bool {
    let len = quoted_len(lex.remainder().as_bytes(), b'"');
    lex.bump(len);
    true
}

fn backtick(lex: &mut logos::Lexer<RawToken>) -> bool {
    let len = quoted_len(lex.remainder().as_bytes(), b'`');
    lex.bump(len);
    true
}

/// Heredoc / nowdoc: `<<<LABEL`, `<<<"LABEL"` or `<<<'LABEL'`, closed by
/// the label at the start of a line (indentation allowed).
fn heredoc(lex: &mut logos::Lexer<RawToken>) -> bool {
    let rest = lex.remainder().as_bytes();
    let mut i = 0;
    while i < rest.len() && (rest[i] == b' ' || rest[i] == b'\t') {
        i += 1;
    }
    let quote = match rest.get(i) {
        Some(&q @ (b'"' | b'\'')) => {
            i += 1;
            Some(q)
        }
        _ => None,
    };
    let label_start = i;
    while i < rest.len() && (rest[i].is_ascii_alphanumeric() || rest[i] == b'_' || rest[i] >= 0x80)
    {
        i += 1;
    }
    if i == label_start {
        // `<<<` with no label: not a heredoc.
        return false;
    }
    let label = &rest[label_start..i];
    if let Some(q) = quote {
        if rest.get(i) != Some(&q) {
            return false;
        }
        i += 1;
    }

    // Search line by line for the closing label.
    let mut line_start = match memchr::memchr(b'\n', &rest[i..]) {
        Some(nl) => i + nl + 1,
        None => {
            lex.bump(rest.len());
            return true;
        }
    };
    loop {
        let mut j = line_start;
        while j < rest.len() && (rest[j] == b' ' || rest[j] == b'\t') {
            j += 1;
        }
        if rest[j..].starts_with(label) {
            let end = j + label.len();
            let boundary = rest
                .get(end)
                .is_none_or(|c| !(c.is_ascii_alphanumeric() || *c == b'_' || *c >= 0x80));
            if boundary {
                lex.bump(end);
                return true;
            }
        }
        match memchr::memchr(b'\n', &rest[line_start..]) {
            Some(nl) => line_start += nl + 1,
            None => {
                lex.bump(rest.len());
                return true;
            }
        }
    }
}

// ─── Keywords ───────────────────────────────────────────────────────────────

/// Reserved words with their kinds.  Anything not listed (including type
/// keywords such as `int`, `array`, `self`, `null`) is an identifier.
const KEYWORDS: &[(&str, TokenKind)] = &[
    ("public", TokenKind::Visibility(Visibility::Public)),
    ("protected", TokenKind::Visibility(Visibility::Protected)),
    ("private", TokenKind::Visibility(Visibility::Private)),
    ("static", TokenKind::Static),
    ("readonly", TokenKind::Readonly),
    ("var", TokenKind::Var),
    ("namespace", TokenKind::Namespace),
    ("class", TokenKind::Class),
    ("interface", TokenKind::Interface),
    ("trait", TokenKind::Trait),
    ("enum", TokenKind::Enum),
    ("function", TokenKind::Function),
    ("fn", TokenKind::Fn),
    ("new", TokenKind::New),
    ("use", TokenKind::Use),
    ("global", TokenKind::Global),
    ("const", TokenKind::Const),
    ("abstract", TokenKind::Keyword),
    ("final", TokenKind::Keyword),
    ("extends", TokenKind::Keyword),
    ("implements", TokenKind::Keyword),
    ("insteadof", TokenKind::Keyword),
    ("instanceof", TokenKind::Keyword),
    ("as", TokenKind::Keyword),
    ("return", TokenKind::Keyword),
    ("yield", TokenKind::Keyword),
    ("if", TokenKind::Keyword),
    ("else", TokenKind::Keyword),
    ("elseif", TokenKind::Keyword),
    ("endif", TokenKind::Keyword),
    ("while", TokenKind::Keyword),
    ("endwhile", TokenKind::Keyword),
    ("do", TokenKind::Keyword),
    ("for", TokenKind::Keyword),
    ("endfor", TokenKind::Keyword),
    ("foreach", TokenKind::Keyword),
    ("endforeach", TokenKind::Keyword),
    ("switch", TokenKind::Keyword),
    ("endswitch", TokenKind::Keyword),
    ("case", TokenKind::Keyword),
    ("default", TokenKind::Keyword),
    ("break", TokenKind::Keyword),
    ("continue", TokenKind::Keyword),
    ("match", TokenKind::Keyword),
    ("try", TokenKind::Keyword),
    ("catch", TokenKind::Keyword),
    ("finally", TokenKind::Keyword),
    ("throw", TokenKind::Keyword),
    ("echo", TokenKind::Keyword),
    ("print", TokenKind::Keyword),
    ("clone", TokenKind::Keyword),
    ("goto", TokenKind::Keyword),
    ("declare", TokenKind::Keyword),
    ("enddeclare", TokenKind::Keyword),
    ("include", TokenKind::Keyword),
    ("include_once", TokenKind::Keyword),
    ("require", TokenKind::Keyword),
    ("require_once", TokenKind::Keyword),
    ("isset", TokenKind::Keyword),
    ("unset", TokenKind::Keyword),
    ("empty", TokenKind::Keyword),
    ("list", TokenKind::Keyword),
    ("exit", TokenKind::Keyword),
    ("die", TokenKind::Keyword),
    ("eval", TokenKind::Keyword),
    ("and", TokenKind::Keyword),
    ("or", TokenKind::Keyword),
    ("xor", TokenKind::Keyword),
];

fn keyword_kind(name: &str) -> TokenKind {
    KEYWORDS
        .iter()
        .find(|(kw, _)| kw.eq_ignore_ascii_case(name))
        .map_or(TokenKind::Identifier, |&(_, kind)| kind)
}

/// Whether `kind` came from a reserved word and may be demoted to a name.
fn is_word(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier
            | TokenKind::Visibility(_)
            | TokenKind::Static
            | TokenKind::Readonly
            | TokenKind::Var
            | TokenKind::Namespace
            | TokenKind::Class
            | TokenKind::Interface
            | TokenKind::Trait
            | TokenKind::Enum
            | TokenKind::Function
            | TokenKind::Fn
            | TokenKind::New
            | TokenKind::Use
            | TokenKind::Global
            | TokenKind::Const
            | TokenKind::Keyword
    )
}

fn raw_kind(raw: RawToken, text: &str) -> TokenKind {
    match raw {
        RawToken::Whitespace => TokenKind::Whitespace,
        RawToken::Comment => TokenKind::Comment,
        RawToken::AttributeOpen => TokenKind::AttributeOpen,
        RawToken::Variable => TokenKind::Variable,
        RawToken::Name => keyword_kind(text),
        RawToken::Number => TokenKind::Number,
        RawToken::StringLiteral => TokenKind::StringLiteral,
        RawToken::CloseTag => TokenKind::CloseTag,
        RawToken::OpenCurly => TokenKind::OpenCurly,
        RawToken::CloseCurly => TokenKind::CloseCurly,
        RawToken::OpenParen => TokenKind::OpenParen,
        RawToken::CloseParen => TokenKind::CloseParen,
        RawToken::OpenSquare => TokenKind::OpenSquare,
        RawToken::CloseSquare => TokenKind::CloseSquare,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Colon => TokenKind::Colon,
        RawToken::DoubleColon => TokenKind::DoubleColon,
        RawToken::Equals => TokenKind::Equals,
        RawToken::Question => TokenKind::Question,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::Amp => TokenKind::Amp,
        RawToken::Backslash => TokenKind::NsSeparator,
        RawToken::Ellipsis => TokenKind::Ellipsis,
        RawToken::Operator => TokenKind::Operator,
    }
}

// ─── Pass 1: tags and lexing ────────────────────────────────────────────────

/// A token before scope annotation: kind plus byte range.
#[derive(Debug, Clone, Copy)]
struct Lexeme {
    kind: TokenKind,
    start: usize,
    end: usize,
}

/// Find the next PHP open tag in `haystack`: `(offset, tag_len)`.
fn find_open_tag(haystack: &str) -> Option<(usize, usize)> {
    let bytes = haystack.as_bytes();
    let finder = memmem::Finder::new(b"<?");
    let mut from = 0;
    while let Some(found) = finder.find(&bytes[from..]) {
        let at = from + found;
        let after = &bytes[at + 2..];
        if after.first() == Some(&b'=') {
            return Some((at, 3));
        }
        if after.len() >= 3 && after[..3].eq_ignore_ascii_case(b"php") {
            let boundary = after.get(3).is_none_or(|c| c.is_ascii_whitespace());
            if boundary {
                return Some((at, 5));
            }
        }
        from = at + 2;
    }
    None
}

fn lex(source: &str) -> Vec<Lexeme> {
    let mut out = Vec::new();
    let mut pos = 0;

    while pos < source.len() {
        // Inline HTML up to the next open tag.
        match find_open_tag(&source[pos..]) {
            None => {
                out.push(Lexeme {
                    kind: TokenKind::InlineHtml,
                    start: pos,
                    end: source.len(),
                });
                break;
            }
            Some((offset, tag_len)) => {
                if offset > 0 {
                    out.push(Lexeme {
                        kind: TokenKind::InlineHtml,
                        start: pos,
                        end: pos + offset,
                    });
                }
                out.push(Lexeme {
                    kind: TokenKind::OpenTag,
                    start: pos + offset,
                    end: pos + offset + tag_len,
                });
                pos += offset + tag_len;
            }
        }

        // PHP code up to `?>` or end of input.
        let segment = &source[pos..];
        let mut lexer = RawToken::lexer(segment);
        let mut next_pos = source.len();
        while let Some(result) = lexer.next() {
            let span = lexer.span();
            let (start, end) = (pos + span.start, pos + span.end);
            let kind = match result {
                Ok(raw) => raw_kind(raw, &source[start..end]),
                Err(()) => TokenKind::Unknown,
            };
            out.push(Lexeme { kind, start, end });
            if kind == TokenKind::CloseTag {
                next_pos = end;
                break;
            }
        }
        pos = next_pos;
    }

    out
}

// ─── Pass 2: contextual retokenization ──────────────────────────────────────

/// A token that can start or continue a type: names, `\`, `namespace`,
/// and `static` (valid as a return type).
fn is_type_atom(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier | TokenKind::NsSeparator | TokenKind::Namespace | TokenKind::Static
    )
}

struct Retokenizer<'a> {
    source: &'a str,
    lexemes: Vec<Lexeme>,
    /// Positions in `lexemes` of non-trivia tokens.
    significant: Vec<usize>,
}

impl<'a> Retokenizer<'a> {
    fn new(source: &'a str, lexemes: Vec<Lexeme>) -> Self {
        let significant = lexemes
            .iter()
            .enumerate()
            .filter(|(_, l)| !l.kind.is_trivia())
            .map(|(i, _)| i)
            .collect();
        Self {
            source,
            lexemes,
            significant,
        }
    }

    /// Kind of the `n`th significant token.
    fn kind_at(&self, n: usize) -> Option<TokenKind> {
        self.significant.get(n).map(|&i| self.lexemes[i].kind)
    }

    fn text_at(&self, n: usize) -> &str {
        let l = self.lexemes[self.significant[n]];
        &self.source[l.start..l.end]
    }

    fn set_kind(&mut self, n: usize, kind: TokenKind) {
        let i = self.significant[n];
        self.lexemes[i].kind = kind;
    }

    fn prev_kind(&self, n: usize) -> Option<TokenKind> {
        n.checked_sub(1).and_then(|p| self.kind_at(p))
    }

    /// Whether the `n`th significant token is glued to a `\` on its left
    /// (`before`) or right, with nothing in between.
    fn glued_to_separator(&self, n: usize, before: bool) -> bool {
        let i = self.significant[n];
        let neighbour = if before { i.checked_sub(1) } else { Some(i + 1) };
        neighbour
            .and_then(|j| self.lexemes.get(j))
            .is_some_and(|l| l.kind == TokenKind::NsSeparator)
    }

    fn run(mut self) -> Vec<Lexeme> {
        self.demote_keywords();
        self.match_attributes();
        self.mark_nullables();
        self.mark_type_operators();
        self.lexemes
    }

    /// Reserved words used as names become identifiers: member names after
    /// `->`/`::`, function and constant names, segments of qualified names
    /// (`\App\Abstract\Base`), and `enum` and `readonly` when they are
    /// not declarations.
    fn demote_keywords(&mut self) {
        for n in 0..self.significant.len() {
            let Some(kind) = self.kind_at(n) else { continue };
            if !is_word(kind) || kind == TokenKind::Identifier {
                continue;
            }
            let after_member_access = match self.prev_kind(n) {
                Some(TokenKind::DoubleColon) => true,
                Some(TokenKind::Operator) => matches!(self.text_at(n - 1), "->" | "?->"),
                _ => false,
            };
            let after_declarator = match self.prev_kind(n) {
                Some(TokenKind::Function | TokenKind::Const) => true,
                Some(TokenKind::Amp) => {
                    n >= 2 && self.kind_at(n - 2) == Some(TokenKind::Function)
                }
                _ => false,
            };
            // `namespace\Name` is the relative-name operator, not a segment.
            let name_segment = self.glued_to_separator(n, true)
                || (kind != TokenKind::Namespace && self.glued_to_separator(n, false));
            let next = self.kind_at(n + 1);
            let demote = after_member_access
                || after_declarator
                || name_segment
                || (kind == TokenKind::Enum && !next.is_some_and(is_word))
                || (kind == TokenKind::Readonly && next == Some(TokenKind::OpenParen));
            if demote {
                self.set_kind(n, TokenKind::Identifier);
            }
        }
    }

    /// Mark the `]` that closes each `#[` as an attribute closer.
    fn match_attributes(&mut self) {
        let mut stack: Vec<bool> = Vec::new();
        for n in 0..self.significant.len() {
            match self.kind_at(n) {
                Some(TokenKind::AttributeOpen) => stack.push(true),
                Some(TokenKind::OpenSquare) => stack.push(false),
                Some(TokenKind::CloseSquare) => {
                    if stack.pop() == Some(true) {
                        self.set_kind(n, TokenKind::AttributeClose);
                    }
                }
                _ => {}
            }
        }
    }

    /// First significant position after the type chain starting at `n`.
    fn chain_end(&self, mut n: usize) -> usize {
        while let Some(kind) = self.kind_at(n) {
            let continues = match kind {
                k if is_type_atom(k) => true,
                TokenKind::Nullable | TokenKind::TypeUnion | TokenKind::TypeIntersection => true,
                TokenKind::Pipe => true,
                TokenKind::Amp => self.kind_at(n + 1).is_some_and(is_type_atom),
                _ => false,
            };
            if !continues {
                break;
            }
            n += 1;
        }
        n
    }

    /// First significant position of the type chain ending just before `n`.
    fn chain_start(&self, mut n: usize) -> usize {
        while n > 0 {
            let kind = self.kind_at(n - 1);
            let continues = matches!(
                kind,
                Some(TokenKind::Nullable | TokenKind::TypeUnion | TokenKind::TypeIntersection)
                    | Some(TokenKind::Pipe | TokenKind::Amp)
            ) || kind.is_some_and(is_type_atom);
            if !continues {
                break;
            }
            n -= 1;
        }
        n
    }

    /// A chain followed by a variable, `...` or a by-reference `&$x` is a
    /// property or parameter type.
    fn ends_at_declared_name(&self, end: usize) -> bool {
        match self.kind_at(end) {
            Some(TokenKind::Variable | TokenKind::Ellipsis) => true,
            Some(TokenKind::Amp) => matches!(
                self.kind_at(end + 1),
                Some(TokenKind::Variable | TokenKind::Ellipsis)
            ),
            _ => false,
        }
    }

    /// A chain right after `):` is a return type.
    fn follows_return_colon(&self, start: usize) -> bool {
        start >= 2
            && self.kind_at(start - 1) == Some(TokenKind::Colon)
            && self.kind_at(start - 2) == Some(TokenKind::CloseParen)
    }

    fn mark_nullables(&mut self) {
        for n in 0..self.significant.len() {
            if self.kind_at(n) != Some(TokenKind::Question) {
                continue;
            }
            if !self.kind_at(n + 1).is_some_and(is_type_atom) {
                continue;
            }
            // `FOO ? BAR : BAZ` and `$a ? B : C` are ternaries.
            let after_value = matches!(
                self.prev_kind(n),
                Some(
                    TokenKind::Identifier
                        | TokenKind::Variable
                        | TokenKind::CloseParen
                        | TokenKind::CloseSquare
                        | TokenKind::StringLiteral
                        | TokenKind::Number
                )
            );
            if after_value {
                continue;
            }
            let end = self.chain_end(n + 1);
            if self.ends_at_declared_name(end) || self.follows_return_colon(n) {
                self.set_kind(n, TokenKind::Nullable);
            }
        }
    }

    fn mark_type_operators(&mut self) {
        for n in 0..self.significant.len() {
            let kind = self.kind_at(n);
            if !matches!(kind, Some(TokenKind::Pipe | TokenKind::Amp)) {
                continue;
            }
            let between_atoms = self.prev_kind(n).is_some_and(is_type_atom)
                && self.kind_at(n + 1).is_some_and(is_type_atom);
            if !between_atoms {
                continue;
            }
            let start = self.chain_start(n);
            let end = self.chain_end(n);
            if self.ends_at_declared_name(end) || self.follows_return_colon(start) {
                let typed = if kind == Some(TokenKind::Pipe) {
                    TokenKind::TypeUnion
                } else {
                    TokenKind::TypeIntersection
                };
                self.set_kind(n, typed);
            }
        }
    }
}

// ─── Entry point ────────────────────────────────────────────────────────────

/// Tokenize `source` into an annotated [`TokenStream`].
pub fn tokenize(source: &str) -> TokenStream {
    let lexemes = Retokenizer::new(source, lex(source)).run();

    let mut line: u32 = 1;
    let mut tokens = Vec::with_capacity(lexemes.len());
    for (index, lexeme) in lexemes.iter().enumerate() {
        let text = &source[lexeme.start..lexeme.end];
        tokens.push(Token {
            kind: lexeme.kind,
            text: text.to_string(),
            index,
            line,
            scope_stack: Vec::new(),
        });
        line += memchr::memchr_iter(b'\n', text.as_bytes()).count() as u32;
    }

    scopes::annotate(&mut tokens);
    tracing::trace!(tokens = tokens.len(), "tokenized");
    TokenStream::from_tokens(tokens)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
