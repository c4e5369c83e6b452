//! Structural context of a token.

use crate::tokens::{ScopeFrame, ScopeKind, Token};

/// What kind of structure directly owns a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScopeContext {
    /// Class, trait or anonymous class body.
    ClassLike,
    /// Interface or enum body.
    InterfaceOrEnum,
    /// Function, method or closure body.
    FunctionLike,
    /// Not inside any structural scope.
    FileLevel,
}

/// Classify `token` by its innermost structural frame.
///
/// Control-flow blocks and braced namespaces are transparent: a variable
/// inside an `if` inside a method is still function-like.
pub(crate) fn classify(token: &Token) -> ScopeContext {
    match innermost_structural(token).map(|frame| frame.kind) {
        Some(ScopeKind::Class | ScopeKind::Trait | ScopeKind::AnonymousClass) => {
            ScopeContext::ClassLike
        }
        Some(ScopeKind::Interface | ScopeKind::Enum) => ScopeContext::InterfaceOrEnum,
        Some(ScopeKind::Function | ScopeKind::Closure) => ScopeContext::FunctionLike,
        Some(ScopeKind::Block | ScopeKind::Namespace) | None => ScopeContext::FileLevel,
    }
}

/// Innermost enclosing frame that is not a block or namespace.
pub(crate) fn innermost_structural(token: &Token) -> Option<&ScopeFrame> {
    token
        .scope_stack
        .iter()
        .rev()
        .find(|frame| !matches!(frame.kind, ScopeKind::Block | ScopeKind::Namespace))
}

// ─── Tests ──────────────────────────────────────────────────────────────────
