//! Member-property resolution.
//!
//! [`get_member_properties`] decides whether a variable token declares a
//! class property and, if so, what its modifiers and declared type are.
//! It works on the flat token array only, without a parse tree:
//!
//!   1. classify the variable by its innermost structural scope;
//!   2. scan backward to the modifiers and the start of the declaration
//!      (hopping to the first member of a group);
//!   3. collect the type forward from the last modifier to the first
//!      member;
//!   4. fold everything into a [`PropertyDescriptor`].
//!
//! Every call is a pure function of the stream and the index, so a
//! stream can be shared between threads and resolved concurrently.

mod classify;
mod scanner;
mod skip;
mod type_expr;

pub(crate) use type_expr::CollectedType;

use classify::{ScopeContext, classify};
use scanner::scan_declaration;
use type_expr::collect_type;

use crate::error::{MemberPropertyError, RejectReason};
use crate::tokens::{ScopeKind, TokenKind, TokenStream};
use crate::types::PropertyDescriptor;

/// Resolve the property declared by the variable at `index`.
///
/// Returns:
///   - `Ok(Some(descriptor))` for a class, trait or anonymous class
///     property;
///   - `Ok(None)` for a variable in an interface or enum body, which can
///     not hold properties (a warning is logged, as this is most likely a
///     parse error in the file);
///   - `Err(NotClassProperty)` for parameters, closure imports, `global`
///     operands, local variables and variables used inside expressions;
///   - `Err(WrongTokenKind)` when `index` is not a variable token.
pub fn get_member_properties(
    stream: &TokenStream,
    index: usize,
) -> Result<Option<PropertyDescriptor>, MemberPropertyError> {
    let tokens = stream.as_slice();
    let token = match tokens.get(index) {
        Some(token) if token.kind == TokenKind::Variable => token,
        other => {
            return Err(MemberPropertyError::WrongTokenKind {
                index,
                found: other.map(|t| t.kind),
            });
        }
    };

    let not_property = |reason: RejectReason| {
        tracing::debug!(index, variable = %token.text, %reason, "not a class member var");
        MemberPropertyError::NotClassProperty { index, reason }
    };

    match classify(token) {
        ScopeContext::FunctionLike | ScopeContext::FileLevel => {
            Err(not_property(RejectReason::NotInClass))
        }
        ScopeContext::InterfaceOrEnum => match scan_declaration(tokens, index) {
            // Abstract method parameters have no body scope around them.
            Err(reason @ (RejectReason::Parameter | RejectReason::ClosureUse)) => {
                Err(not_property(reason))
            }
            _ => {
                let owner = match classify::innermost_structural(token).map(|f| f.kind) {
                    Some(ScopeKind::Enum) => "enum",
                    _ => "interface",
                };
                tracing::warn!(
                    index,
                    line = token.line,
                    variable = %token.text,
                    "possible parse error: {owner}s may not include member vars"
                );
                Ok(None)
            }
        },
        ScopeContext::ClassLike => {
            let prefix = scan_declaration(tokens, index).map_err(not_property)?;
            let collected = collect_type(tokens, prefix.type_start(), prefix.leader);
            let descriptor = PropertyDescriptor::new(prefix.modifier_set(), collected);
            tracing::debug!(
                index,
                variable = %token.text,
                scope = %descriptor.scope,
                type_hint = %descriptor.type_hint,
                "resolved member property"
            );
            Ok(Some(descriptor))
        }
    }
}

/// Resolve every variable token of `stream`, in order.
pub fn resolve_all(
    stream: &TokenStream,
) -> impl Iterator<Item = (usize, Result<Option<PropertyDescriptor>, MemberPropertyError>)> + '_ {
    stream
        .iter()
        .filter(|t| t.kind == TokenKind::Variable)
        .map(move |t| (t.index, get_member_properties(stream, t.index)))
}
