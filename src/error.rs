//! Error types.
//!
//! [`MemberPropertyError`] is what [`crate::get_member_properties`]
//! returns when it cannot produce a descriptor.  A caller passing the
//! wrong token is a programming error; a variable that simply is not a
//! property is expected, and rule code usually treats it as "not
//! applicable".

use std::fmt;

use thiserror::Error;

use crate::tokens::TokenKind;

/// Why a variable was judged not to be a property declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Element of a function, method or closure parameter list.
    Parameter,
    /// Variable imported into a closure with `use (...)`.
    ClosureUse,
    /// Operand of a `global` statement.
    GlobalStatement,
    /// Part of an expression: a default value, an assignment, a call.
    Expression,
    /// Inside a function body or at file level.
    NotInClass,
    /// The scan ran off the start of the stream.
    MissingBoundary,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectReason::Parameter => "parameter",
            RejectReason::ClosureUse => "closure use import",
            RejectReason::GlobalStatement => "global statement",
            RejectReason::Expression => "expression",
            RejectReason::NotInClass => "not in a class-like scope",
            RejectReason::MissingBoundary => "no declaration start",
        };
        f.write_str(s)
    }
}

/// Failure of [`crate::get_member_properties`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemberPropertyError {
    /// The index does not point at a variable token (or is out of range).
    #[error("token {index} must be a variable")]
    WrongTokenKind {
        index: usize,
        /// Kind actually found; `None` when `index` is out of range.
        found: Option<TokenKind>,
    },

    /// The variable is valid but is not a class member declaration.
    #[error("token {index} is not a class member var ({reason})")]
    NotClassProperty { index: usize, reason: RejectReason },
}

impl MemberPropertyError {
    /// Whether this is the expected "not a property" case rather than a
    /// caller bug.
    pub fn is_not_class_property(&self) -> bool {
        matches!(self, MemberPropertyError::NotClassProperty { .. })
    }
}

/// Failure to load a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}
