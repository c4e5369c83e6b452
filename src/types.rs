//! Data types produced by the member-property resolver.
//!
//! This module contains the "model" structs and enums that describe a
//! resolved PHP property declaration (visibility, modifiers, declared
//! type) as well as the modifier enumeration the backward scanner
//! collects before folding it into a descriptor.

use serde::Serialize;

/// Visibility of a class member.
///
/// In PHP, members without an explicit visibility modifier default to `Public`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    /// The keyword as written in source, lowercased.
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single modifier keyword found in front of a property declaration.
///
/// The legacy `var` keyword is kept as its own case: it declares a
/// property but never counts as an explicitly specified visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// `public`, `protected` or `private`.
    Visibility(Visibility),
    /// `static`.
    Static,
    /// `readonly` (PHP 8.1+).
    Readonly,
    /// Legacy PHP 4 `var`.
    Var,
}

/// Modifiers folded from a declaration prefix.
///
/// Built by [`ModifierSet::from_source_order`]; when several visibility
/// keywords appear on one (malformed) declaration, the one written last,
/// i.e. nearest the variable, wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierSet {
    pub visibility: Option<Visibility>,
    pub is_static: bool,
    pub is_readonly: bool,
    pub is_var: bool,
}

impl ModifierSet {
    /// Fold modifiers given in source order (left to right).
    pub fn from_source_order(modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        let mut set = ModifierSet::default();
        for modifier in modifiers {
            match modifier {
                Modifier::Visibility(v) => set.visibility = Some(v),
                Modifier::Static => set.is_static = true,
                Modifier::Readonly => set.is_readonly = true,
                Modifier::Var => set.is_var = true,
            }
        }
        set
    }

    /// Effective visibility: the declared one, or `Public` by default.
    pub fn scope(&self) -> Visibility {
        self.visibility.unwrap_or(Visibility::Public)
    }

    /// Whether a visibility keyword was written. `var` does not count.
    pub fn scope_specified(&self) -> bool {
        self.visibility.is_some()
    }
}

/// Everything the resolver recovers about one property declaration.
///
/// Serializes with the key names rule engines already expect
/// (`scope`, `scope_specified`, `type`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyDescriptor {
    /// Effective visibility (`Public` when none was written).
    pub scope: Visibility,
    /// Whether a `public`/`protected`/`private` keyword was present.
    pub scope_specified: bool,
    /// Whether the property is static.
    pub is_static: bool,
    /// Whether the property is readonly.
    pub is_readonly: bool,
    /// Declared type as written, with whitespace and comments removed
    /// (e.g. `"?string"`, `"int|float"`, `"\Foo\Bar"`). Empty when untyped.
    #[serde(rename = "type")]
    pub type_hint: String,
    /// Index of the first token of the declared type, if any.
    pub type_token: Option<usize>,
    /// Index of the last token of the declared type, if any.
    pub type_end_token: Option<usize>,
    /// Whether the type carries a `?` nullable marker.
    pub nullable_type: bool,
}

impl PropertyDescriptor {
    pub(crate) fn new(modifiers: ModifierSet, collected: crate::resolver::CollectedType) -> Self {
        Self {
            scope: modifiers.scope(),
            scope_specified: modifiers.scope_specified(),
            is_static: modifiers.is_static,
            is_readonly: modifiers.is_readonly,
            type_hint: collected.text,
            type_token: collected.first_token,
            type_end_token: collected.last_token,
            nullable_type: collected.nullable,
        }
    }
}
