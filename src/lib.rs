//! Token-level resolution of PHP class property declarations.
//!
//! Given a tokenized PHP file and the index of a `$variable` token,
//! [`get_member_properties`] reports whether that variable declares a
//! class, trait or anonymous-class property, and if so its visibility,
//! `static`/`readonly` modifiers and declared type:
//!
//! ```
//! use php_member_props::{TokenStream, Visibility, get_member_properties};
//!
//! let stream = TokenStream::tokenize("<?php class A { protected static ?int $count = 0; }");
//! let index = stream
//!     .iter()
//!     .position(|t| t.text == "$count")
//!     .unwrap();
//!
//! let props = get_member_properties(&stream, index).unwrap().unwrap();
//! assert_eq!(props.scope, Visibility::Protected);
//! assert!(props.is_static);
//! assert_eq!(props.type_hint, "?int");
//! ```
//!
//! The crate is organised as:
//!
//! - [`tokenizer`]: a `logos` lexer for PHP source plus the contextual
//!   passes (attribute markers, nullable `?`, union/intersection bars,
//!   keyword demotion) that turn raw lexemes into a [`TokenStream`].
//! - `scopes`: annotates every token with the stack of class, function,
//!   closure and block scopes enclosing it.
//! - [`resolver`]: the backward declaration scanner and type collector.
//! - [`config`]: TOML configuration for the `php-member-props` binary.

pub mod config;
pub mod error;
pub mod resolver;
mod scopes;
pub mod tokenizer;
pub mod tokens;
pub mod types;

pub use config::{Config, OutputFormat};
pub use error::{ConfigError, MemberPropertyError, RejectReason};
pub use resolver::{get_member_properties, resolve_all};
pub use tokens::{ScopeFrame, ScopeKind, Token, TokenKind, TokenStream};
pub use types::{Modifier, ModifierSet, PropertyDescriptor, Visibility};
