//! Type tokens used to key service registrations and lookups.
//!
//! A [`Token`] identifies what a descriptor provides. It is either a
//! TypeId-backed token derived from a concrete type ([`Token::of`]) or a
//! string-named token ([`Token::named`]). Type tokens compare and hash on
//! their [`TypeId`] only; the carried type name is diagnostics-only. Grounded
//! on the teacher's `Key` (`examples/s1ntropy-ferrous-di/src/key.rs`), whose
//! named/multi-trait variants collapse here into a single `Named` variant
//! because multiple registrations under one token are first-class descriptor
//! lists rather than key variants.

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifies a registered service for storage and lookup.
///
/// # Examples
///
/// ```
/// use anvil_di::Token;
///
/// let a = Token::of::<String>();
/// let b = Token::of::<String>();
/// assert_eq!(a, b);
///
/// let named = Token::named("base-url");
/// assert_ne!(a, named);
/// assert_eq!(named.display_name(), "base-url");
/// ```
#[derive(Debug, Clone, Copy)]
pub enum Token {
    /// A concrete-type token: its [`TypeId`] plus the type name for diagnostics.
    Type(TypeId, &'static str),
    /// A string-named token.
    Named(&'static str),
}

impl Token {
    /// Creates a type token for `T`.
    pub fn of<T: 'static>() -> Self {
        Token::Type(TypeId::of::<T>(), type_name::<T>())
    }

    /// Creates a string-named token.
    pub fn named(name: &'static str) -> Self {
        Token::Named(name)
    }

    /// The human-readable name of this token, for diagnostics and error
    /// messages. For type tokens this is [`std::any::type_name`]; for named
    /// tokens it is the supplied name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Token::Type(_, name) => name,
            Token::Named(name) => name,
        }
    }
}

// TypeId-only equality for type tokens (the name is diagnostics-only).
impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Token::Type(a, _), Token::Type(b, _)) => a == b,
            (Token::Named(a), Token::Named(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Token {}

// TypeId-only hash for type tokens, matching the equality above.
impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Token::Type(id, _) => {
                0u8.hash(state);
                id.hash(state);
            }
            Token::Named(name) => {
                1u8.hash(state);
                name.hash(state);
            }
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
