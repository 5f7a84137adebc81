//! Request/navigation context.
//!
//! A [`Context`] is the ordered set of lowercase tokens describing
//! where an authorization question is being asked, e.g.
//! `["dashboard", "controllers", "sales", "index"]`. Rules match
//! against it by set membership, so token order never changes an
//! answer, but order is preserved for display and derivation.

use crate::IntoTokens;
use std::fmt;

/// Immutable ordered sequence of lowercase context tokens.
///
/// Built once per permissions model and never mutated; deriving a model
/// for a different scope builds a new `Context` instead. Construction
/// normalizes through [`IntoTokens`], so callers may pass mixed-case
/// strings, arrays, or already-parsed JSON.
///
/// # Example
///
/// ```
/// use rolegate_types::Context;
///
/// let ctx = Context::new(["Dashboard", "Sales", "Index"]);
/// assert!(ctx.contains("sales"));
/// assert!(!ctx.contains("export"));
/// assert_eq!(ctx.tokens(), ["dashboard", "sales", "index"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Context {
    tokens: Vec<String>,
}

impl Context {
    /// Creates a context from any token input.
    #[must_use]
    pub fn new(tokens: impl IntoTokens) -> Self {
        Self {
            tokens: tokens.into_tokens(),
        }
    }

    /// Returns `true` if `token` is one of the context tokens.
    ///
    /// Callers are expected to pass lowercase tokens; rule evaluation
    /// always does, since patterns are normalized at construction.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// The normalized tokens, in input order.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if the context carries no tokens.
    ///
    /// An empty context is valid: `only` rules deny and `except` rules
    /// allow against it.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterates over the tokens.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens.join(","))
    }
}

/// A context is already normalized; reusing it as token input is a
/// plain copy.
impl IntoTokens for &Context {
    fn into_tokens(self) -> Vec<String> {
        self.tokens.clone()
    }
}

impl IntoTokens for Context {
    fn into_tokens(self) -> Vec<String> {
        self.tokens
    }
}
