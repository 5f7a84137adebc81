//! Role and rule data model.
//!
//! A role grants features through per-feature rules:
//!
//! ```text
//! {
//!   "visit":  { "any": true },
//!   "export": { "except": ["sales", "billing"] },
//!   "navigate": { "only": ["dashboard.sales"] },
//!   "admin":  false
//! }
//! ```
//!
//! Role data arrives already parsed (as `serde_json::Value`) from
//! whatever loader the embedding application uses; this module deep
//! copies it into owned values with no mutating accessors, so later
//! changes to the source data can never affect evaluation.
//!
//! # Rule Shapes
//!
//! | Shape | Variant | Decision |
//! |-------|---------|----------|
//! | `true` / `false` | [`Rule::Boolean`] | the literal |
//! | `{ "any": v }` | [`Rule::Any`] | truthiness of `v` |
//! | `{ "only": patterns }` | [`Rule::Only`] | any pattern matches the context |
//! | `{ "except": patterns }` | [`Rule::Except`] | no pattern matches the context |
//! | key absent / `null` | [`Rule::Missing`] | always deny |
//! | anything else | [`Rule::Unrecognized`] | error when queried |
//!
//! Clause keys are checked in precedence order `any` > `only` >
//! `except`: a non-null `any` wins outright, and `only`/`except` are
//! consulted only when their value is truthy (`null` and `false` fall
//! through to the next clause).

use crate::error::{json_type_name, RoleError};
use crate::IntoTokens;
use serde_json::Value;
use std::collections::HashMap;

/// Fallback for features with no entry in a rule set.
const MISSING: Rule = Rule::Missing;

/// One feature's authorization rule.
///
/// See the [module docs](self) for the recognized shapes. Patterns in
/// `Only`/`Except` are normalized (stringified, lowercased) at
/// construction; dot-splitting happens at evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Unconditional allow (`true`) or deny (`false`).
    Boolean(bool),

    /// Allow iff the stored value is truthy.
    ///
    /// Only `false` is falsy; `0`, `""`, and `[]` all allow. A stored
    /// `null` means the clause value was absent and evaluation reports
    /// it as an unimplemented rule rather than guessing.
    Any(Value),

    /// Allow iff at least one pattern matches the context.
    Only(Vec<String>),

    /// Allow iff no pattern matches the context.
    Except(Vec<String>),

    /// No rule declared for the feature. Always denies.
    Missing,

    /// A value that matched none of the recognized shapes.
    ///
    /// Carried instead of failing construction so that one broken rule
    /// only poisons queries for its own feature; evaluation surfaces
    /// it as an unimplemented-rule error.
    Unrecognized(Value),
}

impl Rule {
    /// Builds an `Any` rule from any JSON-convertible value.
    #[must_use]
    pub fn any(value: impl Into<Value>) -> Self {
        Self::Any(value.into())
    }

    /// Builds an `Only` rule, normalizing the patterns.
    #[must_use]
    pub fn only(patterns: impl IntoTokens) -> Self {
        Self::Only(patterns.into_tokens())
    }

    /// Builds an `Except` rule, normalizing the patterns.
    #[must_use]
    pub fn except(patterns: impl IntoTokens) -> Self {
        Self::Except(patterns.into_tokens())
    }

    /// Classifies an already-parsed rule value.
    ///
    /// Never fails: unrecognized shapes become [`Rule::Unrecognized`]
    /// and error only when the feature is queried.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Bool(b) => Self::Boolean(*b),
            Value::Null => Self::Missing,
            Value::Object(map) => {
                if let Some(any) = map.get("any") {
                    if !any.is_null() {
                        return Self::Any(any.clone());
                    }
                }
                if let Some(only) = map.get("only") {
                    if is_truthy(only) {
                        return Self::Only(only.into_tokens());
                    }
                }
                if let Some(except) = map.get("except") {
                    if is_truthy(except) {
                        return Self::Except(except.into_tokens());
                    }
                }
                Self::Unrecognized(value.clone())
            }
            other => Self::Unrecognized(other.clone()),
        }
    }
}

impl From<bool> for Rule {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// Clause truthiness: only explicit `false` and `null` are falsy.
fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

/// One role's rule set: feature name → [`Rule`].
///
/// Feature keys are lowercased at construction so lookups are
/// case-insensitive, matching the normalization applied to query
/// features. There are no mutating accessors; the set is frozen once
/// built.
///
/// # Example
///
/// ```
/// use rolegate_types::{Rule, RoleRules};
/// use serde_json::json;
///
/// let rules = RoleRules::try_from(&json!({
///     "Visit": { "any": true },
///     "export": { "except": ["sales"] },
/// }))?;
///
/// assert_eq!(rules.rule("visit"), &Rule::any(true));
/// assert_eq!(rules.rule("absent"), &Rule::Missing);
/// # Ok::<(), rolegate_types::RoleError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoleRules {
    rules: HashMap<String, Rule>,
}

impl RoleRules {
    /// Looks up the rule for a feature, case-insensitively.
    ///
    /// Unknown features answer [`Rule::Missing`], which always denies.
    #[must_use]
    pub fn rule(&self, feature: &str) -> &Rule {
        if let Some(rule) = self.rules.get(feature) {
            return rule;
        }
        // Keys are stored lowercase; only re-lowercase when needed.
        if feature.bytes().any(|b| b.is_ascii_uppercase()) {
            if let Some(rule) = self.rules.get(&feature.to_lowercase()) {
                return rule;
            }
        }
        &MISSING
    }

    /// Iterates over the declared feature names (lowercase).
    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Number of declared features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no features are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn from_object(map: &serde_json::Map<String, Value>) -> Self {
        Self {
            rules: map
                .iter()
                .map(|(feature, value)| (feature.to_lowercase(), Rule::from_value(value)))
                .collect(),
        }
    }
}

/// Typed construction; keys are lowercased like parsed ones.
impl<S: Into<String>> FromIterator<(S, Rule)> for RoleRules {
    fn from_iter<I: IntoIterator<Item = (S, Rule)>>(iter: I) -> Self {
        Self {
            rules: iter
                .into_iter()
                .map(|(feature, rule)| (feature.into().to_lowercase(), rule))
                .collect(),
        }
    }
}

impl TryFrom<&Value> for RoleRules {
    type Error = RoleError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self::from_object(map)),
            other => Err(RoleError::NotAMapping {
                got: json_type_name(other),
            }),
        }
    }
}

/// A single rule set, or an ordered list of them.
///
/// Multi-role grants combine with OR-of-AND semantics: a feature set
/// is satisfied iff at least one of the rule sets satisfies the whole
/// set on its own. An empty list denies everything.
#[derive(Debug, Clone, PartialEq)]
pub enum Role {
    /// One rule set.
    Single(RoleRules),
    /// Ordered rule sets, evaluated role-by-role.
    Multi(Vec<RoleRules>),
}

impl Role {
    /// Returns `true` for the multi-role variant.
    #[must_use]
    pub fn is_multi(&self) -> bool {
        matches!(self, Self::Multi(_))
    }
}

impl From<RoleRules> for Role {
    fn from(rules: RoleRules) -> Self {
        Self::Single(rules)
    }
}

impl From<Vec<RoleRules>> for Role {
    fn from(roles: Vec<RoleRules>) -> Self {
        Self::Multi(roles)
    }
}

impl TryFrom<&Value> for Role {
    type Error = RoleError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self::Single(RoleRules::from_object(map))),
            Value::Array(items) => {
                let mut roles = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    match item {
                        Value::Object(map) => roles.push(RoleRules::from_object(map)),
                        other => {
                            return Err(RoleError::InvalidEntry {
                                index,
                                got: json_type_name(other),
                            })
                        }
                    }
                }
                Ok(Self::Multi(roles))
            }
            other => Err(RoleError::NotAMapping {
                got: json_type_name(other),
            }),
        }
    }
}
