//! Token normalization for contexts, features, and patterns.
//!
//! Everything this library compares — context tokens, feature names,
//! pattern segments — goes through one normalization step: stringify,
//! lowercase, preserve order and duplicates. [`IntoTokens`] is that
//! step, accepting either a single token or an ordered collection.
//!
//! # Accepted Inputs
//!
//! | Input | Result |
//! |-------|--------|
//! | `"Sales"` | `["sales"]` |
//! | `["Sales", "Index"]` | `["sales", "index"]` |
//! | `vec!["A", "a"]` | `["a", "a"]` (duplicates kept) |
//! | `json!("SALES")` | `["sales"]` |
//! | `json!(["sales", 7])` | `["sales", "7"]` |
//! | `json!(null)` / `None` | `[]` |
//!
//! # Example
//!
//! ```
//! use rolegate_types::IntoTokens;
//!
//! assert_eq!("EXPORT".into_tokens(), vec!["export"]);
//! assert_eq!(
//!     ["Dashboard", "Sales"].into_tokens(),
//!     vec!["dashboard", "sales"]
//! );
//! assert_eq!(Option::<&str>::None.into_tokens(), Vec::<String>::new());
//! ```

use serde_json::Value;

/// Conversion into an ordered sequence of lowercase string tokens.
///
/// This conversion never fails: any accepted input produces a (possibly
/// empty) token list. Order and duplicates are preserved; every token
/// is lowercased, so all later comparisons are case-insensitive.
pub trait IntoTokens {
    /// Consumes the input and returns its normalized tokens.
    fn into_tokens(self) -> Vec<String>;
}

impl IntoTokens for &str {
    fn into_tokens(self) -> Vec<String> {
        vec![self.to_lowercase()]
    }
}

impl IntoTokens for String {
    fn into_tokens(self) -> Vec<String> {
        vec![self.to_lowercase()]
    }
}

impl IntoTokens for &String {
    fn into_tokens(self) -> Vec<String> {
        vec![self.to_lowercase()]
    }
}

impl<T: AsRef<str>, const N: usize> IntoTokens for [T; N] {
    fn into_tokens(self) -> Vec<String> {
        self.iter().map(|t| t.as_ref().to_lowercase()).collect()
    }
}

impl<T: AsRef<str>> IntoTokens for &[T] {
    fn into_tokens(self) -> Vec<String> {
        self.iter().map(|t| t.as_ref().to_lowercase()).collect()
    }
}

impl<T: AsRef<str>> IntoTokens for Vec<T> {
    fn into_tokens(self) -> Vec<String> {
        self.iter().map(|t| t.as_ref().to_lowercase()).collect()
    }
}

/// Absent input yields an empty sequence.
impl<T: IntoTokens> IntoTokens for Option<T> {
    fn into_tokens(self) -> Vec<String> {
        self.map_or_else(Vec::new, IntoTokens::into_tokens)
    }
}

/// Already-parsed JSON input.
///
/// `null` is absent (empty sequence); an array contributes one token
/// per element; any other value is a single token. Non-string scalars
/// are stringified before lowercasing.
impl IntoTokens for &Value {
    fn into_tokens(self) -> Vec<String> {
        match self {
            Value::Null => Vec::new(),
            Value::Array(items) => items
                .iter()
                .map(|item| scalar_string(item).to_lowercase())
                .collect(),
            other => vec![scalar_string(other).to_lowercase()],
        }
    }
}

impl IntoTokens for Value {
    fn into_tokens(self) -> Vec<String> {
        (&self).into_tokens()
    }
}

/// String form of one token value.
///
/// `null` inside an array stringifies to the empty token, which never
/// matches anything.
fn scalar_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_str_lowercased() {
        assert_eq!("SALES".into_tokens(), vec!["sales"]);
        assert_eq!("Sales.Index".into_tokens(), vec!["sales.index"]);
    }

    #[test]
    fn owned_string_lowercased() {
        assert_eq!(String::from("Home").into_tokens(), vec!["home"]);
        assert_eq!((&String::from("Home")).into_tokens(), vec!["home"]);
    }

    #[test]
    fn collections_preserve_order_and_duplicates() {
        assert_eq!(
            ["B", "a", "B"].into_tokens(),
            vec!["b", "a", "b"]
        );
        assert_eq!(
            vec!["Dashboard", "Controllers"].into_tokens(),
            vec!["dashboard", "controllers"]
        );

        let slice: &[&str] = &["X", "y"];
        assert_eq!(slice.into_tokens(), vec!["x", "y"]);
    }

    #[test]
    fn option_none_is_empty() {
        assert_eq!(Option::<&str>::None.into_tokens(), Vec::<String>::new());
        assert_eq!(Some("Home").into_tokens(), vec!["home"]);
    }

    #[test]
    fn json_null_is_empty() {
        assert_eq!(json!(null).into_tokens(), Vec::<String>::new());
    }

    #[test]
    fn json_scalar_is_single_token() {
        assert_eq!(json!("SALES").into_tokens(), vec!["sales"]);
        assert_eq!(json!(42).into_tokens(), vec!["42"]);
        assert_eq!(json!(true).into_tokens(), vec!["true"]);
    }

    #[test]
    fn json_array_stringifies_elements() {
        assert_eq!(
            json!(["Sales", 7, false]).into_tokens(),
            vec!["sales", "7", "false"]
        );
    }

    #[test]
    fn json_null_element_is_empty_token() {
        assert_eq!(json!(["a", null]).into_tokens(), vec!["a", ""]);
    }

    #[test]
    fn empty_array_is_empty() {
        assert_eq!(json!([]).into_tokens(), Vec::<String>::new());
        assert_eq!(Vec::<&str>::new().into_tokens(), Vec::<String>::new());
    }

    #[test]
    fn unicode_tokens_lowercase() {
        assert_eq!("ÜBER".into_tokens(), vec!["über"]);
    }
}
