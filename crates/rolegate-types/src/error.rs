//! Unified error interface for rolegate.
//!
//! This module provides the [`ErrorCode`] trait implemented by every
//! error type in the workspace, plus the [`RoleError`] raised when raw
//! role data cannot be turned into a [`Role`](crate::Role).
//!
//! # Design
//!
//! Authorization failures fall into a small, stable taxonomy:
//!
//! | Code | Raised by | Meaning |
//! |------|-----------|---------|
//! | `INVALID_ARGUMENT` | role construction, policy registry | Caller handed data of the wrong shape |
//! | `UNIMPLEMENTED_RULE` | rule evaluation | A rule matched none of the recognized shapes |
//! | `METHOD_NOT_FOUND` | policy dispatch | An undefined, non-predicate operation was invoked |
//!
//! Codes are the API contract for embedding applications that branch on
//! failure kind without matching concrete enum variants across crates.
//!
//! # Example
//!
//! ```
//! use rolegate_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum LoaderError {
//!     BadShape,
//! }
//!
//! impl ErrorCode for LoaderError {
//!     fn code(&self) -> &'static str {
//!         "INVALID_ARGUMENT"
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         false
//!     }
//! }
//!
//! let err = LoaderError::BadShape;
//! assert_eq!(err.code(), "INVALID_ARGUMENT");
//! assert!(!err.is_recoverable());
//! ```

use thiserror::Error;

/// Unified error code interface for rolegate errors.
///
/// Implement this trait for all error types to enable:
///
/// - Consistent error code format across crates
/// - Unified failure handling in embedding applications
/// - Standardized logging
///
/// # Code Format
///
/// Error codes should be:
///
/// - **UPPER_SNAKE_CASE**: e.g., `"INVALID_ARGUMENT"`
/// - **Stable**: Codes should not change once defined (API contract)
///
/// # Recoverability
///
/// An error is recoverable if retrying the operation may succeed or a
/// transient condition caused it. This library is a pure decision
/// function over immutable data, so every failure it raises reflects
/// broken input or a caller bug and reports `false`; the method exists
/// so embedding applications can handle rolegate errors through the
/// same interface as their transient ones.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    ///
    /// # Format
    ///
    /// - UPPER_SNAKE_CASE
    /// - Stable across versions (breaking change if modified)
    ///
    /// # Examples
    ///
    /// - `"INVALID_ARGUMENT"`
    /// - `"UNIMPLEMENTED_RULE"`
    /// - `"METHOD_NOT_FOUND"`
    fn code(&self) -> &'static str;

    /// Returns whether the error is recoverable.
    ///
    /// # Returns
    ///
    /// - `true`: Retry may succeed, or user can take corrective action
    /// - `false`: Retry will not help, requires code/data change
    fn is_recoverable(&self) -> bool;
}

/// Raised when raw role data has the wrong shape.
///
/// Role data must be a JSON object mapping feature names to rules, or
/// an array of such objects (multi-role). Anything else fails here,
/// before any evaluation happens.
///
/// Individual rule *values* of unrecognized shape do not fail
/// construction; they are carried as
/// [`Rule::Unrecognized`](crate::Rule::Unrecognized) and only error
/// when the corresponding feature is actually queried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleError {
    /// The top-level role value is neither an object nor an array.
    #[error("role data must be an object of feature rules or an array of them, got {got}")]
    NotAMapping {
        /// JSON type name of the rejected value.
        got: &'static str,
    },

    /// A multi-role array entry is not an object.
    #[error("multi-role entry {index} must be an object of feature rules, got {got}")]
    InvalidEntry {
        /// Position of the rejected entry.
        index: usize,
        /// JSON type name of the rejected value.
        got: &'static str,
    },
}

impl ErrorCode for RoleError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotAMapping { .. } | Self::InvalidEntry { .. } => "INVALID_ARGUMENT",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// Validates that an error code follows rolegate conventions.
///
/// # Checks
///
/// 1. Code is UPPER_SNAKE_CASE
/// 2. Code starts with expected prefix
/// 3. Code is not empty
///
/// # Panics
///
/// Panics with descriptive message if validation fails.
///
/// # Example
///
/// ```
/// use rolegate_types::{assert_error_code, ErrorCode, RoleError};
///
/// let err = RoleError::NotAMapping { got: "string" };
/// assert_error_code(&err, "INVALID_ARGUMENT");
/// ```
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "Error code must not be empty");

    assert!(
        code.starts_with(expected_prefix),
        "Error code '{}' must start with prefix '{}'",
        code,
        expected_prefix
    );

    assert!(
        is_upper_snake_case(code),
        "Error code '{}' must be UPPER_SNAKE_CASE",
        code
    );
}

/// Validates multiple error codes at once.
///
/// Use this to verify all variants of an error enum.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

/// Checks if a string is UPPER_SNAKE_CASE.
fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }

    if s.starts_with('_') || s.ends_with('_') {
        return false;
    }

    if s.contains("__") {
        return false;
    }

    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Returns the JSON type name of a value, for error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
