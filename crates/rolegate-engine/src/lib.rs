//! Rule evaluation engine for rolegate.
//!
//! This crate turns the data model of `rolegate-types` into answers:
//! pure decision functions over rules ([`eval`]), bound evaluation
//! handles ([`Checker`]), and the memoizing [`Permissions`] model the
//! policy layer builds on.
//!
//! # Evaluation Semantics
//!
//! | Question | Combinator |
//! |----------|------------|
//! | one feature, one rule | [`eval::authorize`] |
//! | feature set within a role | AND, in feature order |
//! | feature set across roles | OR, each role judged on the whole set |
//!
//! Per-feature grants are never combined across roles: a multi-role
//! grant holds only when some single role satisfies the entire set.
//!
//! # Example
//!
//! ```
//! use rolegate_engine::Permissions;
//! use serde_json::json;
//!
//! let model = Permissions::from_value(
//!     &json!({ "export": { "except": ["sales"] } }),
//!     ["home"],
//! )?;
//!
//! // No except-pattern in context: access granted.
//! assert!(model.satisfies("export")?);
//! assert!(!model.derive(["sales"]).satisfies("export")?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod checker;
pub mod error;
pub mod eval;
pub mod permissions;

pub use checker::Checker;
pub use error::EvalError;
pub use permissions::Permissions;
