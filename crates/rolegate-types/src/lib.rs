//! Core types for rolegate.
//!
//! This crate provides the shared data model for the rolegate
//! role-based feature-authorization workspace: normalized token
//! sequences, contexts, rules, and the error-code convention every
//! rolegate crate follows.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  rolegate-types   : Context, Rule, Role, ErrorCode ◄ HERE │
//! └──────────────────────────────────────────────────────────┘
//!                             ↓
//! ┌──────────────────────────────────────────────────────────┐
//! │  rolegate-engine  : rule evaluation, Checker, Permissions │
//! └──────────────────────────────────────────────────────────┘
//!                             ↓
//! ┌──────────────────────────────────────────────────────────┐
//! │  rolegate-policy  : Policy trait, PolicyRegistry          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Normalization
//!
//! Every comparison in the workspace — context tokens, feature names,
//! pattern segments — is case-insensitive, enforced once at
//! construction through [`IntoTokens`] rather than on every lookup.
//! Role data is deep copied out of the caller's `serde_json::Value`
//! into owned values with no mutating accessors, so evaluation can
//! never observe a mutation of the source data.
//!
//! # Example
//!
//! ```
//! use rolegate_types::{Context, Role, Rule};
//! use serde_json::json;
//!
//! let role = Role::try_from(&json!({
//!     "visit":  { "any": true },
//!     "export": { "except": ["sales"] },
//! }))?;
//!
//! let ctx = Context::new(["Dashboard", "Sales", "Index"]);
//! assert!(ctx.contains("sales"));
//! assert!(!role.is_multi());
//! # Ok::<(), rolegate_types::RoleError>(())
//! ```

pub mod context;
pub mod error;
pub mod rule;
pub mod tokens;

pub use context::Context;
pub use error::{assert_error_code, assert_error_codes, ErrorCode, RoleError};
pub use rule::{Role, RoleRules, Rule};
pub use tokens::IntoTokens;
