//! Policy dispatch layer for rolegate.
//!
//! Builds on `rolegate-engine` to hand the embedding application
//! ready-to-query policy objects: deny-by-default predicate
//! dispatchers ([`Policy`]) resolved through a keyed registry with
//! alias and default fallback ([`PolicyRegistry`]).
//!
//! This crate re-exports the engine and types surface, so one
//! dependency is enough to embed the whole stack.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  rolegate-types   : Context, Rule, Role, ErrorCode        │
//! └──────────────────────────────────────────────────────────┘
//!                             ↓
//! ┌──────────────────────────────────────────────────────────┐
//! │  rolegate-engine  : rule evaluation, Checker, Permissions │
//! └──────────────────────────────────────────────────────────┘
//!                             ↓
//! ┌──────────────────────────────────────────────────────────┐
//! │  rolegate-policy  : Policy trait, PolicyRegistry  ◄ HERE  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use rolegate_policy::{PolicyRegistry, PolicyType};
//! use serde_json::json;
//!
//! let registry = PolicyRegistry::build(
//!     &json!({ "visit": { "any": true } }),
//!     json!({ "user": { "id": 1 }, "context": ["dashboard"] }),
//!     Vec::<(String, rolegate_policy::PolicyBinding)>::new(),
//! )?;
//!
//! // Nothing registered: every lookup answers deny-by-default.
//! assert!(!registry.to("report")?.query("index?", &[])?);
//! assert!(registry.permissions().satisfies("visit")?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod policy;
pub mod registry;

pub use error::{PolicyError, RegistryError};
pub use policy::{deny_unknown, BasePolicy, Policy, PolicyContext};
pub use registry::{PolicyBinding, PolicyRegistry, PolicyType, DEFAULT_KEY};

pub use rolegate_engine::{Checker, EvalError, Permissions};
pub use rolegate_types::{Context, ErrorCode, IntoTokens, Role, RoleError, RoleRules, Rule};
