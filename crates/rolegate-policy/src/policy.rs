//! Deny-by-default policies.
//!
//! A policy is a small predicate dispatcher scoped to one concern
//! ("can this actor touch this subject here?"). Concrete policy types
//! expose statically known predicate methods; the [`Policy`] trait
//! adds one generic fallback, [`Policy::query`], for call sites whose
//! operation names arrive as data (configuration, UI strings).
//!
//! # Dispatch Contract
//!
//! Unknown names split on shape:
//!
//! - predicate-shaped (trailing `?`) → `Ok(false)`, making every
//!   policy a closed deny-by-default surface;
//! - anything else → [`PolicyError::MethodNotFound`] carrying the
//!   attempted name.
//!
//! [`deny_unknown`] implements that split; every `query` override ends
//! its match with it.

use crate::error::PolicyError;
use rolegate_engine::Permissions;
use serde_json::Value;
use std::sync::Arc;

/// The `(bound context, subject, permissions)` triple every policy is
/// constructed with.
///
/// The bound context is an arbitrary JSON value, conventionally an
/// object carrying `"user"` / `"current_user"` keys; [`actor`]
/// resolves through them. The subject is an `Option` so "explicitly
/// passed `null`" stays distinguishable from "not passed at all".
///
/// [`actor`]: Self::actor
#[derive(Debug, Clone)]
pub struct PolicyContext {
    value: Value,
    subject: Option<Value>,
    permissions: Option<Arc<Permissions>>,
}

impl PolicyContext {
    /// Wraps a bound context with no subject and no permissions.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self {
            value,
            subject: None,
            permissions: None,
        }
    }

    /// Attaches a subject. `Value::Null` counts as present.
    #[must_use]
    pub fn with_subject(mut self, subject: Value) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Attaches a permissions model reference.
    #[must_use]
    pub fn with_permissions(mut self, permissions: Arc<Permissions>) -> Self {
        self.permissions = Some(permissions);
        self
    }

    /// The bound context value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The subject, if one was supplied.
    #[must_use]
    pub fn subject(&self) -> Option<&Value> {
        self.subject.as_ref()
    }

    /// The permissions model, if one was attached.
    #[must_use]
    pub fn permissions(&self) -> Option<&Arc<Permissions>> {
        self.permissions.as_ref()
    }

    /// The acting entity.
    ///
    /// For an object context, the `"user"` key wins, then
    /// `"current_user"`; `null` and `false` values fall through, since
    /// neither is a usable actor. Any other context is its own actor.
    #[must_use]
    pub fn actor(&self) -> &Value {
        if let Value::Object(map) = &self.value {
            for key in ["user", "current_user"] {
                if let Some(actor) = map.get(key) {
                    if !matches!(actor, Value::Null | Value::Bool(false)) {
                        return actor;
                    }
                }
            }
        }
        &self.value
    }
}

/// Shared fallback for unknown operation names.
///
/// # Errors
///
/// [`PolicyError::MethodNotFound`] for non-predicate-shaped names.
pub fn deny_unknown(name: &str) -> Result<bool, PolicyError> {
    if name.ends_with('?') {
        return Ok(false);
    }
    Err(PolicyError::MethodNotFound {
        name: name.to_string(),
    })
}

/// A deny-by-default predicate dispatcher.
///
/// Concrete types add statically known predicate methods of their own;
/// `query` is the dynamic surface. Overrides match on the names they
/// implement and delegate everything else to [`deny_unknown`]:
///
/// ```
/// use rolegate_policy::{deny_unknown, Policy, PolicyContext, PolicyError};
/// use serde_json::Value;
///
/// struct ReportPolicy {
///     ctx: PolicyContext,
/// }
///
/// impl From<PolicyContext> for ReportPolicy {
///     fn from(ctx: PolicyContext) -> Self {
///         Self { ctx }
///     }
/// }
///
/// impl ReportPolicy {
///     fn index(&self) -> bool {
///         !self.ctx.actor().is_null()
///     }
/// }
///
/// impl Policy for ReportPolicy {
///     fn query(&self, name: &str, _args: &[Value]) -> Result<bool, PolicyError> {
///         match name {
///             "index?" => Ok(self.index()),
///             other => deny_unknown(other),
///         }
///     }
/// }
/// ```
pub trait Policy: Send + Sync {
    /// Dispatches an operation by name.
    ///
    /// # Errors
    ///
    /// [`PolicyError::MethodNotFound`] for undefined non-predicate
    /// names; predicate evaluation may also surface rule errors.
    fn query(&self, name: &str, args: &[Value]) -> Result<bool, PolicyError> {
        let _ = args;
        deny_unknown(name)
    }
}

/// The deny-everything policy.
///
/// Resolved for unregistered keys when no `default` binding exists; it
/// defines no predicates, so every predicate-shaped query answers
/// `false`.
#[derive(Debug)]
pub struct BasePolicy {
    ctx: PolicyContext,
}

impl BasePolicy {
    /// The construction context, for parity with concrete policies.
    #[must_use]
    pub fn context(&self) -> &PolicyContext {
        &self.ctx
    }
}

impl From<PolicyContext> for BasePolicy {
    fn from(ctx: PolicyContext) -> Self {
        Self { ctx }
    }
}

impl Policy for BasePolicy {}
