//! The permissions model.
//!
//! [`Permissions`] owns the frozen role data and the context it was
//! built for, and memoizes the answers it computes. It is the main
//! entry point of the engine: the policy layer keeps one model per
//! registry and funnels every `satisfies` question through it.
//!
//! # Caching
//!
//! Answers are keyed by the order-sensitive string form of the
//! normalized feature list, so `["visit", "export"]` and
//! `["export", "visit"]` occupy separate entries even though they
//! always agree. Errors are never cached; a broken rule keeps failing
//! until the role data is fixed. The cache lives behind an `RwLock` so
//! a model can be shared behind `Arc` across threads; a poisoned lock
//! is logged and degrades to recomputation.

use crate::checker::Checker;
use crate::error::EvalError;
use rolegate_types::{Context, IntoTokens, Role, RoleError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// An immutable `(role, context)` pair with a memo cache.
///
/// # Example
///
/// ```
/// use rolegate_engine::Permissions;
/// use serde_json::json;
///
/// let model = Permissions::from_value(
///     &json!({
///         "visit":  { "any": true },
///         "export": { "except": ["sales", "foo"] },
///     }),
///     ["dashboard", "controllers", "sales", "index"],
/// )?;
///
/// assert!(model.satisfies("visit")?);
/// assert!(!model.satisfies("export")?);
/// assert!(model.does_not_satisfy(["visit", "export"])?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Permissions {
    role: Arc<Role>,
    context: Context,
    cache: RwLock<HashMap<String, bool>>,
}

impl Permissions {
    /// Builds a model from an already-constructed role.
    #[must_use]
    pub fn new(role: Role, context: impl IntoTokens) -> Self {
        Self::with_role(Arc::new(role), context)
    }

    /// Builds a model from raw role data.
    ///
    /// # Errors
    ///
    /// [`RoleError`] when the value is neither an object of feature
    /// rules nor an array of such objects.
    pub fn from_value(role_data: &Value, context: impl IntoTokens) -> Result<Self, RoleError> {
        Ok(Self::new(Role::try_from(role_data)?, context))
    }

    /// Shares an existing frozen role; used by [`derive`](Self::derive).
    #[must_use]
    pub fn with_role(role: Arc<Role>, context: impl IntoTokens) -> Self {
        Self {
            role,
            context: Context::new(context),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The frozen role this model evaluates.
    #[must_use]
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// The context this model answers against.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Binds `features` to this model's role without evaluating.
    ///
    /// The returned [`Checker`] probes arbitrary contexts and bypasses
    /// this model's context and cache entirely.
    #[must_use]
    pub fn to(&self, features: impl IntoTokens) -> Checker {
        Checker::new(Arc::clone(&self.role), features)
    }

    /// Decides whether the role grants every requested feature in this
    /// model's context, memoizing the answer.
    ///
    /// # Errors
    ///
    /// [`EvalError::UnimplementedRule`] when evaluation reaches a rule
    /// with no recognized shape; the failed query is not cached.
    pub fn satisfies(&self, features: impl IntoTokens) -> Result<bool, EvalError> {
        let checker = self.to(features);
        let cache_key = format!("{:?}", checker.required_features());

        if let Some(hit) = self.cached(&cache_key) {
            tracing::trace!(key = %cache_key, value = hit, "permissions cache hit");
            return Ok(hit);
        }

        let allowed = checker.matches(&self.context)?;
        self.store(cache_key, allowed);
        Ok(allowed)
    }

    /// Negation of [`satisfies`](Self::satisfies); not independently
    /// cached.
    ///
    /// # Errors
    ///
    /// Propagates [`satisfies`](Self::satisfies) failures unchanged.
    pub fn does_not_satisfy(&self, features: impl IntoTokens) -> Result<bool, EvalError> {
        Ok(!self.satisfies(features)?)
    }

    /// New model for a different scope: same frozen role by reference,
    /// freshly normalized context, empty cache. The source model and
    /// its cached answers are untouched.
    #[must_use]
    pub fn derive(&self, context: impl IntoTokens) -> Self {
        Self::with_role(Arc::clone(&self.role), context)
    }

    fn cached(&self, key: &str) -> Option<bool> {
        match self.cache.read() {
            Ok(cache) => cache.get(key).copied(),
            Err(e) => {
                tracing::error!("permissions: cache lock poisoned on read: {e}");
                None
            }
        }
    }

    fn store(&self, key: String, value: bool) {
        match self.cache.write() {
            Ok(mut cache) => {
                cache.insert(key, value);
            }
            Err(e) => {
                tracing::error!("permissions: cache lock poisoned on write: {e}");
            }
        }
    }
}
