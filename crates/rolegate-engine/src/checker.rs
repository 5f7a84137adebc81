//! Bound evaluation handles.
//!
//! A [`Checker`] pins down one authorization question — "does this role
//! grant this feature set?" — while leaving the context open, so the
//! same question can be probed against scopes other than the one a
//! [`Permissions`](crate::Permissions) model was built with.

use crate::error::EvalError;
use crate::eval::{authorize_all, authorize_any_role};
use rolegate_types::{Context, IntoTokens, Role};
use std::sync::Arc;

/// A `(role, features)` pair awaiting a context.
///
/// Produced by [`Permissions::to`](crate::Permissions::to); the role is
/// shared by reference and the requested features are normalized at
/// construction. Nothing is evaluated until [`matches`](Self::matches)
/// is called, and `matches` never touches the owning model's cache —
/// it is the ad-hoc probing path.
///
/// # Example
///
/// ```
/// use rolegate_engine::Permissions;
/// use rolegate_types::{Context, Role};
/// use serde_json::json;
///
/// let role = Role::try_from(&json!({ "visit": { "only": ["reports"] } }))?;
/// let model = Permissions::new(role, ["users"]);
///
/// let checker = model.to("visit");
/// assert!(!checker.matches(&Context::new(["users"]))?);
/// assert!(checker.matches(&Context::new(["reports"]))?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Checker {
    role: Arc<Role>,
    features: Vec<String>,
}

impl Checker {
    /// Binds a role to a normalized feature set.
    #[must_use]
    pub fn new(role: Arc<Role>, features: impl IntoTokens) -> Self {
        Self {
            role,
            features: features.into_tokens(),
        }
    }

    /// The normalized feature names this checker asks about, in
    /// request order.
    #[must_use]
    pub fn required_features(&self) -> &[String] {
        &self.features
    }

    /// Evaluates the bound question against an explicit context.
    ///
    /// Single roles answer via AND across the feature set; multi-roles
    /// via OR across roles, each role judged against the whole set.
    ///
    /// # Errors
    ///
    /// [`EvalError::UnimplementedRule`] when the scan reaches a rule
    /// with no recognized shape.
    pub fn matches(&self, context: &Context) -> Result<bool, EvalError> {
        match self.role.as_ref() {
            Role::Single(rules) => authorize_all(rules, context, &self.features),
            Role::Multi(roles) => authorize_any_role(roles, context, &self.features),
        }
    }
}
