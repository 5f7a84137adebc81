//! Policy registration and resolution.
//!
//! The [`PolicyRegistry`] maps symbolic keys to policy types and hands
//! out ready-to-query instances bound to one permissions model. Three
//! rules shape resolution:
//!
//! - a missing key falls back to `default`, then to the base
//!   deny-everything policy;
//! - only the `default` key may alias another key, and alias chains
//!   are followed with a visited set so a cycle fails instead of
//!   looping;
//! - instances are cached per resolved key, except base-policy
//!   fallbacks and subject overrides, which are fresh every time.

use crate::error::RegistryError;
use crate::policy::{BasePolicy, Policy, PolicyContext};
use rolegate_engine::Permissions;
use rolegate_types::{Context, IntoTokens};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// The key consulted when a lookup misses, and the only key allowed to
/// hold an alias.
pub const DEFAULT_KEY: &str = "default";

/// A named constructor handle for a concrete [`Policy`] type.
///
/// Registries store types, not instances; construction is deferred
/// until [`PolicyRegistry::to`] binds a context/subject/permissions
/// triple.
///
/// # Example
///
/// ```
/// use rolegate_policy::{Policy, PolicyContext, PolicyType};
///
/// struct ReportPolicy;
///
/// impl From<PolicyContext> for ReportPolicy {
///     fn from(_ctx: PolicyContext) -> Self {
///         Self
///     }
/// }
///
/// impl Policy for ReportPolicy {}
///
/// let ty = PolicyType::new::<ReportPolicy>("report");
/// assert_eq!(ty.name(), "report");
/// assert!(!ty.is_base());
/// ```
#[derive(Clone, Copy)]
pub struct PolicyType {
    name: &'static str,
    base: bool,
    build: fn(PolicyContext) -> Arc<dyn Policy>,
}

impl PolicyType {
    /// Handle for a concrete policy type constructible from a
    /// [`PolicyContext`].
    #[must_use]
    pub fn new<P>(name: &'static str) -> Self
    where
        P: Policy + From<PolicyContext> + 'static,
    {
        Self {
            name,
            base: false,
            build: |ctx| Arc::new(P::from(ctx)),
        }
    }

    /// The deny-everything [`BasePolicy`] type.
    ///
    /// Resolved when neither the requested key nor `default` is
    /// registered; never cached by registries.
    #[must_use]
    pub fn base() -> Self {
        Self {
            name: "policy",
            base: true,
            build: |ctx| Arc::new(BasePolicy::from(ctx)),
        }
    }

    /// The type's registered name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` for [`PolicyType::base`].
    #[must_use]
    pub fn is_base(&self) -> bool {
        self.base
    }

    fn construct(&self, ctx: PolicyContext) -> Arc<dyn Policy> {
        (self.build)(ctx)
    }
}

impl PartialEq for PolicyType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.base == other.base
    }
}

impl std::fmt::Debug for PolicyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyType")
            .field("name", &self.name)
            .field("base", &self.base)
            .finish()
    }
}

/// One registry entry: a concrete type, or an alias to another key.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyBinding {
    /// A registered policy type.
    Concrete(PolicyType),
    /// A reference to another key; valid only under `default`.
    Alias(String),
}

impl PolicyBinding {
    /// Builds an alias binding.
    #[must_use]
    pub fn alias(key: impl Into<String>) -> Self {
        Self::Alias(key.into())
    }
}

impl From<PolicyType> for PolicyBinding {
    fn from(ty: PolicyType) -> Self {
        Self::Concrete(ty)
    }
}

/// Maps keys to policy types and hands out bound instances.
///
/// Owns the bound context every instance is constructed with, the
/// shared [`Permissions`] model, and the per-registry instance cache.
/// Deriving a registry for a new scope never mutates the source.
///
/// # Example
///
/// ```
/// use rolegate_policy::{
///     deny_unknown, Policy, PolicyContext, PolicyError, PolicyRegistry, PolicyType,
/// };
/// use serde_json::{json, Value};
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
/// impl Policy for ReportPolicy {
///     fn query(&self, name: &str, _args: &[Value]) -> Result<bool, PolicyError> {
///         match name {
///             "index?" => Ok(!self.ctx.actor().is_null()),
///             other => deny_unknown(other),
///         }
///     }
/// }
///
/// let registry = PolicyRegistry::build(
///     &json!({ "visit": { "any": true } }),
///     json!({ "user": { "id": 1 }, "context": ["dashboard"] }),
///     [("report", PolicyType::new::<ReportPolicy>("report").into())],
/// )?;
///
/// assert!(registry.to("report")?.query("index?", &[])?);
/// assert!(!registry.to("unregistered")?.query("index?", &[])?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct PolicyRegistry {
    value: Value,
    permissions: Arc<Permissions>,
    bindings: HashMap<String, PolicyBinding>,
    cache: RwLock<HashMap<String, Arc<dyn Policy>>>,
}

/// Cached instances are trait objects, so the cache shows only its
/// keys.
impl std::fmt::Debug for PolicyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cached: Vec<String> = match self.cache.read() {
            Ok(cache) => cache.keys().cloned().collect(),
            Err(_) => Vec::new(),
        };
        f.debug_struct("PolicyRegistry")
            .field("value", &self.value)
            .field("bindings", &self.bindings)
            .field("cached", &cached)
            .finish_non_exhaustive()
    }
}

impl PolicyRegistry {
    /// Builds a registry over an existing permissions model,
    /// registering every entry of `policies` in order.
    ///
    /// # Errors
    ///
    /// [`RegistryError`] when a key is not a symbolic identifier or an
    /// alias is bound to a non-`default` key.
    pub fn new<K: Into<String>>(
        value: Value,
        permissions: Permissions,
        policies: impl IntoIterator<Item = (K, PolicyBinding)>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self {
            value,
            permissions: Arc::new(permissions),
            bindings: HashMap::new(),
            cache: RwLock::new(HashMap::new()),
        };
        registry.register_all(policies)?;
        Ok(registry)
    }

    /// Builds a registry straight from raw role data.
    ///
    /// Context tokens come from the bound context's `"context"` key
    /// when it is an object, or from the whole value otherwise.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Role`] for malformed role data, plus every
    /// [`PolicyRegistry::new`] failure.
    pub fn build<K: Into<String>>(
        role_data: &Value,
        value: Value,
        policies: impl IntoIterator<Item = (K, PolicyBinding)>,
    ) -> Result<Self, RegistryError> {
        let tokens = match &value {
            Value::Object(map) => map.get("context").into_tokens(),
            other => other.into_tokens(),
        };
        let permissions = Permissions::from_value(role_data, tokens)?;
        Self::new(value, permissions, policies)
    }

    /// The bound context every instance is constructed with.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The shared permissions model.
    #[must_use]
    pub fn permissions(&self) -> &Arc<Permissions> {
        &self.permissions
    }

    /// Registers a binding under `key`. First registration wins;
    /// re-registering an existing key is a logged no-op.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidKey`] for non-identifier keys and
    /// [`RegistryError::MisplacedAlias`] for aliases outside `default`.
    pub fn register(
        &mut self,
        key: impl Into<String>,
        binding: impl Into<PolicyBinding>,
    ) -> Result<(), RegistryError> {
        let key = key.into();
        if !is_symbolic_key(&key) {
            return Err(RegistryError::InvalidKey { key });
        }

        let binding = binding.into();
        if matches!(binding, PolicyBinding::Alias(_)) && key != DEFAULT_KEY {
            return Err(RegistryError::MisplacedAlias { key });
        }

        if self.bindings.contains_key(&key) {
            tracing::debug!(key = %key, "policy key already registered; keeping the first binding");
            return Ok(());
        }
        self.bindings.insert(key, binding);
        Ok(())
    }

    /// Registers every entry of `mapping` in order via
    /// [`register`](Self::register).
    ///
    /// # Errors
    ///
    /// The first [`register`](Self::register) failure; earlier entries
    /// stay registered.
    pub fn register_all<K: Into<String>>(
        &mut self,
        mapping: impl IntoIterator<Item = (K, PolicyBinding)>,
    ) -> Result<(), RegistryError> {
        for (key, binding) in mapping {
            self.register(key, binding)?;
        }
        Ok(())
    }

    /// Resolves `key` to a policy type.
    ///
    /// A missing key falls back to `default`; a missing `default`
    /// falls back to [`PolicyType::base`]. Aliases are followed
    /// iteratively.
    ///
    /// # Errors
    ///
    /// [`RegistryError::AliasCycle`] when resolution revisits a key.
    pub fn resolve(&self, key: &str) -> Result<PolicyType, RegistryError> {
        Ok(self.resolve_entry(key)?.1)
    }

    /// Follows bindings from `key` to a concrete type, returning the
    /// key the concrete binding was found under (the cache key).
    fn resolve_entry(&self, key: &str) -> Result<(String, PolicyType), RegistryError> {
        let mut visited: Vec<&str> = Vec::new();
        let mut current = key;
        loop {
            if visited.contains(&current) {
                tracing::warn!(key = %current, "policy alias cycle rejected");
                return Err(RegistryError::AliasCycle {
                    key: current.to_string(),
                });
            }
            visited.push(current);

            match self.bindings.get(current) {
                Some(PolicyBinding::Concrete(ty)) => return Ok((current.to_string(), *ty)),
                Some(PolicyBinding::Alias(next)) => current = next,
                None if current == DEFAULT_KEY => {
                    tracing::trace!(requested = %key, "no default binding; using the base policy");
                    return Ok((DEFAULT_KEY.to_string(), PolicyType::base()));
                }
                None => current = DEFAULT_KEY,
            }
        }
    }

    /// Resolves `key` and returns a bound instance.
    ///
    /// Instances are cached per resolved key, so aliased and
    /// fallen-back lookups share one instance with the key they
    /// resolve to. Base-policy fallbacks are constructed fresh every
    /// time and never cached.
    ///
    /// # Errors
    ///
    /// Propagates [`resolve`](Self::resolve) failures.
    pub fn to(&self, key: &str) -> Result<Arc<dyn Policy>, RegistryError> {
        let (resolved, ty) = self.resolve_entry(key)?;
        if ty.is_base() {
            return Ok(self.construct(&ty, None));
        }

        match self.cache.read() {
            Ok(cache) => {
                if let Some(instance) = cache.get(&resolved) {
                    tracing::trace!(key = %resolved, "policy cache hit");
                    return Ok(Arc::clone(instance));
                }
            }
            Err(e) => {
                tracing::error!("policy registry: cache lock poisoned on read: {e}");
            }
        }

        let instance = self.construct(&ty, None);
        match self.cache.write() {
            Ok(mut cache) => {
                cache.insert(resolved, Arc::clone(&instance));
            }
            Err(e) => {
                tracing::error!("policy registry: cache lock poisoned on write: {e}");
            }
        }
        Ok(instance)
    }

    /// Like [`to`](Self::to), but with an explicit subject.
    ///
    /// A subject override always constructs a fresh instance and never
    /// touches the cache; passing `Value::Null` still counts as an
    /// override.
    ///
    /// # Errors
    ///
    /// Propagates [`resolve`](Self::resolve) failures.
    pub fn to_with_subject(
        &self,
        key: &str,
        subject: Value,
    ) -> Result<Arc<dyn Policy>, RegistryError> {
        let ty = self.resolve(key)?;
        Ok(self.construct(&ty, Some(subject)))
    }

    /// [`to`](Self::to) for the `default` key.
    ///
    /// # Errors
    ///
    /// Propagates [`resolve`](Self::resolve) failures.
    pub fn policy(&self) -> Result<Arc<dyn Policy>, RegistryError> {
        self.to(DEFAULT_KEY)
    }

    /// [`to_with_subject`](Self::to_with_subject) for the `default`
    /// key.
    ///
    /// # Errors
    ///
    /// Propagates [`resolve`](Self::resolve) failures.
    pub fn policy_with_subject(&self, subject: Value) -> Result<Arc<dyn Policy>, RegistryError> {
        self.to_with_subject(DEFAULT_KEY, subject)
    }

    /// New registry for a different scope, sharing the frozen role.
    ///
    /// The permissions model is rebuilt with the new context (or the
    /// inherited tokens), the policy map is replaced or inherited, and
    /// both caches start empty. The source registry is untouched.
    ///
    /// # Errors
    ///
    /// [`RegistryError::EmptyDerive`] when both arguments are `None`;
    /// new policy maps go through [`register_all`](Self::register_all)
    /// validation.
    pub fn derive(
        &self,
        new_context: Option<Context>,
        new_policies: Option<HashMap<String, PolicyBinding>>,
    ) -> Result<Self, RegistryError> {
        if new_context.is_none() && new_policies.is_none() {
            return Err(RegistryError::EmptyDerive);
        }

        let context = new_context.unwrap_or_else(|| self.permissions.context().clone());
        let permissions = self.permissions.derive(context);

        let mut registry = Self {
            value: self.value.clone(),
            permissions: Arc::new(permissions),
            bindings: HashMap::new(),
            cache: RwLock::new(HashMap::new()),
        };
        match new_policies {
            Some(policies) => registry.register_all(policies)?,
            // Inherited bindings were validated when first registered.
            None => registry.bindings = self.bindings.clone(),
        }
        Ok(registry)
    }

    fn construct(&self, ty: &PolicyType, subject: Option<Value>) -> Arc<dyn Policy> {
        let mut ctx = PolicyContext::new(self.value.clone())
            .with_permissions(Arc::clone(&self.permissions));
        if let Some(subject) = subject {
            ctx = ctx.with_subject(subject);
        }
        ty.construct(ctx)
    }
}

/// Symbolic identifier shape: non-empty, ASCII alphanumeric or `_`,
/// not starting with a digit.
fn is_symbolic_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
