//! Policy-layer errors.

use rolegate_engine::EvalError;
use rolegate_types::{ErrorCode, RoleError};
use thiserror::Error;

/// Errors raised while building or resolving a policy registry.
///
/// | Variant | When | Code |
/// |---------|------|------|
/// | `InvalidKey` | Registration key is not a symbolic identifier | `INVALID_ARGUMENT` |
/// | `MisplacedAlias` | Alias binding registered under a non-`default` key | `INVALID_ARGUMENT` |
/// | `AliasCycle` | Alias resolution revisited a key | `INVALID_ARGUMENT` |
/// | `EmptyDerive` | `derive` called with neither a context nor policies | `INVALID_ARGUMENT` |
/// | `Role` | Raw role data of the wrong shape in `build` | `INVALID_ARGUMENT` |
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    /// Keys must be non-empty, ASCII alphanumeric or `_`, and must not
    /// start with a digit.
    #[error("policy key {key:?} is not a symbolic identifier")]
    InvalidKey {
        /// The rejected key.
        key: String,
    },

    /// Only the `default` key may hold an alias to another key.
    #[error("key {key:?} cannot hold an alias; only \"default\" may")]
    MisplacedAlias {
        /// The key the alias was registered under.
        key: String,
    },

    /// Alias resolution came back to a key it had already visited.
    #[error("alias resolution cycles at key {key:?}")]
    AliasCycle {
        /// The first revisited key.
        key: String,
    },

    /// `derive` requires a new context, new policies, or both.
    #[error("derive requires a new context and/or new policies")]
    EmptyDerive,

    /// Raw role data handed to `build` had the wrong shape.
    #[error(transparent)]
    Role(#[from] RoleError),
}

impl ErrorCode for RegistryError {
    fn code(&self) -> &'static str {
        "INVALID_ARGUMENT"
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// Errors raised by policy predicate dispatch.
///
/// Predicate-shaped queries (trailing `?`) never land here: unknown
/// ones resolve to `false` by design. Only genuinely undefined,
/// non-predicate operations fail, plus rule-evaluation failures
/// surfaced through a policy's own `satisfies` calls.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    /// An undefined, non-predicate-shaped operation was invoked.
    ///
    /// Carries the attempted name so the caller can locate the bad
    /// call site.
    #[error("policy has no operation named {name:?}")]
    MethodNotFound {
        /// The attempted operation name.
        name: String,
    },

    /// A predicate's own rule evaluation failed.
    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl ErrorCode for PolicyError {
    fn code(&self) -> &'static str {
        match self {
            Self::MethodNotFound { .. } => "METHOD_NOT_FOUND",
            Self::Eval(e) => e.code(),
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolegate_types::{assert_error_code, assert_error_codes};

    #[test]
    fn registry_error_codes() {
        assert_error_codes(
            &[
                RegistryError::InvalidKey { key: "9bad".into() },
                RegistryError::MisplacedAlias { key: "user".into() },
                RegistryError::AliasCycle {
                    key: "default".into(),
                },
                RegistryError::EmptyDerive,
                RegistryError::Role(RoleError::NotAMapping { got: "string" }),
            ],
            "INVALID_ARGUMENT",
        );
    }

    #[test]
    fn method_not_found_code_and_message() {
        let err = PolicyError::MethodNotFound {
            name: "destroy".into(),
        };
        assert_error_code(&err, "METHOD_NOT_FOUND");
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("destroy"));
    }

    #[test]
    fn eval_wrapper_keeps_the_inner_code() {
        let err = PolicyError::from(EvalError::UnimplementedRule {
            rule: "{}".into(),
        });
        assert_error_code(&err, "UNIMPLEMENTED_RULE");
    }
}
