//! Evaluation errors.

use rolegate_types::ErrorCode;
use thiserror::Error;

/// Errors raised while evaluating rules against a context.
///
/// | Variant | When | Recovery |
/// |---------|------|----------|
/// | `UnimplementedRule` | A queried rule matched none of the recognized shapes | Fix the role data |
///
/// Evaluation is fail-fast: the error surfaces to the immediate caller
/// on the first broken rule the feature scan reaches, and nothing is
/// cached for the failed query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The rule for a queried feature has no recognized shape.
    ///
    /// Carries the textual form of the offending value so the broken
    /// role data can be located. Raised only when the feature is
    /// actually queried; unrelated features of the same role keep
    /// working.
    #[error("rule shape not implemented: {rule}")]
    UnimplementedRule {
        /// Textual form of the rejected rule value.
        rule: String,
    },
}

impl ErrorCode for EvalError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnimplementedRule { .. } => "UNIMPLEMENTED_RULE",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}
