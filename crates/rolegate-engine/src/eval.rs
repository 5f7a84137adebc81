//! Rule evaluation.
//!
//! Pure decision functions over immutable rule data. The combination
//! semantics are the part worth memorizing:
//!
//! - one feature against one rule: [`authorize`]
//! - a feature set within one role: [`authorize_all`] — **AND** across
//!   features
//! - a feature set across roles: [`authorize_any_role`] — **OR** across
//!   roles, where each role must satisfy the whole feature set on its
//!   own; per-feature grants are never combined across roles
//!
//! # Pattern Matching
//!
//! `only`/`except` patterns are dot-segmented: `"sales.index"` matches
//! a context iff both `"sales"` and `"index"` are present, in any
//! order. A pattern list matches iff any pattern does (OR-of-AND).
//!
//! # Example
//!
//! ```
//! use rolegate_engine::eval::authorize;
//! use rolegate_types::{Context, Rule};
//!
//! let ctx = Context::new(["dashboard", "sales", "index"]);
//!
//! assert!(authorize(&Rule::only(["sales.index"]), &ctx)?);
//! assert!(!authorize(&Rule::except(["sales"]), &ctx)?);
//! assert!(!authorize(&Rule::Missing, &ctx)?);
//! # Ok::<(), rolegate_engine::EvalError>(())
//! ```

use crate::error::EvalError;
use rolegate_types::{Context, RoleRules, Rule};
use serde_json::Value;

/// Decides whether one rule permits access in `context`.
///
/// | Rule | Decision |
/// |------|----------|
/// | `Missing` | deny |
/// | `Boolean(b)` | `b` |
/// | `Any(v)` | truthiness of `v` (`false` denies, everything else allows) |
/// | `Only(ps)` | any pattern matches |
/// | `Except(ps)` | no pattern matches |
///
/// # Errors
///
/// [`EvalError::UnimplementedRule`] for [`Rule::Unrecognized`] values
/// and for `Any(null)`, where the clause value is absent rather than
/// explicitly false and guessing either way would be wrong.
pub fn authorize(rule: &Rule, context: &Context) -> Result<bool, EvalError> {
    match rule {
        Rule::Missing => Ok(false),
        Rule::Boolean(b) => Ok(*b),
        Rule::Any(Value::Null) => Err(EvalError::UnimplementedRule {
            rule: r#"{"any":null}"#.to_string(),
        }),
        Rule::Any(Value::Bool(false)) => Ok(false),
        Rule::Any(_) => Ok(true),
        Rule::Only(patterns) => Ok(matches_any(patterns, context)),
        Rule::Except(patterns) => Ok(!matches_any(patterns, context)),
        Rule::Unrecognized(value) => Err(EvalError::UnimplementedRule {
            rule: value.to_string(),
        }),
    }
}

/// Returns `true` iff at least one pattern matches the context.
///
/// A pattern matches iff every one of its dot-segments is contained in
/// the context. Patterns are expected lowercase (rule construction
/// guarantees it); an empty list matches nothing.
#[must_use]
pub fn matches_any(patterns: &[String], context: &Context) -> bool {
    patterns
        .iter()
        .any(|pattern| pattern.split('.').all(|segment| context.contains(segment)))
}

/// AND across `features` within one role, in feature order.
///
/// Short-circuits on the first denied feature, so a broken rule later
/// in the list is never reached once a denial is found.
///
/// # Errors
///
/// Propagates the first [`EvalError`] the scan reaches.
pub fn authorize_all(
    rules: &RoleRules,
    context: &Context,
    features: &[String],
) -> Result<bool, EvalError> {
    for feature in features {
        if !authorize(rules.rule(feature), context)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// OR across `roles`: allowed iff at least one role satisfies the whole
/// feature set via [`authorize_all`].
///
/// Roles are tried in order and the scan stops at the first role that
/// grants the full set. An empty role list denies.
///
/// # Errors
///
/// Propagates the first [`EvalError`] the scan reaches.
pub fn authorize_any_role(
    roles: &[RoleRules],
    context: &Context,
    features: &[String],
) -> Result<bool, EvalError> {
    for rules in roles {
        if authorize_all(rules, context, features)? {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolegate_types::{IntoTokens, Role};
    use serde_json::json;

    fn ctx(tokens: &[&str]) -> Context {
        Context::new(tokens)
    }

    fn rules(value: serde_json::Value) -> RoleRules {
        RoleRules::try_from(&value).unwrap()
    }

    // ── Single-rule decisions ────────────────────────────────────────

    #[test]
    fn missing_denies() {
        assert!(!authorize(&Rule::Missing, &ctx(&["home"])).unwrap());
    }

    #[test]
    fn boolean_is_the_literal() {
        assert!(authorize(&Rule::Boolean(true), &ctx(&[])).unwrap());
        assert!(!authorize(&Rule::Boolean(false), &ctx(&[])).unwrap());
    }

    #[test]
    fn any_uses_truthiness() {
        assert!(authorize(&Rule::any(true), &ctx(&[])).unwrap());
        assert!(!authorize(&Rule::any(false), &ctx(&[])).unwrap());

        // Only false is falsy; 0, "", and [] all allow.
        assert!(authorize(&Rule::any(0), &ctx(&[])).unwrap());
        assert!(authorize(&Rule::any(""), &ctx(&[])).unwrap());
        assert!(authorize(&Rule::Any(json!([])), &ctx(&[])).unwrap());
    }

    #[test]
    fn any_null_is_unimplemented() {
        let err = authorize(&Rule::Any(json!(null)), &ctx(&[])).unwrap_err();
        assert_eq!(
            err,
            EvalError::UnimplementedRule {
                rule: r#"{"any":null}"#.into()
            }
        );
    }

    #[test]
    fn unrecognized_is_unimplemented() {
        let rule = Rule::from_value(&json!({ "sometimes": ["a"] }));
        let err = authorize(&rule, &ctx(&["a"])).unwrap_err();
        assert_eq!(
            err,
            EvalError::UnimplementedRule {
                rule: r#"{"sometimes":["a"]}"#.into()
            }
        );
    }

    #[test]
    fn only_allows_on_pattern_match() {
        let rule = Rule::only(["sales"]);
        assert!(authorize(&rule, &ctx(&["sales"])).unwrap());
        assert!(!authorize(&rule, &ctx(&["home"])).unwrap());
    }

    #[test]
    fn except_denies_on_pattern_match() {
        let rule = Rule::except(["sales"]);
        assert!(!authorize(&rule, &ctx(&["sales", "index"])).unwrap());
        // The boundary case worth writing down: no except-pattern in
        // the context means access is granted.
        assert!(authorize(&rule, &ctx(&["home"])).unwrap());
    }

    // ── Dot patterns ─────────────────────────────────────────────────

    #[test]
    fn dot_pattern_requires_every_segment() {
        let patterns = vec!["sales.index".to_string()];
        assert!(matches_any(&patterns, &ctx(&["sales", "index"])));
        assert!(matches_any(&patterns, &ctx(&["index", "extra", "sales"])));
        assert!(!matches_any(&patterns, &ctx(&["sales"])));
        assert!(!matches_any(&patterns, &ctx(&["index"])));
    }

    #[test]
    fn pattern_list_is_or_of_and() {
        let patterns = vec!["users.reports".to_string(), "sales".to_string()];
        assert!(matches_any(&patterns, &ctx(&["sales"])));
        assert!(matches_any(&patterns, &ctx(&["users", "reports"])));
        assert!(!matches_any(&patterns, &ctx(&["users"])));
    }

    #[test]
    fn empty_pattern_list_matches_nothing() {
        assert!(!matches_any(&[], &ctx(&["anything"])));
    }

    #[test]
    fn empty_pattern_matches_nothing() {
        let patterns = "".into_tokens();
        assert!(!matches_any(&patterns, &ctx(&["a"])));
        assert!(!matches_any(&patterns, &ctx(&[])));
    }

    // ── Feature-set combination ──────────────────────────────────────

    #[test]
    fn all_features_must_pass() {
        let role = rules(json!({ "visit": true, "comment": false }));
        let context = ctx(&["sales"]);

        let visit = "visit".into_tokens();
        let both = ["visit", "comment"].into_tokens();

        assert!(authorize_all(&role, &context, &visit).unwrap());
        assert!(!authorize_all(&role, &context, &both).unwrap());
    }

    #[test]
    fn empty_feature_set_is_allowed() {
        let role = rules(json!({ "visit": false }));
        assert!(authorize_all(&role, &ctx(&[]), &[]).unwrap());
    }

    #[test]
    fn denial_short_circuits_before_broken_rules() {
        let role = rules(json!({ "comment": false, "broken": {} }));
        let features = ["comment", "broken"].into_tokens();
        // "comment" denies first, so the broken rule is never evaluated.
        assert!(!authorize_all(&role, &ctx(&[]), &features).unwrap());

        let reversed = ["broken", "comment"].into_tokens();
        assert!(authorize_all(&role, &ctx(&[]), &reversed).is_err());
    }

    #[test]
    fn example_scenario() {
        let role = rules(json!({
            "visit": { "any": true },
            "export": { "except": ["sales", "foo"] },
        }));
        let context = ctx(&["dashboard", "controllers", "sales", "index"]);

        assert!(authorize_all(&role, &context, &"visit".into_tokens()).unwrap());
        assert!(!authorize_all(&role, &context, &"export".into_tokens()).unwrap());
    }

    // ── Multi-role combination ───────────────────────────────────────

    fn multi_roles() -> Vec<RoleRules> {
        let value = json!([
            { "visit": { "only": ["users"] }, "export": { "only": ["users.reports"] } },
            { "visit": { "only": ["sales"] }, "export": { "only": ["sales.reports"] } },
        ]);
        match Role::try_from(&value).unwrap() {
            Role::Multi(roles) => roles,
            Role::Single(_) => unreachable!(),
        }
    }

    #[test]
    fn any_role_may_grant_the_set() {
        let roles = multi_roles();
        let visit = "visit".into_tokens();

        assert!(authorize_any_role(&roles, &ctx(&["users"]), &visit).unwrap());
        assert!(authorize_any_role(&roles, &ctx(&["sales"]), &visit).unwrap());
        assert!(!authorize_any_role(&roles, &ctx(&["finances"]), &visit).unwrap());
    }

    #[test]
    fn each_role_must_satisfy_the_whole_set() {
        // First role grants visit (users), second grants export
        // (sales.reports). In a users+sales+reports context each
        // feature is reachable through some role, but no single role
        // grants both, so the set is denied.
        let roles = vec![
            rules(json!({ "visit": { "only": ["users"] }, "export": false })),
            rules(json!({ "visit": false, "export": { "only": ["sales.reports"] } })),
        ];
        let context = ctx(&["users", "sales", "reports"]);
        let set = ["visit", "export"].into_tokens();

        assert!(!authorize_any_role(&roles, &context, &set).unwrap());
        assert!(authorize_any_role(&roles, &context, &"visit".into_tokens()).unwrap());
        assert!(authorize_any_role(&roles, &context, &"export".into_tokens()).unwrap());
    }

    #[test]
    fn empty_role_list_denies() {
        assert!(!authorize_any_role(&[], &ctx(&["any"]), &"visit".into_tokens()).unwrap());
    }

    #[test]
    fn granting_role_short_circuits_later_broken_roles() {
        let roles = vec![
            rules(json!({ "visit": true })),
            rules(json!({ "visit": { "weird": 1 } })),
        ];
        let visit = "visit".into_tokens();
        assert!(authorize_any_role(&roles, &ctx(&[]), &visit).unwrap());

        let reordered = vec![roles[1].clone(), roles[0].clone()];
        assert!(authorize_any_role(&reordered, &ctx(&[]), &visit).is_err());
    }

    // ─── Property-Based Tests ────────────────────────────────────────

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn token() -> impl Strategy<Value = String> {
            "[a-z]{1,6}"
        }

        fn pattern() -> impl Strategy<Value = String> {
            "[a-z]{1,4}(\\.[a-z]{1,4}){0,2}"
        }

        fn rule() -> impl Strategy<Value = Rule> {
            prop_oneof![
                any::<bool>().prop_map(Rule::Boolean),
                any::<bool>().prop_map(|b| Rule::Any(json!(b))),
                prop::collection::vec(pattern(), 0..3).prop_map(Rule::Only),
                prop::collection::vec(pattern(), 0..3).prop_map(Rule::Except),
                Just(Rule::Missing),
            ]
        }

        fn tokens() -> impl Strategy<Value = Vec<String>> {
            prop::collection::vec(token(), 0..5)
        }

        proptest! {
            #[test]
            fn matching_ignores_context_order(
                patterns in prop::collection::vec(pattern(), 0..4),
                context_tokens in tokens(),
            ) {
                let forward = Context::new(context_tokens.clone());
                let mut backwards = context_tokens;
                backwards.reverse();
                let reversed = Context::new(backwards);

                prop_assert_eq!(
                    matches_any(&patterns, &forward),
                    matches_any(&patterns, &reversed)
                );
            }

            #[test]
            fn authorize_is_deterministic(r in rule(), context_tokens in tokens()) {
                let context = Context::new(context_tokens);
                prop_assert_eq!(
                    authorize(&r, &context).ok(),
                    authorize(&r, &context).ok()
                );
            }

            #[test]
            fn only_and_except_are_complements(
                patterns in prop::collection::vec(pattern(), 0..4),
                context_tokens in tokens(),
            ) {
                let context = Context::new(context_tokens);
                let only = authorize(&Rule::Only(patterns.clone()), &context).unwrap();
                let except = authorize(&Rule::Except(patterns), &context).unwrap();
                prop_assert_ne!(only, except);
            }

            #[test]
            fn feature_set_is_and_of_single_checks(
                entries in prop::collection::hash_map(token(), rule(), 0..4),
                context_tokens in tokens(),
                features in prop::collection::vec(token(), 0..4),
            ) {
                let role: RoleRules = entries.into_iter().collect();
                let context = Context::new(context_tokens);

                let expected = features
                    .iter()
                    .try_fold(true, |acc, f| {
                        authorize(role.rule(f), &context).map(|ok| acc && ok)
                    });
                // Short-circuiting may skip an error the fold reaches, but
                // whenever both sides produce a value they must agree.
                if let (Ok(combined), Ok(expected)) =
                    (authorize_all(&role, &context, &features), expected)
                {
                    prop_assert_eq!(combined, expected);
                }
            }

            #[test]
            fn multi_role_is_or_of_whole_sets(
                first in prop::collection::hash_map(token(), rule(), 0..4),
                second in prop::collection::hash_map(token(), rule(), 0..4),
                context_tokens in tokens(),
                features in prop::collection::vec(token(), 0..3),
            ) {
                let roles: Vec<RoleRules> = vec![
                    first.into_iter().collect(),
                    second.into_iter().collect(),
                ];
                let context = Context::new(context_tokens);

                let per_role: Result<Vec<bool>, _> = roles
                    .iter()
                    .map(|r| authorize_all(r, &context, &features))
                    .collect();

                if let (Ok(combined), Ok(per_role)) =
                    (authorize_any_role(&roles, &context, &features), per_role)
                {
                    prop_assert_eq!(combined, per_role.iter().any(|&ok| ok));
                }
            }
        }
    }
}
