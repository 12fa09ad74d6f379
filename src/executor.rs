//! Runs one rule against one field.
//!
//! The executor never mutates shared state. Each step takes the current
//! [`FieldState`] by value and hands back the next one together with a
//! [`Verdict`], so the working value and the bypass flag of one field can
//! never leak into another field or another validation call.

use std::borrow::Cow;
use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use crate::error::ExecutionError;
use crate::message::MessageContext;
use crate::predicate;
use crate::reference::resolve_params;
use crate::report::Report;
use crate::schema::rule::{Outcome, Rule, RuleCall, RuleKind};
use crate::schema::validator;
use crate::validation::ValidationContext;

/// Per-field state threaded through a chain.
///
/// The value stays borrowed from the data being validated until a transform
/// replaces it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FieldState<'a> {
    pub(crate) value: Cow<'a, Value>,
    pub(crate) bypass: bool,
}

impl<'a> FieldState<'a> {
    pub(crate) fn new(value: Cow<'a, Value>) -> Self {
        Self {
            value,
            bypass: false,
        }
    }
}

/// The field a chain is running for.
pub(crate) struct FieldScope<'a> {
    pub(crate) name: &'a str,
    pub(crate) ctx: &'a ValidationContext,
}

/// What a rule contributed to its field's report.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Verdict {
    Pass,
    /// A rendered message.
    Fail(String),
    /// A structured report, already labeled when the rule has a message.
    Nested(Report),
}

pub(crate) struct Step<'a> {
    pub(crate) state: FieldState<'a>,
    pub(crate) verdict: Verdict,
}

impl<'a> Step<'a> {
    fn pass(state: FieldState<'a>) -> Self {
        Self {
            state,
            verdict: Verdict::Pass,
        }
    }
}

/// Runs `rule`.
///
/// Parameters are resolved against the root data on every call and followed
/// by the leftover arguments of an enclosing registered rule. Errors from
/// consumer code and unusable parameters abort the call.
pub(crate) async fn execute<'a>(
    rule: &Rule,
    state: FieldState<'a>,
    scope: &FieldScope<'_>,
) -> Result<Step<'a>, ExecutionError> {
    if state.bypass {
        return Ok(Step::pass(state));
    }

    let ctx = scope.ctx;
    let mut params = resolve_params(&rule.params, ctx.root());
    params.extend_from_slice(ctx.args());
    let root = Arc::clone(ctx.root());

    let (outcome, params) = match &rule.kind {
        RuleKind::Nullable => {
            let bypass = predicate::is_null(&state.value);
            if bypass {
                trace!(field = scope.name, "nullable value, skipping remaining rules");
            }
            return Ok(Step::pass(FieldState { bypass, ..state }));
        }
        RuleKind::Transform(transform) => {
            let value = transform(&RuleCall::new(Cow::Borrowed(&*state.value), params, root))?;
            trace!(field = scope.name, rule = %rule.name, "value transformed");
            return Ok(Step::pass(FieldState {
                value: Cow::Owned(value),
                ..state
            }));
        }
        RuleKind::Check(check) => {
            let call = RuleCall::new(Cow::Borrowed(&*state.value), params, root);
            (check(&call)?, call.into_params())
        }
        RuleKind::AsyncCheck(check) => {
            let call = RuleCall::new(Cow::Borrowed(&*state.value), params.clone(), root);
            (check(call.into_owned()).await?, params)
        }
        RuleKind::Composite(schema) => {
            let nested = ctx.composite(params.clone());
            let outcome = match validator::run(schema, &state.value, nested).await? {
                Some(report) => Outcome::Invalid(report),
                None => Outcome::Pass,
            };
            (outcome, params)
        }
    };

    trace!(
        field = scope.name,
        rule = %rule.name,
        depth = ctx.depth(),
        passed = outcome.is_pass(),
        "rule executed"
    );

    let verdict = match outcome {
        Outcome::Pass => Verdict::Pass,
        Outcome::Fail => Verdict::Fail(render(rule, &state, scope, &params)?),
        Outcome::Invalid(inner) => {
            let label = render(rule, &state, scope, &params)?;
            if label.is_empty() {
                Verdict::Nested(inner)
            } else {
                Verdict::Nested(Report::List(vec![Report::Message(label), inner]))
            }
        }
    };
    Ok(Step { state, verdict })
}

fn render(
    rule: &Rule,
    state: &FieldState<'_>,
    scope: &FieldScope<'_>,
    params: &[Value],
) -> Result<String, ExecutionError> {
    let ctx = MessageContext {
        name: scope.name,
        value: &state.value,
    };
    Ok(rule.message.render(&ctx, params)?)
}
