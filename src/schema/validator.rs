//! Field-by-field validation.
//!
//! Each field goes through the same stages:
//!
//! 1. **pre-chain**: `required`, then `nullable`. A nullable null-like value
//!    ends the field here without error.
//! 2. **shape**: the value must be an object; the nested schema runs against
//!    it with the same root data.
//! 3. **items**: the value must be an array; every element runs against the
//!    item schema, failures are kept under their original index.
//! 4. **chain**: the ordinary rules, in order.
//!
//! The first stage that reports ends the field.

use std::borrow::Cow;
use std::collections::BTreeMap;

use futures::future::{BoxFuture, FutureExt};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::ExecutionError;
use crate::executor::{execute, FieldScope, FieldState, Verdict};
use crate::message::defaults;
use crate::predicate;
use crate::report::Report;
use crate::schema::rule::Rule;
use crate::schema::{Chain, Schema};
use crate::validation::ValidationContext;

/// Key a raw chain validates its value under.
pub(crate) const RAW_KEY: &str = "value";

/// Wraps the input of a raw schema as `{"value": data}`.
pub(crate) fn wrap<'a>(schema: &Schema, data: &'a Value) -> Cow<'a, Value> {
    if schema.is_raw() {
        let mut wrapped = Map::new();
        wrapped.insert(RAW_KEY.to_string(), data.clone());
        Cow::Owned(Value::Object(wrapped))
    } else {
        Cow::Borrowed(data)
    }
}

/// Looks up a field without copying it. A raw schema's single field is the
/// data itself.
fn field_value<'a>(schema: &Schema, data: &'a Value, name: &str) -> Cow<'a, Value> {
    let found = if schema.is_raw() { Some(data) } else { data.get(name) };
    found.map_or(Cow::Owned(Value::Null), Cow::Borrowed)
}

/// Validates `data` against every field of `schema`.
///
/// Returns `None` when all fields pass. For a raw schema the report of its
/// single field is returned unwrapped.
pub(crate) fn run<'a>(
    schema: &'a Schema,
    data: &'a Value,
    ctx: ValidationContext,
) -> BoxFuture<'a, Result<Option<Report>, ExecutionError>> {
    async move {
        let mut report = IndexMap::new();

        for (name, chain) in schema.fields() {
            let value = field_value(schema, data, name);
            if let Some(field_report) = validate_field(name, chain, value, &ctx).await? {
                report.insert(name.clone(), field_report);
            }
        }

        if report.is_empty() {
            return Ok(None);
        }
        if schema.is_raw() {
            return Ok(report.swap_remove(RAW_KEY));
        }
        Ok(Some(Report::Fields(report)))
    }
    .boxed()
}

async fn validate_field(
    name: &str,
    chain: &Chain,
    value: Cow<'_, Value>,
    ctx: &ValidationContext,
) -> Result<Option<Report>, ExecutionError> {
    let scope = FieldScope { name, ctx };
    let gates = [chain.required.as_ref(), chain.nullable.as_ref()];
    let (state, errors) =
        run_rules(gates.into_iter().flatten(), FieldState::new(value), &scope).await?;
    if errors.is_some() {
        return Ok(errors);
    }
    if state.bypass {
        return Ok(None);
    }

    if let Some(shape) = &chain.shape {
        if !predicate::is_object(&state.value) {
            return Ok(Some(Report::from_messages([defaults::OBJECT])));
        }
        if let Some(report) = run(shape, &state.value, ctx.nested()).await? {
            return Ok(Some(report));
        }
    }

    if let Some(items) = &chain.items {
        let Some(elements) = state.value.as_array() else {
            return Ok(Some(Report::from_messages([defaults::ARRAY])));
        };
        let mut failures = BTreeMap::new();
        for (index, element) in elements.iter().enumerate() {
            if let Some(report) = run(items, element, ctx.nested()).await? {
                failures.insert(index, report);
                if ctx.abort_early() {
                    break;
                }
            }
        }
        if !failures.is_empty() {
            trace!(field = name, failed_items = failures.len(), "array items failed");
            return Ok(Some(Report::Items(failures)));
        }
    }

    let (_, errors) = run_rules(chain.rules.iter(), state, &scope).await?;
    Ok(errors)
}

/// Runs rules in order, threading the field state through them.
///
/// A failing rule appends its message; a structured failure replaces what
/// was collected so far. With `abort_early` the first failure stops the run.
async fn run_rules<'r, 'v, I>(
    rules: I,
    mut state: FieldState<'v>,
    scope: &FieldScope<'_>,
) -> Result<(FieldState<'v>, Option<Report>), ExecutionError>
where
    I: IntoIterator<Item = &'r Rule>,
{
    let mut errors: Option<Report> = None;

    for rule in rules {
        let step = execute(rule, state, scope).await?;
        state = step.state;

        match step.verdict {
            Verdict::Pass => continue,
            Verdict::Fail(message) => {
                errors = Some(match errors {
                    Some(report) => report.with_message(message),
                    None => Report::from_messages([message]),
                });
            }
            Verdict::Nested(report) => errors = Some(report),
        }

        if scope.ctx.abort_early() {
            break;
        }
    }

    Ok((state, errors))
}
