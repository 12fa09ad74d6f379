//! Error message rendering.
//!
//! A rule's message is either a static template or a function computing the
//! text from the failing field. Both end up in the same interpolation step,
//! which understands three kinds of tokens:
//!
//! - `{value}`: the field's working value (`null` renders as nothing)
//! - `{name}`: the field name
//! - `{0}`, `{1}`, ...: the rule's resolved parameters
//!
//! Any other token renders as an empty string.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::RuleError;

/// Default messages of the built-in rules.
pub mod defaults {
    pub const STRING: &str = "This value must be a string.";
    pub const NUMBER: &str = "This value must be a number.";
    pub const INTEGER: &str = "This value must be an integer.";
    pub const OBJECT: &str = "This value must be an object.";
    pub const ARRAY: &str = "This value must be an array.";
    pub const EMAIL: &str = "This value must be a valid email address.";
    pub const REQUIRED: &str = "This value is required.";
    pub const MIN: &str = "This value is below the allowed minimum.";
    pub const MAX: &str = "This value exceeds the allowed maximum.";
    pub const EQUAL: &str = "This value does not match the expected value.";
    pub const ONE_OF: &str = "This value is not one of the allowed values.";
    pub const MATCHES: &str = "This value does not match the required pattern.";
    pub const CUSTOM: &str = "This value is invalid.";
}

type DynamicFn =
    dyn Fn(&MessageContext<'_>, &[Value]) -> Result<String, RuleError> + Send + Sync;

/// What a message is rendered from.
#[derive(Debug, Clone, Copy)]
pub struct MessageContext<'a> {
    /// Name of the field being validated (`value` for raw chains).
    pub name: &'a str,
    /// Working value at the time the rule ran.
    pub value: &'a Value,
}

/// An error message attached to a rule.
#[derive(Clone)]
pub enum Message {
    /// A template interpolated with the field context.
    Template(String),
    /// Computes the text, which is then interpolated like a template.
    Dynamic(Arc<DynamicFn>),
}

impl Message {
    /// An empty message. A composite rule without its own message surfaces
    /// the inner report instead of a label.
    pub fn none() -> Self {
        Message::Template(String::new())
    }

    /// Wraps a message function.
    ///
    /// ```rust
    /// use rulechain::Message;
    /// use serde_json::json;
    ///
    /// let msg = Message::dynamic(|ctx, params| {
    ///     Ok(format!("{} must be at least {}", ctx.name, params[0]))
    /// });
    /// let ctx = rulechain::MessageContext { name: "age", value: &json!(3) };
    /// assert_eq!(msg.render(&ctx, &[json!(18)]).unwrap(), "age must be at least 18");
    /// ```
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&MessageContext<'_>, &[Value]) -> Result<String, RuleError> + Send + Sync + 'static,
    {
        Message::Dynamic(Arc::new(f))
    }

    /// True for an empty template.
    pub fn is_empty(&self) -> bool {
        matches!(self, Message::Template(t) if t.is_empty())
    }

    /// Renders the final text.
    ///
    /// # Errors
    ///
    /// Whatever a dynamic message function returns. Formatting faults are
    /// never swallowed.
    pub fn render(&self, ctx: &MessageContext<'_>, params: &[Value]) -> Result<String, RuleError> {
        match self {
            Message::Template(template) => Ok(interpolate(template, ctx, params)),
            Message::Dynamic(f) => {
                let computed = f(ctx, params)?;
                Ok(interpolate(&computed, ctx, params))
            }
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Template(t) => f.debug_tuple("Template").field(t).finish(),
            Message::Dynamic(_) => f.write_str("Dynamic(<fn>)"),
        }
    }
}

impl From<&str> for Message {
    fn from(template: &str) -> Self {
        Message::Template(template.to_string())
    }
}

impl From<String> for Message {
    fn from(template: String) -> Self {
        Message::Template(template)
    }
}

/// Replaces `{token}` occurrences. An unterminated `{` is kept verbatim.
pub fn interpolate(template: &str, ctx: &MessageContext<'_>, params: &[Value]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if close > 0 => {
                out.push_str(&render_token(&after[..close], ctx, params));
                rest = &after[close + 1..];
            }
            Some(_) => {
                out.push_str("{}");
                rest = &after[1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn render_token(token: &str, ctx: &MessageContext<'_>, params: &[Value]) -> String {
    match token {
        "value" => display_value(ctx.value),
        "name" => ctx.name.to_string(),
        _ if token.bytes().all(|b| b.is_ascii_digit()) => token
            .parse::<usize>()
            .ok()
            .and_then(|idx| params.get(idx))
            .map(display_value)
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Strings render bare, null renders as nothing, everything else as JSON.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
