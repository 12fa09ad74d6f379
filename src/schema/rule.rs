//! Rule descriptors.
//!
//! A [`Rule`] pairs a check with its parameters and message. Rules are
//! immutable once placed in a chain; the builder clones them, never edits
//! them in place.

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, TryFutureExt};
use serde_json::Value;

use crate::error::{ExecutionError, RuleError, ValidationError};
use crate::message::{defaults, Message};
use crate::reference::Param;
use crate::report::Report;
use crate::schema::Schema;

/// Everything a rule function gets to see.
///
/// `params` holds the rule's own parameters with every reference resolved,
/// followed by the parameters of the registered rule the chain runs inside
/// of, if any. Synchronous rules borrow the value from the data being
/// validated; asynchronous rules receive an owned call.
#[derive(Debug, Clone)]
pub struct RuleCall<'a> {
    value: Cow<'a, Value>,
    params: Vec<Value>,
    root: Arc<Value>,
}

impl<'a> RuleCall<'a> {
    pub(crate) fn new(value: Cow<'a, Value>, params: Vec<Value>, root: Arc<Value>) -> Self {
        Self {
            value,
            params,
            root,
        }
    }

    /// The working value of the field.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The resolved parameter at `index`, or `null` when absent.
    pub fn param(&self, index: usize) -> &Value {
        self.params.get(index).unwrap_or(&Value::Null)
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// The root data of the validation call.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Detaches the call from the data being validated.
    pub fn into_owned(self) -> RuleCall<'static> {
        RuleCall {
            value: Cow::Owned(self.value.into_owned()),
            params: self.params,
            root: self.root,
        }
    }

    pub(crate) fn into_params(self) -> Vec<Value> {
        self.params
    }
}

/// Result of a rule check.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Pass,
    /// Failed; reported with the rule's message.
    Fail,
    /// Failed with a structured report of its own.
    Invalid(Report),
}

impl Outcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }
}

impl From<bool> for Outcome {
    fn from(valid: bool) -> Self {
        if valid {
            Outcome::Pass
        } else {
            Outcome::Fail
        }
    }
}

impl From<ValidationError> for Outcome {
    fn from(err: ValidationError) -> Self {
        Outcome::Invalid(err.into_report())
    }
}

/// Type a rule expects its input to have, for binding layers that coerce
/// raw text before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastHint {
    Number,
    Boolean,
    String,
    /// Free-form input (custom and transform rules).
    Unknown,
}

impl CastHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            CastHint::Number => "number",
            CastHint::Boolean => "boolean",
            CastHint::String => "string",
            CastHint::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CastHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) type CheckFn =
    dyn Fn(&RuleCall<'_>) -> Result<Outcome, ExecutionError> + Send + Sync;
pub(crate) type AsyncCheckFn =
    dyn Fn(RuleCall<'static>) -> BoxFuture<'static, Result<Outcome, ExecutionError>> + Send + Sync;
pub(crate) type TransformFn =
    dyn Fn(&RuleCall<'_>) -> Result<Value, ExecutionError> + Send + Sync;

#[derive(Clone)]
pub(crate) enum RuleKind {
    Check(Arc<CheckFn>),
    AsyncCheck(Arc<AsyncCheckFn>),
    Transform(Arc<TransformFn>),
    /// Sets the bypass flag for null-like values.
    Nullable,
    /// Runs a registered chain as a nested raw schema.
    Composite(Schema),
}

/// A single validation rule.
#[derive(Clone)]
pub struct Rule {
    pub(crate) name: Arc<str>,
    pub(crate) kind: RuleKind,
    pub(crate) params: Vec<Param>,
    pub(crate) message: Message,
    pub(crate) cast: Option<CastHint>,
}

impl Rule {
    pub(crate) fn new(name: impl Into<Arc<str>>, kind: RuleKind, message: Message) -> Self {
        Self {
            name: name.into(),
            kind,
            params: Vec::new(),
            message,
            cast: None,
        }
    }

    /// Builds a rule from a synchronous check.
    ///
    /// ```rust
    /// use rulechain::{Chain, Rule};
    ///
    /// let even = Rule::check("even", |call| {
    ///     Ok(call.value().as_i64().is_some_and(|n| n % 2 == 0))
    /// });
    /// let chain = Chain::new().integer().with_rule(even);
    /// assert_eq!(chain.len(), 2);
    /// ```
    pub fn check<F, O>(name: &str, f: F) -> Self
    where
        F: Fn(&RuleCall<'_>) -> Result<O, RuleError> + Send + Sync + 'static,
        O: 'static,
        Outcome: From<O>,
    {
        let check: Arc<CheckFn> = Arc::new(move |call: &RuleCall<'_>| {
            f(call).map(Outcome::from).map_err(ExecutionError::from)
        });
        Self::new(name, RuleKind::Check(check), Message::from(defaults::CUSTOM))
            .with_cast(CastHint::Unknown)
    }

    /// Builds a rule from an asynchronous check.
    ///
    /// The check owns its [`RuleCall`], so the returned future may outlive
    /// the data being validated.
    pub fn check_async<F, Fut, O>(name: &str, f: F) -> Self
    where
        F: Fn(RuleCall<'static>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, RuleError>> + Send + 'static,
        O: 'static,
        Outcome: From<O>,
    {
        let check: Arc<AsyncCheckFn> = Arc::new(move |call: RuleCall<'static>| {
            f(call)
                .map_ok(Outcome::from)
                .map_err(ExecutionError::from)
                .boxed()
        });
        Self::new(name, RuleKind::AsyncCheck(check), Message::from(defaults::CUSTOM))
            .with_cast(CastHint::Unknown)
    }

    /// Builds a rule replacing the working value seen by later rules.
    ///
    /// Transforms always pass. Binding layers use this with
    /// [`Chain::splice_before_last`](crate::Chain::splice_before_last) to
    /// coerce raw input right before a typed rule.
    pub fn transform<F>(f: F) -> Self
    where
        F: Fn(&Value, &Value) -> Result<Value, RuleError> + Send + Sync + 'static,
    {
        let transform: Arc<TransformFn> = Arc::new(move |call: &RuleCall<'_>| {
            f(call.value(), call.root()).map_err(ExecutionError::from)
        });
        Self::new("transform", RuleKind::Transform(transform), Message::none())
            .with_cast(CastHint::Unknown)
    }

    pub(crate) fn builtin<F>(name: &'static str, message: &'static str, f: F) -> Self
    where
        F: Fn(&RuleCall<'_>) -> Result<bool, ExecutionError> + Send + Sync + 'static,
    {
        let check: Arc<CheckFn> = Arc::new(move |call: &RuleCall<'_>| f(call).map(Outcome::from));
        Self::new(name, RuleKind::Check(check), Message::from(message))
    }

    /// Replaces the message.
    pub fn with_message(mut self, message: impl Into<Message>) -> Self {
        self.message = message.into();
        self
    }

    /// Appends parameters, which are resolved on every run.
    pub fn with_params<I, P>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Param>,
    {
        self.params.extend(params.into_iter().map(Into::into));
        self
    }

    /// Sets the cast hint.
    pub fn with_cast(mut self, cast: CastHint) -> Self {
        self.cast = Some(cast);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn cast(&self) -> Option<CastHint> {
        self.cast
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("message", &self.message)
            .field("cast", &self.cast)
            .finish()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Rule>();
    assert_sync::<Rule>();
};
