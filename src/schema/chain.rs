//! The immutable rule-chain builder.
//!
//! Every builder method borrows its receiver and returns a new [`Chain`]. The
//! receiver is never modified, so a base chain can be shared and extended in
//! different directions:
//!
//! ```rust
//! use rulechain::Chain;
//!
//! let base = Chain::new().string();
//! let short = base.max(5);
//! let long = base.min(10);
//!
//! assert_eq!(base.len(), 1);
//! assert_eq!(short.len(), 2);
//! assert_eq!(long.len(), 2);
//! ```
//!
//! Structural mistakes (`required` together with `nullable`, rules on a
//! shaped chain, `error` before any rule) do not panic and do not change the
//! builder signatures. They are recorded in the derived chain and reported
//! by [`Chain::check`] and by anything that turns the chain into a
//! [`Schema`].

use std::future::Future;

use regex::Regex;
use serde_json::Value;

use crate::error::{RuleError, SchemaError};
use crate::message::{defaults, Message};
use crate::predicate;
use crate::reference::Param;
use crate::registry::RuleRegistry;
use crate::schema::rule::{CastHint, Outcome, Rule, RuleCall, RuleKind};
use crate::schema::Schema;

/// An ordered list of rules plus the field-level gates and nested schemas.
#[derive(Debug, Clone, Default)]
pub struct Chain {
    pub(crate) rules: Vec<Rule>,
    pub(crate) required: Option<Rule>,
    pub(crate) nullable: Option<Rule>,
    pub(crate) shape: Option<Schema>,
    pub(crate) items: Option<Schema>,
    defect: Option<SchemaError>,
}

impl Chain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_defect(mut self, defect: SchemaError) -> Self {
        if self.defect.is_none() {
            self.defect = Some(defect);
        }
        self
    }

    /// Appends a rule.
    pub fn with_rule(&self, rule: Rule) -> Chain {
        let mut next = self.clone();
        if next.shape.is_some() {
            return next.with_defect(SchemaError::RulesOnShape);
        }
        next.rules.push(rule);
        next
    }

    /// Inserts a rule right before the last one, or appends it to an empty
    /// chain.
    ///
    /// ```rust
    /// use rulechain::{Chain, Rule};
    /// use serde_json::Value;
    ///
    /// let to_number = Rule::transform(|value, _| {
    ///     Ok(value
    ///         .as_str()
    ///         .and_then(|s| s.parse::<f64>().ok())
    ///         .map_or(value.clone(), Value::from))
    /// });
    /// let chain = Chain::new().required().number().splice_before_last(to_number);
    /// let names: Vec<_> = chain.rules().iter().map(|r| r.name()).collect();
    /// assert_eq!(names, ["transform", "number"]);
    /// ```
    pub fn splice_before_last(&self, rule: Rule) -> Chain {
        if self.rules.is_empty() {
            return self.with_rule(rule);
        }
        let mut next = self.clone();
        if next.shape.is_some() {
            return next.with_defect(SchemaError::RulesOnShape);
        }
        let at = next.rules.len() - 1;
        next.rules.insert(at, rule);
        next
    }

    fn builtin<F>(
        &self,
        name: &'static str,
        message: &'static str,
        cast: Option<CastHint>,
        f: F,
    ) -> Chain
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let mut rule = Rule::builtin(name, message, move |call| Ok(f(call.value())));
        rule.cast = cast;
        self.with_rule(rule)
    }

    /// A JSON string.
    pub fn string(&self) -> Chain {
        self.builtin("string", defaults::STRING, Some(CastHint::String), predicate::is_string)
    }

    /// Any JSON number, integral or not.
    pub fn number(&self) -> Chain {
        self.builtin("number", defaults::NUMBER, Some(CastHint::Number), predicate::is_number)
    }

    /// A number without a fractional part.
    pub fn integer(&self) -> Chain {
        self.builtin("integer", defaults::INTEGER, Some(CastHint::Number), predicate::is_integer)
    }

    /// A JSON object (arrays and null are not objects).
    pub fn object(&self) -> Chain {
        self.builtin("object", defaults::OBJECT, None, predicate::is_object)
    }

    /// A JSON array.
    pub fn array(&self) -> Chain {
        self.builtin("array", defaults::ARRAY, None, predicate::is_array)
    }

    /// A string that looks like an email address.
    pub fn email(&self) -> Chain {
        self.builtin("email", defaults::EMAIL, Some(CastHint::String), predicate::is_email)
    }

    /// A rule that always passes.
    pub fn noop(&self) -> Chain {
        let rule = Rule::builtin("noop", "", |_| Ok(true));
        self.with_rule(rule)
    }

    /// Rejects null, missing and empty-string values before any other rule.
    pub fn required(&self) -> Chain {
        let mut next = self.clone();
        next.required = Some(Rule::builtin("required", defaults::REQUIRED, |call| {
            Ok(!predicate::is_null(call.value()))
        }));
        if next.nullable.is_some() {
            return next.with_defect(SchemaError::RequiredAndNullable);
        }
        next
    }

    /// Skips the rest of the chain when the value is null, missing or an
    /// empty string.
    ///
    /// ```rust
    /// use rulechain::{Chain, Schema};
    /// use serde_json::json;
    ///
    /// futures::executor::block_on(async {
    ///     let schema = Schema::object([("nickname", Chain::new().nullable().string().min(3))]).unwrap();
    ///     assert!(schema.validate(&json!({"nickname": ""})).await.unwrap().is_success());
    ///     assert!(schema.validate(&json!({})).await.unwrap().is_success());
    ///     assert!(schema.validate(&json!({"nickname": "ab"})).await.unwrap().is_failure());
    /// });
    /// ```
    pub fn nullable(&self) -> Chain {
        let mut next = self.clone();
        next.nullable = Some(Rule::new("nullable", RuleKind::Nullable, Message::none()));
        if next.required.is_some() {
            return next.with_defect(SchemaError::RequiredAndNullable);
        }
        next
    }

    /// Strings matching a regular expression.
    ///
    /// # Errors
    ///
    /// [`SchemaError::InvalidPattern`] when the pattern does not compile.
    pub fn matches(&self, pattern: &str) -> Result<Chain, SchemaError> {
        let regex = Regex::new(pattern).map_err(|err| SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: err.to_string(),
        })?;
        Ok(self.matches_regex(regex))
    }

    /// Strings matching an already compiled regular expression.
    pub fn matches_regex(&self, regex: Regex) -> Chain {
        self.builtin("matches", defaults::MATCHES, None, move |value| {
            predicate::is_match(value, &regex)
        })
    }

    /// Numbers at least `limit`, or strings at least `limit` characters long.
    ///
    /// The limit may be a [`Reference`](crate::Reference). A referenced limit
    /// that is not a number when the rule runs aborts validation with
    /// [`ExecutionError::Schema`](crate::ExecutionError::Schema). A literal
    /// limit that is not a number is a defect of the chain.
    ///
    /// ```rust
    /// use rulechain::{reference, Chain, Schema};
    /// use serde_json::json;
    ///
    /// futures::executor::block_on(async {
    ///     let schema = Schema::object([
    ///         ("min", Chain::new().number()),
    ///         ("max", Chain::new().number().min(reference("min").unwrap())),
    ///     ])
    ///     .unwrap();
    ///
    ///     assert!(schema.validate(&json!({"min": 10, "max": 15})).await.unwrap().is_success());
    ///
    ///     let err = schema
    ///         .validate(&json!({"min": 10, "max": 5}))
    ///         .await
    ///         .unwrap()
    ///         .into_result()
    ///         .unwrap_err();
    ///     assert!(err.report().field("max").is_some());
    ///     assert!(err.report().field("min").is_none());
    /// });
    /// ```
    pub fn min(&self, limit: impl Into<Param>) -> Chain {
        let rule = Rule::builtin("min", defaults::MIN, |call| {
            Ok(predicate::is_at_least(call.value(), call.param(0))?)
        });
        self.with_limit(rule, limit.into())
    }

    /// Numbers at most `limit`, or strings at most `limit` characters long.
    ///
    /// A literal limit that is not a number is a defect of the chain.
    pub fn max(&self, limit: impl Into<Param>) -> Chain {
        let rule = Rule::builtin("max", defaults::MAX, |call| {
            Ok(predicate::is_at_most(call.value(), call.param(0))?)
        });
        self.with_limit(rule, limit.into())
    }

    fn with_limit(&self, rule: Rule, limit: Param) -> Chain {
        let defect = if limit.has_reference() {
            None
        } else {
            let literal = limit.resolve(&Value::Null);
            (!literal.is_number())
                .then(|| SchemaError::ExpectedNumber(predicate::describe(&literal)))
        };
        let next = self.with_rule(rule.with_params([limit]));
        match defect {
            Some(defect) => next.with_defect(defect),
            None => next,
        }
    }

    /// Membership in a list of allowed values.
    ///
    /// An empty literal list, or a literal that is not a list, is a defect of
    /// the chain. A referenced list is checked when the rule runs.
    pub fn one_of(&self, allowed: impl Into<Param>) -> Chain {
        let allowed = allowed.into();
        let defect = match &allowed {
            Param::List(items) if items.is_empty() => Some(SchemaError::EmptyOneOf),
            Param::Value(Value::Array(items)) if items.is_empty() => Some(SchemaError::EmptyOneOf),
            Param::Value(other) if !other.is_array() => {
                Some(SchemaError::ExpectedList(other.to_string()))
            }
            Param::Map(_) => Some(SchemaError::ExpectedList("a map".to_string())),
            _ => None,
        };

        let rule = Rule::builtin("one_of", defaults::ONE_OF, |call| {
            Ok(predicate::is_one_of(call.value(), call.param(0))?)
        });
        let next = self.with_rule(rule.with_params([allowed]));
        match defect {
            Some(defect) => next.with_defect(defect),
            None => next,
        }
    }

    /// Equality with a literal or a referenced value.
    pub fn equal(&self, expected: impl Into<Param>) -> Chain {
        let rule = Rule::builtin("equal", defaults::EQUAL, |call| {
            Ok(predicate::is_equal(call.value(), call.param(0)))
        });
        self.with_rule(rule.with_params([expected.into()]))
    }

    /// Defers to a consumer predicate.
    ///
    /// The predicate returns `Ok(true)`/`Ok(false)`, or an [`Outcome`] for a
    /// structured failure. An `Err` is a bug in the predicate: it aborts the
    /// whole validation call instead of becoming a message.
    ///
    /// ```rust
    /// use rulechain::{Chain, Schema};
    /// use serde_json::json;
    ///
    /// futures::executor::block_on(async {
    ///     let even = Chain::new()
    ///         .integer()
    ///         .custom(|call| Ok(call.value().as_i64().is_some_and(|n| n % 2 == 0)))
    ///         .error("{value} is odd");
    ///     let schema = Schema::new(even).unwrap();
    ///
    ///     let err = schema.validate(&json!(3)).await.unwrap().into_result().unwrap_err();
    ///     assert_eq!(err.report().messages(), vec!["3 is odd"]);
    /// });
    /// ```
    pub fn custom<F, O>(&self, f: F) -> Chain
    where
        F: Fn(&RuleCall<'_>) -> Result<O, RuleError> + Send + Sync + 'static,
        O: 'static,
        Outcome: From<O>,
    {
        self.with_rule(Rule::check("custom", f))
    }

    /// Like [`custom`](Chain::custom), with parameters that are resolved on
    /// every run and handed to the predicate through [`RuleCall::param`].
    pub fn custom_with<F, O, I, P>(&self, f: F, params: I) -> Chain
    where
        F: Fn(&RuleCall<'_>) -> Result<O, RuleError> + Send + Sync + 'static,
        O: 'static,
        Outcome: From<O>,
        I: IntoIterator<Item = P>,
        P: Into<Param>,
    {
        self.with_rule(Rule::check("custom", f).with_params(params))
    }

    /// Defers to an asynchronous consumer predicate.
    pub fn custom_async<F, Fut, O>(&self, f: F) -> Chain
    where
        F: Fn(RuleCall<'static>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, RuleError>> + Send + 'static,
        O: 'static,
        Outcome: From<O>,
    {
        self.with_rule(Rule::check_async("custom", f))
    }

    /// Replaces the working value seen by the following rules of this chain.
    ///
    /// The function receives the current value and the root data. The input
    /// handed to `validate` is never modified.
    pub fn transform<F>(&self, f: F) -> Chain
    where
        F: Fn(&Value, &Value) -> Result<Value, RuleError> + Send + Sync + 'static,
    {
        self.with_rule(Rule::transform(f))
    }

    /// Replaces the message of the last rule.
    ///
    /// Accepts a template (`"{name} must be at least {0}"`) or a
    /// [`Message::dynamic`] function. Earlier rules keep their messages.
    pub fn error(&self, message: impl Into<Message>) -> Chain {
        let mut next = self.clone();
        match next.rules.pop() {
            Some(last) => {
                next.rules.push(last.with_message(message));
                next
            }
            None => next.with_defect(SchemaError::ErrorWithoutRule),
        }
    }

    /// Validates an object-valued field against nested field chains.
    ///
    /// A shaped chain cannot carry ordinary rules. References inside the
    /// nested chains still resolve against the outer root data.
    pub fn shape<I, K>(&self, fields: I) -> Chain
    where
        I: IntoIterator<Item = (K, Chain)>,
        K: Into<String>,
    {
        match Schema::object(fields) {
            Ok(schema) => self.shape_schema(schema),
            Err(defect) => self.clone().with_defect(defect),
        }
    }

    /// Like [`shape`](Chain::shape), with an already built schema.
    pub fn shape_schema(&self, schema: Schema) -> Chain {
        let mut next = self.clone();
        next.shape = Some(schema);
        if !next.rules.is_empty() {
            return next.with_defect(SchemaError::RulesOnShape);
        }
        next
    }

    /// Validates every element of an array-valued field against `item`.
    ///
    /// Failing elements report under their original index.
    pub fn of(&self, item: Chain) -> Chain {
        match Schema::new(item) {
            Ok(schema) => self.of_schema(schema),
            Err(defect) => self.clone().with_defect(defect),
        }
    }

    /// Like [`of`](Chain::of), with an object schema for the elements.
    pub fn of_schema(&self, schema: Schema) -> Chain {
        let mut next = self.clone();
        next.items = Some(schema);
        next
    }

    /// Appends a rule by name: a built-in type rule or one installed in
    /// `registry`. Parameters are forwarded to the rule.
    ///
    /// # Errors
    ///
    /// [`SchemaError::UnknownRule`] when the name is neither.
    pub fn named<I, P>(
        &self,
        registry: &RuleRegistry,
        name: &str,
        params: I,
    ) -> Result<Chain, SchemaError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Param>,
    {
        let params: Vec<Param> = params.into_iter().map(Into::into).collect();
        if let Some(rule) = registry.rule(name) {
            return Ok(self.with_rule(rule.with_params(params)));
        }

        let mut typed = match name {
            "string" => self.string(),
            "number" => self.number(),
            "integer" => self.integer(),
            "object" => self.object(),
            "array" => self.array(),
            "email" => self.email(),
            other => return Err(SchemaError::UnknownRule(other.to_string())),
        };
        if let Some(last) = typed.rules.pop() {
            typed.rules.push(last.with_params(params));
        }
        Ok(typed)
    }

    /// Reports the first structural defect recorded while building.
    ///
    /// # Errors
    ///
    /// The recorded [`SchemaError`].
    pub fn check(&self) -> Result<(), SchemaError> {
        match &self.defect {
            Some(defect) => Err(defect.clone()),
            None => Ok(()),
        }
    }

    /// The type the chain expects, taken from its first typed rule.
    ///
    /// `None` when no rule declares a type, or when the first declaring rule
    /// is free-form (custom, transform).
    pub fn cast_hint(&self) -> Option<CastHint> {
        match self.rules.iter().find_map(|rule| rule.cast) {
            Some(CastHint::Unknown) | None => None,
            Some(hint) => Some(hint),
        }
    }

    /// The ordinary rules, in execution order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of ordinary rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if the chain has no ordinary rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// True once [`required`](Chain::required) was applied.
    pub fn is_required(&self) -> bool {
        self.required.is_some()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable.is_some()
    }

    /// The nested schema attached with [`shape`](Chain::shape).
    pub fn shape_of(&self) -> Option<&Schema> {
        self.shape.as_ref()
    }

    /// The element schema attached with [`of`](Chain::of).
    pub fn item_schema(&self) -> Option<&Schema> {
        self.items.as_ref()
    }
}
