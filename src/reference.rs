//! Deferred lookups into validation data.
//!
//! A [`Reference`] names a path and nothing else. It is stored inside a rule
//! as a [`Param`] and resolved against the root data each time the rule runs,
//! so `Chain::new().number().min(reference("min")?)` compares against whatever
//! `min` holds in the data being validated, not at construction time.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::path::JsonPath;

/// A path into the root data, resolved at execution time.
///
/// # Example
///
/// ```rust
/// use rulechain::Reference;
/// use serde_json::json;
///
/// let r = Reference::parse("settings.factor").unwrap();
/// assert_eq!(r.resolve(&json!({"settings": {"factor": 2}})), json!(2));
/// assert_eq!(r.resolve(&json!({"settings": 7})), json!(null));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    path: JsonPath,
}

impl Reference {
    /// Parses a dotted path such as `"a.b.0.c"`.
    ///
    /// # Errors
    ///
    /// [`SchemaError::InvalidReference`] for an empty path or an empty
    /// segment.
    pub fn parse(path: &str) -> Result<Self, SchemaError> {
        JsonPath::parse(path).map(Self::from_path)
    }

    /// Wraps an already built path.
    pub fn from_path(path: JsonPath) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &JsonPath {
        &self.path
    }

    /// Looks the path up in `root`. Missing values resolve to `null`.
    pub fn resolve(&self, root: &Value) -> Value {
        self.path.resolve(root).cloned().unwrap_or(Value::Null)
    }
}

impl From<JsonPath> for Reference {
    fn from(path: JsonPath) -> Self {
        Self::from_path(path)
    }
}

/// Shorthand for [`Reference::parse`].
pub fn reference(path: &str) -> Result<Reference, SchemaError> {
    Reference::parse(path)
}

/// A rule parameter: a literal, a reference, or a structure containing
/// references at any depth.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Value(Value),
    Ref(Reference),
    List(Vec<Param>),
    Map(IndexMap<String, Param>),
}

impl Param {
    /// Builds a list parameter.
    pub fn list<I, P>(items: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Param>,
    {
        Param::List(items.into_iter().map(Into::into).collect())
    }

    /// Builds a map parameter, keeping key order.
    pub fn map<I, K, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: Into<Param>,
    {
        Param::Map(
            entries
                .into_iter()
                .map(|(k, p)| (k.into(), p.into()))
                .collect(),
        )
    }

    /// Replaces every reference with the value it points to in `root`.
    ///
    /// Pure: the parameter itself is untouched, so the same rule can be
    /// resolved any number of times against different data.
    pub fn resolve(&self, root: &Value) -> Value {
        match self {
            Param::Value(value) => value.clone(),
            Param::Ref(reference) => reference.resolve(root),
            Param::List(items) => Value::Array(items.iter().map(|p| p.resolve(root)).collect()),
            Param::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, p)| (k.clone(), p.resolve(root)))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }

    /// True if a reference occurs anywhere inside this parameter.
    pub fn has_reference(&self) -> bool {
        match self {
            Param::Value(_) => false,
            Param::Ref(_) => true,
            Param::List(items) => items.iter().any(Param::has_reference),
            Param::Map(entries) => entries.values().any(Param::has_reference),
        }
    }
}

/// Resolves a parameter list against `root`.
pub fn resolve_params(params: &[Param], root: &Value) -> Vec<Value> {
    params.iter().map(|p| p.resolve(root)).collect()
}

impl From<Value> for Param {
    fn from(value: Value) -> Self {
        Param::Value(value)
    }
}

impl From<Reference> for Param {
    fn from(reference: Reference) -> Self {
        Param::Ref(reference)
    }
}

impl From<Vec<Param>> for Param {
    fn from(items: Vec<Param>) -> Self {
        Param::List(items)
    }
}

impl From<&str> for Param {
    fn from(s: &str) -> Self {
        Param::Value(Value::from(s))
    }
}

impl From<String> for Param {
    fn from(s: String) -> Self {
        Param::Value(Value::from(s))
    }
}

impl From<bool> for Param {
    fn from(b: bool) -> Self {
        Param::Value(Value::from(b))
    }
}

impl From<i32> for Param {
    fn from(n: i32) -> Self {
        Param::Value(Value::from(n))
    }
}

impl From<i64> for Param {
    fn from(n: i64) -> Self {
        Param::Value(Value::from(n))
    }
}

impl From<u64> for Param {
    fn from(n: u64) -> Self {
        Param::Value(Value::from(n))
    }
}

impl From<f64> for Param {
    fn from(n: f64) -> Self {
        Param::Value(Value::from(n))
    }
}
