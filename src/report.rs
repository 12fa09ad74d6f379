//! Shape-preserving validation reports.
//!
//! A [`Report`] mirrors the structure of the validated data: a field of an
//! object schema reports under its name, an array item reports under its
//! original index, and a leaf field reports the list of messages produced by
//! its chain. Reports are sparse. A field or item without errors is absent,
//! never an empty placeholder.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::Violation;
use crate::path::{JsonPath, PathSegment};

/// A validation report.
///
/// # Example
///
/// ```rust
/// use rulechain::{Chain, Schema};
/// use serde_json::json;
///
/// futures::executor::block_on(async {
///     let schema = Schema::object([("name", Chain::new().string().min(5))]).unwrap();
///     let result = schema.validate(&json!({"name": "abc"})).await.unwrap();
///
///     let error = result.into_result().unwrap_err();
///     let name = error.report().field("name").unwrap();
///     assert_eq!(name.messages(), vec!["This value is below the allowed minimum."]);
/// });
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// A single rendered message.
    Message(String),
    /// Ordered entries of one field: messages, or a label followed by the
    /// nested report of a composite rule.
    List(Vec<Report>),
    /// Per-field reports of an object (nested shape or top-level schema).
    Fields(IndexMap<String, Report>),
    /// Per-item reports of an array, keyed by the item's original index.
    Items(BTreeMap<usize, Report>),
}

impl Report {
    /// Builds a message list.
    pub fn from_messages<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Report::List(
            messages
                .into_iter()
                .map(|m| Report::Message(m.into()))
                .collect(),
        )
    }

    /// Returns the messages reported directly at this level.
    ///
    /// For a `List` these are its `Message` entries; nested entries are
    /// skipped. Objects and arrays have no direct messages.
    pub fn messages(&self) -> Vec<&str> {
        match self {
            Report::Message(m) => vec![m.as_str()],
            Report::List(entries) => entries
                .iter()
                .filter_map(|entry| match entry {
                    Report::Message(m) => Some(m.as_str()),
                    _ => None,
                })
                .collect(),
            Report::Fields(_) | Report::Items(_) => Vec::new(),
        }
    }

    /// Returns the first entry when it is a message.
    ///
    /// For a composite rule with its own label this is the label.
    pub fn first_message(&self) -> Option<&str> {
        match self {
            Report::Message(m) => Some(m),
            Report::List(entries) => match entries.first() {
                Some(Report::Message(m)) => Some(m),
                _ => None,
            },
            Report::Fields(_) | Report::Items(_) => None,
        }
    }

    /// Returns the report of a field, if this is an object report.
    pub fn field(&self, name: &str) -> Option<&Report> {
        match self {
            Report::Fields(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Returns the report of an array item, if this is an array report.
    pub fn item(&self, index: usize) -> Option<&Report> {
        match self {
            Report::Items(items) => items.get(&index),
            _ => None,
        }
    }

    /// Returns the entry at `index` of a message list.
    pub fn entry(&self, index: usize) -> Option<&Report> {
        match self {
            Report::List(entries) => entries.get(index),
            _ => None,
        }
    }

    /// Navigates to a nested report.
    ///
    /// Field segments select object fields; index segments select array
    /// items or, on a message list, list entries.
    pub fn at(&self, path: &JsonPath) -> Option<&Report> {
        path.segments().try_fold(self, |node, segment| match segment {
            PathSegment::Field(name) => node.field(name),
            PathSegment::Index(idx) => node.item(*idx).or_else(|| node.entry(*idx)),
        })
    }

    /// Appends a message, wrapping non-list reports into a list first.
    pub(crate) fn with_message(self, message: String) -> Self {
        match self {
            Report::List(mut entries) => {
                entries.push(Report::Message(message));
                Report::List(entries)
            }
            other => Report::List(vec![other, Report::Message(message)]),
        }
    }

    /// Flattens the report into path-tagged messages, in report order.
    pub fn violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        self.collect_violations(&JsonPath::root(), &mut out);
        out
    }

    fn collect_violations(&self, path: &JsonPath, out: &mut Vec<Violation>) {
        match self {
            Report::Message(m) => out.push(Violation::new(path.clone(), m.clone())),
            Report::List(entries) => {
                for entry in entries {
                    entry.collect_violations(path, out);
                }
            }
            Report::Fields(fields) => {
                for (name, report) in fields {
                    report.collect_violations(&path.push_field(name), out);
                }
            }
            Report::Items(items) => {
                for (idx, report) in items {
                    report.collect_violations(&path.push_index(*idx), out);
                }
            }
        }
    }

    /// Counts the messages anywhere in the report.
    pub fn violation_count(&self) -> usize {
        match self {
            Report::Message(_) => 1,
            Report::List(entries) => entries.iter().map(Report::violation_count).sum(),
            Report::Fields(fields) => fields.values().map(Report::violation_count).sum(),
            Report::Items(items) => items.values().map(Report::violation_count).sum(),
        }
    }

    /// Exports the report as JSON.
    ///
    /// Lists become arrays, objects become objects, and item reports become
    /// arrays with `null` at every index that has no error.
    pub fn to_json(&self) -> Value {
        match self {
            Report::Message(m) => Value::String(m.clone()),
            Report::List(entries) => Value::Array(entries.iter().map(Report::to_json).collect()),
            Report::Fields(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(name, report)| (name.clone(), report.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
            Report::Items(items) => {
                let len = items.keys().next_back().map_or(0, |last| last + 1);
                let mut out = vec![Value::Null; len];
                for (idx, report) in items {
                    out[*idx] = report.to_json();
                }
                Value::Array(out)
            }
        }
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for violation in self.violations() {
            writeln!(f, "{}", violation)?;
        }
        Ok(())
    }
}
