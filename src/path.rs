//! Paths into nested JSON data.
//!
//! [`JsonPath`] is used in two places: references parse a dotted path such as
//! `settings.advanced.factor` and walk it against the root data at execution
//! time, and reports are navigated and flattened with the same type.

use std::fmt::{self, Display};

use serde_json::Value;

use crate::error::SchemaError;

/// A segment of a JSON path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// An object key (e.g. `user`, `email`).
    Field(String),
    /// An array index (e.g. `[0]`). Also matches the object key `"0"`.
    Index(usize),
}

impl PathSegment {
    /// Creates a new field segment.
    pub fn field(name: impl Into<String>) -> Self {
        PathSegment::Field(name.into())
    }

    /// Creates a new index segment.
    pub fn index(idx: usize) -> Self {
        PathSegment::Index(idx)
    }

    /// Looks this segment up in `node`.
    ///
    /// Returns `None` when the node is not indexable or the key is absent.
    pub fn lookup<'a>(&self, node: &'a Value) -> Option<&'a Value> {
        match (self, node) {
            (PathSegment::Field(name), Value::Object(map)) => map.get(name),
            (PathSegment::Index(idx), Value::Array(items)) => items.get(*idx),
            (PathSegment::Index(idx), Value::Object(map)) => map.get(&idx.to_string()),
            _ => None,
        }
    }
}

/// A path to a value in a nested JSON-like structure.
///
/// # Example
///
/// ```rust
/// use rulechain::JsonPath;
/// use serde_json::json;
///
/// let path = JsonPath::parse("company.departments.0.manager").unwrap();
/// assert_eq!(path.to_string(), "company.departments[0].manager");
///
/// let data = json!({"company": {"departments": [{"manager": "Alice"}]}});
/// assert_eq!(path.resolve(&data), Some(&json!("Alice")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct JsonPath {
    segments: Vec<PathSegment>,
}

impl JsonPath {
    /// Creates an empty path representing the root value.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a dotted path. Purely numeric segments become index segments.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidReference`] when the path is empty or
    /// contains an empty segment (`"a..b"`).
    pub fn parse(dotted: &str) -> Result<Self, SchemaError> {
        let mut segments = Vec::new();
        for part in dotted.split('.') {
            if part.is_empty() {
                return Err(SchemaError::InvalidReference(dotted.to_string()));
            }
            let segment = match part.parse::<usize>() {
                Ok(idx) if is_canonical_index(part) => PathSegment::Index(idx),
                _ => PathSegment::Field(part.to_string()),
            };
            segments.push(segment);
        }
        Ok(Self { segments })
    }

    /// Returns a new path with a field segment appended.
    ///
    /// This method does not modify the original path; it returns a new one.
    pub fn push_field(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Field(name.into()));
        Self { segments }
    }

    /// Returns a new path with an index segment appended.
    ///
    /// This method does not modify the original path; it returns a new one.
    pub fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    /// Walks the path from `root`.
    ///
    /// Never panics: a missing key, an out-of-range index or a scalar in the
    /// middle of the path all yield `None`.
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(root, |node, segment| segment.lookup(node))
    }

    /// Returns true if this is the root path (no segments).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the number of segments in this path.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if this path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns an iterator over the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// Returns the last segment, or None if this is root.
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }
}

impl Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

/// `"0"`, `"17"`; not `"+1"` or `"007"`, which stay object keys.
fn is_canonical_index(part: &str) -> bool {
    part.bytes().all(|b| b.is_ascii_digit()) && (part == "0" || !part.starts_with('0'))
}
