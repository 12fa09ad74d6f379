//! Flattened view of a validation report.
//!
//! A [`Report`](crate::Report) mirrors the shape of the input. Callers that
//! want a flat list (logging, API responses) flatten it into [`Violations`]:
//! one [`Violation`] per message, each with the path where it was reported.

use std::fmt::{self, Display};

use stillwater::prelude::*;

use crate::path::JsonPath;

/// A single message together with the location it was reported at.
///
/// # Example
///
/// ```rust
/// use rulechain::{JsonPath, Violation};
///
/// let violation = Violation::new(
///     JsonPath::root().push_field("email"),
///     "This value must be a valid email address.",
/// );
/// assert_eq!(
///     violation.to_string(),
///     "email: This value must be a valid email address."
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Where the message was reported.
    pub path: JsonPath,
    /// The rendered message.
    pub message: String,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(path: JsonPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Violation>();
    assert_sync::<Violation>();
};

/// A non-empty collection of violations.
///
/// `Violations` implements `Semigroup`, so lists flattened from different
/// reports can be combined:
///
/// ```rust
/// use rulechain::{JsonPath, Violation, Violations};
/// use stillwater::prelude::*;
///
/// let a = Violations::single(Violation::new(JsonPath::root().push_field("a"), "first"));
/// let b = Violations::single(Violation::new(JsonPath::root().push_field("b"), "second"));
/// assert_eq!(a.combine(b).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Violations(NonEmptyVec<Violation>);

impl Violations {
    /// Creates a collection holding a single violation.
    pub fn single(violation: Violation) -> Self {
        Self(NonEmptyVec::singleton(violation))
    }

    /// Creates a collection from a vec, or `None` if it is empty.
    pub fn from_vec(violations: Vec<Violation>) -> Option<Self> {
        NonEmptyVec::from_vec(violations).map(Self)
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the collection is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the violations.
    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    /// Returns all violations reported at exactly `path`.
    pub fn at_path(&self, path: &JsonPath) -> Vec<&Violation> {
        self.0.iter().filter(|v| &v.path == path).collect()
    }

    /// Returns the first violation.
    pub fn first(&self) -> &Violation {
        self.0.head()
    }

    /// Converts this collection into a `Vec<Violation>`.
    pub fn into_vec(self) -> Vec<Violation> {
        self.0.into_vec()
    }
}

impl Semigroup for Violations {
    fn combine(self, other: Self) -> Self {
        Violations(self.0.combine(other.0))
    }
}

impl Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} violation(s):", self.len())?;
        for (i, violation) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, violation)?;
        }
        Ok(())
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}
