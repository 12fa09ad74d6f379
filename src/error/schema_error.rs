//! Schema-definition errors.

/// A programmer mistake in how a schema was put together.
///
/// Raised synchronously while chains and schemas are built, or while a
/// validation call resolves a parameter that can never be checked (a `min`
/// limit that is not a number, a `one_of` list that is not a list). It never
/// appears inside a [`Report`](crate::Report).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// `required()` and `nullable()` were both set on one chain.
    #[error("a field cannot be nullable and required at the same time")]
    RequiredAndNullable,

    /// An ordinary rule was attached to a chain that carries a shape.
    #[error("rules cannot be applied to shaped objects")]
    RulesOnShape,

    /// `error()` was called before any rule was added.
    #[error(".error() must follow a rule")]
    ErrorWithoutRule,

    /// A `matches` pattern failed to compile.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The source pattern.
        pattern: String,
        /// Compiler diagnostic.
        reason: String,
    },

    /// `one_of` was given no allowed values.
    #[error("this rule will always fail: one_of needs at least one allowed value")]
    EmptyOneOf,

    /// A parameter that must be a list resolved to something else.
    #[error("a list was expected, but {0} was received instead")]
    ExpectedList(String),

    /// A parameter that must be a number resolved to something else.
    #[error("a number was expected, but {0} was received instead")]
    ExpectedNumber(String),

    /// A reference path could not be parsed.
    #[error("invalid reference path '{0}'")]
    InvalidReference(String),

    /// A rule name is neither built in nor registered.
    #[error("unknown rule '{0}'")]
    UnknownRule(String),

    /// `register` targeted a built-in rule name.
    #[error("'{0}' is a native rule and cannot be registered; use override_rule to replace it")]
    NativeOverride(String),
}
