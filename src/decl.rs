//! Declarative field descriptions.
//!
//! Binding layers (forms, config files, CLI flags) usually know a field as a
//! handful of attributes: a name, a type name, a reference to another field,
//! and `required`/`nullable` flags. [`FieldDecl`] turns those attributes into
//! a chain, always in the same order:
//!
//! 1. `required`
//! 2. `nullable`
//! 3. the typed rule, with the reference as its parameter when one is given
//! 4. `equal(reference)` when there is a reference but no type
//! 5. `noop` when nothing was declared at all
//!
//! Coercing raw text before the typed rule runs is left to the binding
//! layer: it reads [`FieldDecl::cast_hint`] and inserts a transform with
//! [`Chain::splice_before_last`].

use crate::error::SchemaError;
use crate::reference::Reference;
use crate::registry::RuleRegistry;
use crate::schema::{CastHint, Chain, Schema};

/// Attributes of one field.
///
/// # Example
///
/// ```rust
/// use rulechain::{FieldDecl, RuleRegistry};
///
/// let registry = RuleRegistry::new();
/// let chain = FieldDecl::new("confirm")
///     .required(true)
///     .reference("password")
///     .build(&registry)
///     .unwrap();
///
/// assert!(chain.is_required());
/// assert_eq!(chain.rules()[0].name(), "equal");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    name: String,
    data_type: Option<String>,
    reference: Option<String>,
    required: bool,
    nullable: bool,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: None,
            reference: None,
            required: false,
            nullable: false,
        }
    }

    /// Name of a built-in or registered rule.
    pub fn data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    /// Dotted path of another field.
    pub fn reference(mut self, path: impl Into<String>) -> Self {
        self.reference = Some(path.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds the chain.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::UnknownRule`] for a type name that is neither built
    ///   in nor registered
    /// - [`SchemaError::InvalidReference`] for a malformed reference path
    /// - [`SchemaError::RequiredAndNullable`] when both flags are set
    pub fn build(&self, registry: &RuleRegistry) -> Result<Chain, SchemaError> {
        let reference = self.reference.as_deref().map(Reference::parse).transpose()?;

        let mut chain = Chain::new();
        if self.required {
            chain = chain.required();
        }
        if self.nullable {
            chain = chain.nullable();
        }

        match (&self.data_type, reference) {
            (Some(data_type), reference) => {
                if !registry.is_known(data_type) {
                    return Err(SchemaError::UnknownRule(data_type.clone()));
                }
                chain = chain.named(registry, data_type, reference)?;
            }
            (None, Some(reference)) => chain = chain.equal(reference),
            (None, None) if !self.required && !self.nullable => chain = chain.noop(),
            (None, None) => {}
        }

        chain.check()?;
        Ok(chain)
    }

    /// Cast hint of the declared type, if any.
    pub fn cast_hint(&self, registry: &RuleRegistry) -> Option<CastHint> {
        self.data_type
            .as_deref()
            .and_then(|data_type| registry.cast_hint(data_type))
    }
}

/// Builds an object schema from field declarations, in order.
///
/// # Errors
///
/// The first error of [`FieldDecl::build`].
pub fn build_schema<I>(decls: I, registry: &RuleRegistry) -> Result<Schema, SchemaError>
where
    I: IntoIterator<Item = FieldDecl>,
{
    let fields = decls
        .into_iter()
        .map(|decl| decl.build(registry).map(|chain| (decl.name, chain)))
        .collect::<Result<Vec<_>, _>>()?;
    Schema::object(fields)
}
