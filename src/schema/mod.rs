//! Schemas, chains and rules.
//!
//! A [`Schema`] maps field names to [`Chain`]s, or wraps a single chain to
//! validate a bare value. Schemas are immutable and cheap to clone; one
//! schema can serve any number of concurrent validation calls.
//!
//! # Example
//!
//! ```rust
//! use rulechain::{Chain, Schema};
//! use serde_json::json;
//!
//! futures::executor::block_on(async {
//!     let schema = Schema::object([
//!         ("name", Chain::new().required().string().min(2)),
//!         ("email", Chain::new().nullable().email()),
//!         ("tags", Chain::new().array().of(Chain::new().string())),
//!     ])
//!     .unwrap();
//!
//!     let data = json!({"name": "Al", "email": "", "tags": ["a", 1, "c"]});
//!     let err = schema.validate(&data).await.unwrap().into_result().unwrap_err();
//!
//!     let tags = err.report().field("tags").unwrap();
//!     assert!(tags.item(0).is_none());
//!     assert_eq!(tags.item(1).unwrap().messages(), vec!["This value must be a string."]);
//!     assert!(tags.item(2).is_none());
//! });
//! ```

mod chain;
pub(crate) mod rule;
pub(crate) mod validator;

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use stillwater::Validation;
use tracing::debug;

use crate::error::{ExecutionError, SchemaError, ValidationError};
use crate::validation::{ValidateOptions, ValidationContext};

pub use chain::Chain;
pub use rule::{CastHint, Outcome, Rule, RuleCall};

#[derive(Debug)]
struct SchemaInner {
    fields: IndexMap<String, Chain>,
    raw: bool,
}

/// A ready-to-validate description of data.
///
/// Construction checks every chain, so a schema that exists is well formed.
#[derive(Debug, Clone)]
pub struct Schema {
    inner: Arc<SchemaInner>,
}

impl Schema {
    /// Wraps a single chain to validate a bare value.
    ///
    /// The value is validated as if it were `{"value": <data>}`, so a
    /// reference to `value` inside the chain sees the value itself. A failure
    /// reports the chain's messages directly instead of a field map.
    ///
    /// ```rust
    /// use rulechain::{Chain, Schema};
    /// use serde_json::json;
    ///
    /// futures::executor::block_on(async {
    ///     let schema = Schema::new(Chain::new().string().min(5)).unwrap();
    ///     let err = schema.validate(&json!("abc")).await.unwrap().into_result().unwrap_err();
    ///     assert_eq!(err.report().messages(), vec!["This value is below the allowed minimum."]);
    /// });
    /// ```
    ///
    /// # Errors
    ///
    /// The first defect recorded in the chain.
    pub fn new(chain: Chain) -> Result<Self, SchemaError> {
        chain.check()?;
        let mut fields = IndexMap::with_capacity(1);
        fields.insert(validator::RAW_KEY.to_string(), chain);
        Ok(Self {
            inner: Arc::new(SchemaInner { fields, raw: true }),
        })
    }

    /// Builds an object schema. Fields are validated and reported in the
    /// given order.
    ///
    /// # Errors
    ///
    /// The first defect recorded in any of the chains.
    pub fn object<I, K>(fields: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (K, Chain)>,
        K: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|(name, chain)| chain.check().map(|()| (name.into(), chain)))
            .collect::<Result<IndexMap<String, Chain>, SchemaError>>()?;
        Ok(Self {
            inner: Arc::new(SchemaInner { fields, raw: false }),
        })
    }

    /// True if this schema wraps a single chain.
    pub fn is_raw(&self) -> bool {
        self.inner.raw
    }

    /// Field names and chains, in validation order.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Chain)> {
        self.inner.fields.iter()
    }

    /// The chain of the named field.
    pub fn field(&self, name: &str) -> Option<&Chain> {
        self.inner.fields.get(name)
    }

    /// Number of fields; one for a raw schema.
    pub fn len(&self) -> usize {
        self.inner.fields.len()
    }

    /// True for an object schema without fields.
    pub fn is_empty(&self) -> bool {
        self.inner.fields.is_empty()
    }

    /// Validates `data` with default options.
    ///
    /// # Errors
    ///
    /// An [`ExecutionError`] when a rule function, transform or message
    /// function fails, or a parameter resolves to something its rule cannot
    /// use. Data that simply does not match yields
    /// `Ok(Validation::Failure(..))`.
    pub async fn validate(
        &self,
        data: &Value,
    ) -> Result<Validation<(), ValidationError>, ExecutionError> {
        self.validate_with(data, ValidateOptions::default()).await
    }

    /// Validates `data` with explicit options.
    ///
    /// # Errors
    ///
    /// See [`validate`](Schema::validate).
    pub async fn validate_with(
        &self,
        data: &Value,
        options: ValidateOptions,
    ) -> Result<Validation<(), ValidationError>, ExecutionError> {
        self.validate_scoped(data, options, Vec::new(), None).await
    }

    /// The full entry point.
    ///
    /// `args` are appended to the parameters of every rule, the way a
    /// registered rule hands its call-site parameters to its chain. `root`
    /// replaces the data references resolve against; by default it is
    /// `data` itself (wrapped, for a raw schema).
    ///
    /// # Errors
    ///
    /// See [`validate`](Schema::validate).
    pub async fn validate_scoped(
        &self,
        data: &Value,
        options: ValidateOptions,
        args: Vec<Value>,
        root: Option<Arc<Value>>,
    ) -> Result<Validation<(), ValidationError>, ExecutionError> {
        let root = match root {
            Some(root) => root,
            None => Arc::new(validator::wrap(self, data).into_owned()),
        };
        let ctx = ValidationContext::new(root, args, options);

        debug!(
            fields = self.len(),
            raw = self.is_raw(),
            abort_early = options.is_abort_early(),
            "validation started"
        );
        let outcome = validator::run(self, data, ctx).await;

        match outcome {
            Ok(None) => {
                debug!("validation passed");
                Ok(Validation::Success(()))
            }
            Ok(Some(report)) => {
                debug!(violations = report.violation_count(), "validation failed");
                Ok(Validation::Failure(ValidationError::new(report)))
            }
            Err(err) => {
                debug!(error = %err, "validation aborted");
                Err(err)
            }
        }
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Schema>();
    assert_sync::<Schema>();
    assert_send::<Chain>();
    assert_sync::<Chain>();
};
