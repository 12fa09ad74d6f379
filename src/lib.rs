//! # rulechain
//!
//! Runtime schema validation built from immutable rule chains.
//!
//! ## Overview
//!
//! A [`Chain`] is an ordered list of rules assembled with a fluent builder.
//! Every builder call returns a new chain and leaves its receiver alone, so
//! chains can be shared freely. A [`Schema`] maps field names to chains (or
//! wraps a single chain) and validates any [`serde_json::Value`] against them.
//!
//! Validation is asynchronous because rules may be. It never stops at the
//! first failing field: the result is a [`Report`] that mirrors the shape of
//! the data, with messages under field names and array failures under their
//! original index.
//!
//! ## Core Types
//!
//! - [`Chain`] / [`Rule`]: rule composition
//! - [`Reference`] / [`Param`]: rule parameters read from the data at
//!   validation time
//! - [`Schema`]: field-by-field validation
//! - [`Report`] / [`ValidationError`]: the structured failure
//! - [`RuleRegistry`]: named, reusable rules with cast hints
//! - [`FieldDecl`]: chains built from declarative attributes
//!
//! ## Example
//!
//! ```rust
//! use rulechain::{reference, Chain, Schema};
//! use serde_json::json;
//!
//! futures::executor::block_on(async {
//!     let schema = Schema::object([
//!         ("password", Chain::new().required().string().min(8)),
//!         (
//!             "confirm",
//!             Chain::new()
//!                 .required()
//!                 .equal(reference("password").unwrap())
//!                 .error("{name} does not match"),
//!         ),
//!     ])
//!     .unwrap();
//!
//!     let result = schema
//!         .validate(&json!({"password": "correct horse", "confirm": "correct horse"}))
//!         .await
//!         .unwrap();
//!     assert!(result.is_success());
//!
//!     let result = schema
//!         .validate(&json!({"password": "short", "confirm": "other"}))
//!         .await
//!         .unwrap();
//!     let report = result.into_result().unwrap_err().into_report();
//!     assert_eq!(
//!         report.to_json(),
//!         json!({
//!             "password": ["This value is below the allowed minimum."],
//!             "confirm": ["confirm does not match"]
//!         })
//!     );
//! });
//! ```

pub mod decl;
pub mod error;
mod executor;
pub mod message;
pub mod path;
pub mod predicate;
pub mod reference;
pub mod registry;
pub mod report;
pub mod schema;
pub mod validation;

pub use decl::{build_schema, FieldDecl};
pub use error::{ExecutionError, RuleError, SchemaError, ValidationError, Violation, Violations};
pub use message::{Message, MessageContext};
pub use path::{JsonPath, PathSegment};
pub use reference::{reference, Param, Reference};
pub use registry::{RegisterOptions, RuleRegistry, NATIVE_RULES};
pub use report::Report;
pub use schema::{CastHint, Chain, Outcome, Rule, RuleCall, Schema};
pub use validation::ValidateOptions;

/// Result type of [`Schema::validate`]: a fault, or the data outcome.
pub type ValidationResult = Result<stillwater::Validation<(), ValidationError>, ExecutionError>;
