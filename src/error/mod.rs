//! Error types.
//!
//! - [`ValidationError`]: the data did not pass; carries the report.
//! - [`SchemaError`]: the schema itself is malformed.
//! - [`RuleError`] / [`ExecutionError`]: consumer code inside a rule failed,
//!   aborting the validation call.
//! - [`Violation`] / [`Violations`]: a flattened view of a report.

mod fault;
mod schema_error;
mod validation_error;
mod violation;

pub use fault::{ExecutionError, RuleError};
pub use schema_error::SchemaError;
pub use validation_error::ValidationError;
pub use violation::{Violation, Violations};
