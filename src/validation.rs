//! Per-call validation settings.
//!
//! [`ValidateOptions`] is what callers configure. [`ValidationContext`] is
//! what the validator threads through one call: the root data every
//! reference resolves against, leftover arguments of an enclosing registered
//! rule, and the nesting depth. A fresh context is built for every call, so
//! concurrent calls on the same schema never share any of it.

use std::sync::Arc;

use serde_json::Value;

/// Options for a validation call.
///
/// # Example
///
/// ```rust
/// use rulechain::ValidateOptions;
///
/// let options = ValidateOptions::new().abort_early(true);
/// assert!(options.is_abort_early());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    abort_early: bool,
}

impl ValidateOptions {
    /// Default options: every rule of every field runs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops each field's chain at its first failing rule, and each array at
    /// its first failing item.
    pub fn abort_early(mut self, abort_early: bool) -> Self {
        self.abort_early = abort_early;
        self
    }

    pub fn is_abort_early(&self) -> bool {
        self.abort_early
    }
}

/// State shared by every field of one validation call.
#[derive(Debug, Clone)]
pub(crate) struct ValidationContext {
    root: Arc<Value>,
    args: Arc<[Value]>,
    options: ValidateOptions,
    depth: usize,
}

impl ValidationContext {
    pub(crate) fn new(root: Arc<Value>, args: Vec<Value>, options: ValidateOptions) -> Self {
        Self {
            root,
            args: args.into(),
            options,
            depth: 0,
        }
    }

    /// Context for a nested shape or array item: same root, no arguments.
    pub(crate) fn nested(&self) -> Self {
        Self {
            root: Arc::clone(&self.root),
            args: Arc::from(Vec::new()),
            options: self.options,
            depth: self.depth + 1,
        }
    }

    /// Context for the chain of a registered rule, which receives the
    /// resolved parameters of the call site as its arguments.
    pub(crate) fn composite(&self, args: Vec<Value>) -> Self {
        Self {
            root: Arc::clone(&self.root),
            args: args.into(),
            options: self.options,
            depth: self.depth + 1,
        }
    }

    pub(crate) fn root(&self) -> &Arc<Value> {
        &self.root
    }

    pub(crate) fn args(&self) -> &[Value] {
        &self.args
    }

    pub(crate) fn abort_early(&self) -> bool {
        self.options.abort_early
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }
}
