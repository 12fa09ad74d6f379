//! Named, reusable rules.
//!
//! A [`RuleRegistry`] maps names to rules built from a chain (or a bare
//! predicate). A registered rule runs its chain as a nested raw schema
//! against the field value and can then be added to any chain with
//! [`Chain::named`]:
//!
//! ```rust
//! use rulechain::{Chain, RegisterOptions, RuleRegistry, Schema};
//! use serde_json::json;
//!
//! let registry = RuleRegistry::new();
//! registry
//!     .register_with(
//!         "username",
//!         Chain::new().string().min(3).max(16),
//!         RegisterOptions::new().message("{name} is not a valid username"),
//!     )
//!     .unwrap();
//!
//! let schema = Schema::object([(
//!     "login",
//!     Chain::new().required().named(&registry, "username", Vec::<i64>::new()).unwrap(),
//! )])
//! .unwrap();
//!
//! futures::executor::block_on(async {
//!     let err = schema
//!         .validate(&json!({"login": "ab"}))
//!         .await
//!         .unwrap()
//!         .into_result()
//!         .unwrap_err();
//!     let login = err.report().field("login").unwrap();
//!     assert_eq!(login.first_message(), Some("login is not a valid username"));
//! });
//! ```

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{RuleError, SchemaError};
use crate::message::Message;
use crate::schema::rule::RuleKind;
use crate::schema::{CastHint, Chain, Outcome, Rule, RuleCall, Schema};

/// Built-in type rules. Registering over them requires
/// [`RuleRegistry::override_rule`].
pub const NATIVE_RULES: [&str; 6] = ["string", "number", "integer", "object", "array", "email"];

/// Type alias for the rule storage map.
type RuleMap = Arc<RwLock<HashMap<String, Rule>>>;

/// Options for registering a rule.
#[derive(Debug, Clone, Default)]
pub struct RegisterOptions {
    cast: Option<CastHint>,
    message: Option<Message>,
}

impl RegisterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the cast hint inferred from the chain.
    pub fn cast(mut self, cast: CastHint) -> Self {
        self.cast = Some(cast);
        self
    }

    /// Message reported in front of the inner failures. Without one, the
    /// inner report surfaces on its own.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// A thread-safe registry of named rules.
///
/// Cloning a registry shares the underlying map. Chains keep the rule they
/// were built with, so replacing a name later never changes existing chains.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    rules: RuleMap,
}

impl RuleRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `chain` under `name` without a message of its own.
    ///
    /// # Errors
    ///
    /// [`SchemaError::NativeOverride`] for a built-in name, or the first
    /// defect of the chain.
    pub fn register(&self, name: impl Into<String>, chain: Chain) -> Result<(), SchemaError> {
        self.register_with(name, chain, RegisterOptions::default())
    }

    /// Registers `chain` under `name`.
    ///
    /// # Errors
    ///
    /// See [`register`](RuleRegistry::register).
    pub fn register_with(
        &self,
        name: impl Into<String>,
        chain: Chain,
        options: RegisterOptions,
    ) -> Result<(), SchemaError> {
        let name = name.into();
        reject_native(&name)?;
        self.install(name, chain, options)
    }

    /// Registers a bare predicate, wrapped in a single-rule chain.
    ///
    /// ```rust
    /// use rulechain::{Chain, RegisterOptions, RuleRegistry};
    ///
    /// let registry = RuleRegistry::new();
    /// registry
    ///     .register_fn(
    ///         "even",
    ///         |call| Ok(call.value().as_i64().is_some_and(|n| n % 2 == 0)),
    ///         RegisterOptions::new().message("{value} is odd"),
    ///     )
    ///     .unwrap();
    ///
    /// assert!(registry.is_known("even"));
    /// assert_eq!(registry.cast_hint("even"), None);
    /// ```
    ///
    /// # Errors
    ///
    /// [`SchemaError::NativeOverride`] for a built-in name.
    pub fn register_fn<F, O>(
        &self,
        name: impl Into<String>,
        f: F,
        options: RegisterOptions,
    ) -> Result<(), SchemaError>
    where
        F: Fn(&RuleCall<'_>) -> Result<O, RuleError> + Send + Sync + 'static,
        O: 'static,
        Outcome: From<O>,
    {
        self.register_with(name, Chain::new().custom(f), options)
    }

    /// Registers `chain` under `name`, including built-in names.
    ///
    /// # Errors
    ///
    /// The first defect of the chain.
    pub fn override_rule(
        &self,
        name: impl Into<String>,
        chain: Chain,
        options: RegisterOptions,
    ) -> Result<(), SchemaError> {
        self.install(name.into(), chain, options)
    }

    /// Registers several chains at once, sharing `options`.
    ///
    /// Every entry is checked before anything is installed; one bad entry
    /// leaves the registry untouched.
    ///
    /// # Errors
    ///
    /// The first failing check, in iteration order.
    pub fn extend<I, K>(&self, rules: I, options: RegisterOptions) -> Result<(), SchemaError>
    where
        I: IntoIterator<Item = (K, Chain)>,
        K: Into<String>,
    {
        let rules: Vec<(String, Chain)> = rules
            .into_iter()
            .map(|(name, chain)| (name.into(), chain))
            .collect();

        for (name, chain) in &rules {
            reject_native(name)?;
            chain.check()?;
        }

        for (name, chain) in rules {
            self.install(name, chain, options.clone())?;
        }
        Ok(())
    }

    fn install(&self, name: String, chain: Chain, options: RegisterOptions) -> Result<(), SchemaError> {
        let cast = options.cast.or_else(|| chain.cast_hint());
        let schema = Schema::new(chain)?;

        let mut rule = Rule::new(
            name.as_str(),
            RuleKind::Composite(schema),
            options.message.unwrap_or_else(Message::none),
        );
        rule.cast = cast;

        let previous = self.rules.write().insert(name.clone(), rule);
        if previous.is_some() {
            debug!(rule = %name, cast = ?cast, "registered rule replaced");
        } else {
            debug!(rule = %name, cast = ?cast, "rule registered");
        }
        Ok(())
    }

    /// Returns the rule registered under `name`.
    pub fn rule(&self, name: &str) -> Option<Rule> {
        self.rules.read().get(name).cloned()
    }

    /// True for built-in type rules and registered names.
    pub fn is_known(&self, name: &str) -> bool {
        NATIVE_RULES.contains(&name) || self.rules.read().contains_key(name)
    }

    /// The cast hint of a built-in or registered rule.
    ///
    /// `None` for unknown names and for rules that do not expect a
    /// particular type.
    pub fn cast_hint(&self, name: &str) -> Option<CastHint> {
        if let Some(rule) = self.rules.read().get(name) {
            return rule.cast;
        }
        match name {
            "string" | "email" => Some(CastHint::String),
            "number" | "integer" => Some(CastHint::Number),
            _ => None,
        }
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rules.read().keys().cloned().collect();
        names.sort();
        names
    }
}

fn reject_native(name: &str) -> Result<(), SchemaError> {
    if NATIVE_RULES.contains(&name) {
        return Err(SchemaError::NativeOverride(name.to_string()));
    }
    Ok(())
}
