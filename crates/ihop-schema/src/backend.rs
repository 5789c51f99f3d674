//! # Validator Backend Trait
//!
//! The capability set every validation engine exposes to the harness.
//! Implementations are interchangeable behind the dispatcher; each wraps
//! exactly one external library.
//!
//! A backend owns its dialect selection. The session records what the
//! driver asked for; the backend records what it can honour.

use serde_json::Value;
use thiserror::Error;

use ihop_core::{Dialect, KnownDialect, Link, SchemaDocument};

use crate::registry::RegistryResolver;

/// Failure inside a validator backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The schema could not be compiled, including unresolvable references.
    #[error("cannot compile schema: {reason}")]
    Compile {
        /// Library-provided explanation.
        reason: String,
        /// Library error rendered with `{:?}`.
        detail: String,
    },

    /// The validator failed on one instance without reaching a verdict.
    #[error("cannot evaluate instance: {reason}")]
    Evaluate {
        /// Library-provided explanation.
        reason: String,
        /// Library error rendered with `{:?}`.
        detail: String,
    },
}

impl BackendError {
    /// Diagnostic detail suitable for a traceback.
    pub fn detail(&self) -> &str {
        match self {
            Self::Compile { detail, .. } | Self::Evaluate { detail, .. } => detail,
        }
    }
}

/// Static identity of the library behind a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendInfo {
    /// Library name.
    pub name: String,
    /// Library version.
    pub version: String,
    /// Project homepage.
    pub homepage: Option<String>,
    /// API documentation.
    pub documentation: Option<String>,
    /// Issue tracker.
    pub issues: Option<String>,
    /// Source repository.
    pub source: Option<String>,
    /// Further links.
    pub links: Vec<Link>,
}

/// Abstract interface for a JSON Schema validation engine.
pub trait ValidatorBackend {
    /// A schema prepared for repeated validation.
    type Compiled;

    /// Identity of the wrapped library.
    fn info(&self) -> BackendInfo;

    /// Dialects this backend can evaluate, newest first.
    fn supported_dialects(&self) -> Vec<KnownDialect>;

    /// Select the dialect for subsequent compilations.
    ///
    /// Returns `false` if the dialect is unsupported; the backend then falls
    /// back to detecting the dialect from each schema.
    fn select_dialect(&mut self, dialect: &Dialect) -> bool;

    /// Compile `schema`, resolving unknown references through `registry`
    /// when one is given.
    fn compile(
        &self,
        schema: &SchemaDocument,
        registry: Option<&RegistryResolver>,
    ) -> Result<Self::Compiled, BackendError>;

    /// Validate one instance against a compiled schema.
    fn validate(&self, compiled: &Self::Compiled, instance: &Value) -> Result<bool, BackendError>;
}
