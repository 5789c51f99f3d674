//! # jsonschema Backend
//!
//! Drives the `jsonschema` crate.
//!
//! ## Dialect Negotiation
//!
//! The mapping from dialect URI to [`Draft`] is built once at construction
//! from the dialect catalogue. `select_dialect` is a table lookup against
//! that mapping; draft 3 and unknown URIs are unsupported and clear the
//! selection, after which the crate detects the draft from each schema's
//! `$schema` (defaulting to 2020-12).
//!
//! ## Schema Resolution
//!
//! When a case declares a registry, a [`RegistryRetriever`] is installed so
//! every reference the crate cannot resolve on its own is looked up in that
//! registry and nowhere else. A URI missing from the registry makes
//! compilation fail, which the runner reports as a case-level error. Cases
//! without a registry use the crate's default retriever.
//!
//! ## Error Isolation
//!
//! `Validator::is_valid` is infallible, so [`JsonSchemaBackend::validate`]
//! always reaches a verdict; any failure this backend reports is a
//! compilation failure and therefore case-level.

use std::collections::HashMap;

use jsonschema::{Draft, Retrieve, Uri, Validator};
use serde_json::Value;

use ihop_core::{Dialect, KnownDialect, SchemaDocument};

use crate::backend::{BackendError, BackendInfo, ValidatorBackend};
use crate::registry::RegistryResolver;

/// Retriever that serves references from a single case's registry.
struct RegistryRetriever {
    resolver: RegistryResolver,
}

impl Retrieve for RegistryRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri = uri.as_str();
        match self.resolver.resolve(uri) {
            Ok(schema) => {
                tracing::trace!(uri, "resolved reference from case registry");
                Ok(schema.clone())
            }
            Err(miss) => {
                tracing::debug!(uri, "reference missing from case registry");
                Err(Box::new(miss))
            }
        }
    }
}

/// The draft the `jsonschema` crate uses for a catalogued dialect.
fn draft_for(dialect: KnownDialect) -> Option<Draft> {
    match dialect {
        KnownDialect::Draft202012 => Some(Draft::Draft202012),
        KnownDialect::Draft201909 => Some(Draft::Draft201909),
        KnownDialect::Draft7 => Some(Draft::Draft7),
        KnownDialect::Draft6 => Some(Draft::Draft6),
        KnownDialect::Draft4 => Some(Draft::Draft4),
        KnownDialect::Draft3 => None,
    }
}

/// A [`ValidatorBackend`] backed by the `jsonschema` crate.
#[derive(Debug)]
pub struct JsonSchemaBackend {
    /// Supported dialect URI → draft, fixed at construction.
    drafts: HashMap<&'static str, Draft>,
    /// Draft forced on every compilation, if one was selected.
    draft: Option<Draft>,
}

impl Default for JsonSchemaBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonSchemaBackend {
    /// Create a backend with no dialect selected.
    pub fn new() -> Self {
        let drafts = KnownDialect::ALL
            .into_iter()
            .filter_map(|d| draft_for(d).map(|draft| (d.uri(), draft)))
            .collect();
        Self {
            drafts,
            draft: None,
        }
    }

    /// The draft currently forced on compilation.
    pub fn selected_draft(&self) -> Option<Draft> {
        self.draft
    }
}

impl ValidatorBackend for JsonSchemaBackend {
    type Compiled = Validator;

    fn info(&self) -> BackendInfo {
        BackendInfo {
            name: "jsonschema".to_string(),
            version: env!("IHOP_JSONSCHEMA_VERSION").to_string(),
            homepage: Some("https://docs.rs/jsonschema".to_string()),
            documentation: Some("https://docs.rs/jsonschema".to_string()),
            issues: Some("https://github.com/Stranger6667/jsonschema-rs/issues".to_string()),
            source: Some("https://github.com/Stranger6667/jsonschema-rs".to_string()),
            links: Vec::new(),
        }
    }

    fn supported_dialects(&self) -> Vec<KnownDialect> {
        KnownDialect::ALL
            .into_iter()
            .filter(|d| self.drafts.contains_key(d.uri()))
            .collect()
    }

    fn select_dialect(&mut self, dialect: &Dialect) -> bool {
        self.draft = self.drafts.get(dialect.uri()).copied();
        self.draft.is_some()
    }

    fn compile(
        &self,
        schema: &SchemaDocument,
        registry: Option<&RegistryResolver>,
    ) -> Result<Validator, BackendError> {
        let mut opts = jsonschema::options();
        if let Some(draft) = self.draft {
            opts.with_draft(draft);
        }
        if let Some(resolver) = registry {
            opts.with_retriever(RegistryRetriever {
                resolver: resolver.clone(),
            });
        }
        opts.build(schema).map_err(|e| BackendError::Compile {
            reason: e.to_string(),
            detail: format!("{e:?}"),
        })
    }

    fn validate(&self, compiled: &Validator, instance: &Value) -> Result<bool, BackendError> {
        Ok(compiled.is_valid(instance))
    }
}
