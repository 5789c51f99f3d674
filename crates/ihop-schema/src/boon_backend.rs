//! # boon Backend
//!
//! Drives the `boon` crate.
//!
//! `boon` compiles with a fresh [`Compiler`] per case: the case schema is
//! added as an in-memory resource under a fixed base URL and compiled into a
//! [`Schemas`] arena that lives as long as the compiled case.
//!
//! ## Dialect Negotiation
//!
//! As with the jsonschema backend, the URI → [`Draft`] table is built once at
//! construction. A selected draft becomes the compiler's default draft, so it
//! governs schemas without `$schema`; a schema that declares `$schema` keeps
//! its own dialect.
//!
//! ## Schema Resolution
//!
//! When a case declares a registry, a [`RegistryLoader`] replaces the
//! compiler's URL loader. Every URL `boon` cannot resolve from its bundled
//! meta-schemas is looked up in the registry and nowhere else; a miss fails
//! compilation.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use boon::{Compiler, Draft, SchemaIndex, Schemas, UrlLoader};
use serde_json::Value;

use ihop_core::{Dialect, KnownDialect, SchemaDocument};

use crate::backend::{BackendError, BackendInfo, ValidatorBackend};
use crate::registry::RegistryResolver;

/// Location the case schema is registered under.
const CASE_SCHEMA_URL: &str = "http://ihop.invalid/schema.json";

struct RegistryLoader {
    resolver: RegistryResolver,
}

impl UrlLoader for RegistryLoader {
    fn load(&self, url: &str) -> Result<Value, Box<dyn Error>> {
        match self.resolver.resolve(url) {
            Ok(schema) => Ok(schema.clone()),
            Err(miss) => {
                tracing::debug!(url, "reference missing from case registry");
                Err(Box::new(miss))
            }
        }
    }
}

fn draft_for(dialect: KnownDialect) -> Option<Draft> {
    match dialect {
        KnownDialect::Draft202012 => Some(Draft::V2020_12),
        KnownDialect::Draft201909 => Some(Draft::V2019_09),
        KnownDialect::Draft7 => Some(Draft::V7),
        KnownDialect::Draft6 => Some(Draft::V6),
        KnownDialect::Draft4 => Some(Draft::V4),
        KnownDialect::Draft3 => None,
    }
}

/// A compiled case: the schema arena and the root schema's index in it.
pub struct BoonCompiled {
    schemas: Schemas,
    index: SchemaIndex,
}

impl fmt::Debug for BoonCompiled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoonCompiled").finish_non_exhaustive()
    }
}

/// A [`ValidatorBackend`] backed by the `boon` crate.
pub struct BoonBackend {
    drafts: HashMap<&'static str, Draft>,
    draft: Option<Draft>,
}

impl fmt::Debug for BoonBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoonBackend")
            .field("dialects", &self.drafts.len())
            .field("draft_selected", &self.draft.is_some())
            .finish()
    }
}

impl Default for BoonBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl BoonBackend {
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

    /// Whether a dialect is currently forced as the default draft.
    pub fn has_selected_draft(&self) -> bool {
        self.draft.is_some()
    }
}

impl ValidatorBackend for BoonBackend {
    type Compiled = BoonCompiled;

    fn info(&self) -> BackendInfo {
        BackendInfo {
            name: "boon".to_string(),
            version: env!("IHOP_BOON_VERSION").to_string(),
            homepage: Some("https://docs.rs/boon/latest/boon/".to_string()),
            documentation: Some("https://docs.rs/boon/latest/boon/".to_string()),
            issues: Some("https://github.com/santhosh-tekuri/boon/issues".to_string()),
            source: Some("https://github.com/santhosh-tekuri/boon".to_string()),
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
    ) -> Result<BoonCompiled, BackendError> {
        let compile_error = |e: boon::CompileError| BackendError::Compile {
            reason: e.to_string(),
            detail: format!("{e:#}"),
        };

        let mut compiler = Compiler::new();
        if let Some(draft) = self.draft {
            compiler.set_default_draft(draft);
        }
        if let Some(resolver) = registry {
            compiler.use_loader(Box::new(RegistryLoader {
                resolver: resolver.clone(),
            }));
        }
        compiler
            .add_resource(CASE_SCHEMA_URL, schema.clone())
            .map_err(compile_error)?;

        let mut schemas = Schemas::new();
        let index = compiler
            .compile(CASE_SCHEMA_URL, &mut schemas)
            .map_err(compile_error)?;
        Ok(BoonCompiled { schemas, index })
    }

    fn validate(&self, compiled: &BoonCompiled, instance: &Value) -> Result<bool, BackendError> {
        Ok(compiled.schemas.validate(instance, compiled.index).is_ok())
    }
}
