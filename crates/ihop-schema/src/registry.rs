//! # Schema Registry Resolver
//!
//! Serves the schema documents a test case declares in its `registry`.
//! The registry is the complete and only source for the URIs it declares:
//! lookups are exact string matches against the keys as supplied, with no
//! normalization, network fetch or filesystem access.
//!
//! A URI absent from the registry is reported as a [`RegistryMiss`]. This
//! layer never substitutes an empty schema; whether a miss is fatal to the
//! case is the backend's policy.

use std::sync::Arc;

use thiserror::Error;

use ihop_core::{Registry, SchemaDocument};

/// A URI was requested that the case's registry does not declare.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no schema registered for '{uri}'")]
pub struct RegistryMiss {
    /// The URI that was requested.
    pub uri: String,
}

/// Read-only view of one case's registry.
///
/// Cloning is cheap: clones share the underlying map, which lives no
/// longer than the `run` command that declared it.
#[derive(Debug, Clone)]
pub struct RegistryResolver {
    schemas: Arc<Registry>,
}

impl RegistryResolver {
    /// Build a resolver over a case's registry.
    pub fn new(registry: Registry) -> Self {
        Self {
            schemas: Arc::new(registry),
        }
    }

    /// Build a resolver if the case declared a registry.
    pub fn for_case(registry: Option<&Registry>) -> Option<Self> {
        registry.map(|r| Self::new(r.clone()))
    }

    /// Look up the schema registered under exactly `uri`.
    pub fn resolve(&self, uri: &str) -> Result<&SchemaDocument, RegistryMiss> {
        self.schemas.get(uri).ok_or_else(|| RegistryMiss {
            uri: uri.to_string(),
        })
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether the registry declares no schemas.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
