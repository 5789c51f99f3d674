//! # Test Case Model
//!
//! A test case is one schema plus an ordered list of instances. Cases are
//! immutable once decoded and live only for the `run` command that carried
//! them, together with their optional registry of referenced schemas.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON Schema document: an object or a boolean. Opaque to the protocol.
pub type SchemaDocument = Value;

/// Schemas the case references by absolute URI, keyed exactly as supplied.
pub type Registry = BTreeMap<String, SchemaDocument>;

/// One schema and the instances to evaluate against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Human-readable description; also the key of the skip policy.
    pub description: String,
    /// Optional note from the suite author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// The schema under test.
    pub schema: SchemaDocument,
    /// Extra schema documents the schema may `$ref` by URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<Registry>,
    /// Instances to validate, in order.
    pub tests: Vec<Test>,
}

/// One instance and the suite author's expectation for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Test {
    /// Human-readable description.
    pub description: String,
    /// Optional note from the suite author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// The instance to validate.
    pub instance: Value,
    /// Expected validity. Never echoed: the driver compares, not the harness.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
}
