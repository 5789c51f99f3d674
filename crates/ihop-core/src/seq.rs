//! # Sequence Identifier
//!
//! The `seq` of a `run` request is an opaque correlation token. The harness
//! keeps the exact JSON text the driver sent and writes it back unchanged:
//! `18446744073709551617` stays an integer wider than `u64`, `1.50` keeps its
//! trailing zero, and arrays or objects keep their member order.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// An opaque correlation identifier echoed verbatim from request to response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seq(Box<RawValue>);

impl Seq {
    /// Wrap a raw JSON text as a sequence identifier.
    ///
    /// Fails if `json` is not a single valid JSON value.
    pub fn from_json(json: impl Into<String>) -> Result<Self, serde_json::Error> {
        RawValue::from_string(json.into()).map(Self)
    }

    /// The JSON text exactly as received.
    pub fn as_json(&self) -> &str {
        self.0.get()
    }
}

impl PartialEq for Seq {
    fn eq(&self, other: &Self) -> bool {
        self.as_json() == other.as_json()
    }
}

impl Eq for Seq {}

impl fmt::Display for Seq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_json())
    }
}
