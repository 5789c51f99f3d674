//! # Dialect Catalogue
//!
//! A dialect names the JSON Schema specification version that governs
//! keyword semantics. Drivers identify dialects by meta-schema URI; the skip
//! policy file additionally accepts the short names used in test-suite
//! reports (`draft2020-12`, `draft7`, ...).

use std::fmt;

use serde::{Deserialize, Serialize};

/// A dialect URI exactly as the driver supplied it.
///
/// The URI need not be known to this harness: an unknown dialect is a
/// configuration condition answered with `ok: false`, not a decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dialect(String);

impl Dialect {
    /// Wrap a dialect URI.
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// The URI as received.
    pub fn uri(&self) -> &str {
        &self.0
    }

    /// The catalogue entry for this URI, if it names a known specification.
    pub fn known(&self) -> Option<KnownDialect> {
        KnownDialect::from_uri(&self.0)
    }
}

impl From<KnownDialect> for Dialect {
    fn from(known: KnownDialect) -> Self {
        Self(known.uri().to_string())
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// JSON Schema specification versions, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KnownDialect {
    /// Draft 2020-12.
    Draft202012,
    /// Draft 2019-09.
    Draft201909,
    /// Draft 7.
    Draft7,
    /// Draft 6.
    Draft6,
    /// Draft 4.
    Draft4,
    /// Draft 3.
    Draft3,
}

impl KnownDialect {
    /// Every catalogued dialect, newest first.
    pub const ALL: [KnownDialect; 6] = [
        Self::Draft202012,
        Self::Draft201909,
        Self::Draft7,
        Self::Draft6,
        Self::Draft4,
        Self::Draft3,
    ];

    /// The canonical meta-schema URI.
    pub fn uri(&self) -> &'static str {
        match self {
            Self::Draft202012 => "https://json-schema.org/draft/2020-12/schema",
            Self::Draft201909 => "https://json-schema.org/draft/2019-09/schema",
            Self::Draft7 => "http://json-schema.org/draft-07/schema#",
            Self::Draft6 => "http://json-schema.org/draft-06/schema#",
            Self::Draft4 => "http://json-schema.org/draft-04/schema#",
            Self::Draft3 => "http://json-schema.org/draft-03/schema#",
        }
    }

    /// The short name used in test-suite reports.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Draft202012 => "draft2020-12",
            Self::Draft201909 => "draft2019-09",
            Self::Draft7 => "draft7",
            Self::Draft6 => "draft6",
            Self::Draft4 => "draft4",
            Self::Draft3 => "draft3",
        }
    }

    /// Look up a dialect by exact meta-schema URI.
    pub fn from_uri(uri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.uri() == uri)
    }

    /// Look up a dialect by short name.
    pub fn from_short_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.short_name() == name)
    }

    /// Look up a dialect by URI or short name.
    pub fn parse(text: &str) -> Option<Self> {
        Self::from_uri(text).or_else(|| Self::from_short_name(text))
    }
}

impl fmt::Display for KnownDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}
