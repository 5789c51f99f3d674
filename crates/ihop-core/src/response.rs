//! # Response Records
//!
//! Shapes written back to the driver, one per line:
//!
//! | Request   | Response                                                |
//! |-----------|---------------------------------------------------------|
//! | `start`   | [`StartResponse`]                                       |
//! | `dialect` | [`DialectResponse`]                                     |
//! | `run`     | [`RunResponse`]: results, case error, or case skip      |
//! | (fatal)   | [`FatalResponse`]: diagnostic before a non-zero exit    |
//!
//! The tagged records (`errored: true`, `skipped: true`) are serialized by
//! hand so the marker fields can never be `false` and never go missing.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::codec::PROTOCOL_VERSION;
use crate::seq::Seq;

// ─── start ───────────────────────────────────────────────────────────

/// Reply to `start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartResponse {
    /// Protocol version in use.
    pub version: u32,
    /// Identity of the validator behind this harness.
    pub implementation: Implementation,
}

impl StartResponse {
    /// A reply at the current protocol version.
    pub fn new(implementation: Implementation) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            implementation,
        }
    }
}

/// Identity and capabilities of the validator implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implementation {
    /// Implementation language.
    pub language: String,
    /// Library name.
    pub name: String,
    /// Library version.
    pub version: String,
    /// Supported dialect URIs, newest first.
    pub dialects: Vec<String>,
    /// Project homepage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    /// API documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    /// Issue tracker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<String>,
    /// Source repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Operating system the harness runs on.
    pub os: String,
    /// Operating system release.
    pub os_version: String,
    /// Compiler or runtime version.
    pub language_version: String,
    /// Further links.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

/// A described hyperlink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Target URL.
    pub url: String,
    /// What the link points at.
    pub description: String,
}

// ─── dialect ─────────────────────────────────────────────────────────

/// Reply to `dialect`. `ok: false` means results for this dialect are
/// best-effort because the backend could not select it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialectResponse {
    /// Whether the dialect was selected.
    pub ok: bool,
}

// ─── run ─────────────────────────────────────────────────────────────

/// Diagnostic attached to an errored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Short description.
    pub message: String,
    /// Full diagnostic trace.
    pub traceback: String,
}

/// Outcome of a single test within a case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResult {
    /// The validator reached a verdict.
    Executed {
        /// The validator's verdict.
        valid: bool,
    },
    /// The test was intentionally not attempted.
    Skipped {
        /// Why the test was skipped.
        message: String,
    },
    /// The validator failed on this instance alone.
    Errored {
        /// Diagnostic.
        context: ErrorContext,
    },
}

impl TestResult {
    /// A definitive verdict.
    pub fn valid(valid: bool) -> Self {
        Self::Executed { valid }
    }

    /// A per-test error.
    pub fn errored(message: impl Into<String>, traceback: impl Into<String>) -> Self {
        Self::Errored {
            context: ErrorContext {
                message: message.into(),
                traceback: traceback.into(),
            },
        }
    }
}

impl Serialize for TestResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Executed { valid } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("valid", valid)?;
                map.end()
            }
            Self::Skipped { message } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("skipped", &true)?;
                map.serialize_entry("message", message)?;
                map.end()
            }
            Self::Errored { context } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("errored", &true)?;
                map.serialize_entry("context", context)?;
                map.end()
            }
        }
    }
}

/// Reply to `run`: exactly one of per-test results, a case error, or a
/// case skip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunResponse {
    /// Results aligned positionally with the case's tests.
    Executed {
        /// Echoed correlation identifier.
        seq: Seq,
        /// One record per test.
        results: Vec<TestResult>,
    },
    /// The case as a whole could not be evaluated.
    Errored {
        /// Echoed correlation identifier.
        seq: Seq,
        /// Diagnostic.
        context: ErrorContext,
    },
    /// The case was intentionally not attempted.
    Skipped {
        /// Echoed correlation identifier.
        seq: Seq,
        /// Why the case was skipped.
        message: String,
        /// Tracking issue for the unsupported behaviour.
        issue_url: Option<String>,
    },
}

impl RunResponse {
    /// A case-level error.
    pub fn errored(seq: Seq, message: impl Into<String>, traceback: impl Into<String>) -> Self {
        Self::Errored {
            seq,
            context: ErrorContext {
                message: message.into(),
                traceback: traceback.into(),
            },
        }
    }

    /// The echoed correlation identifier.
    pub fn seq(&self) -> &Seq {
        match self {
            Self::Executed { seq, .. } | Self::Errored { seq, .. } | Self::Skipped { seq, .. } => {
                seq
            }
        }
    }
}

impl Serialize for RunResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Executed { seq, results } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("seq", seq)?;
                map.serialize_entry("results", results)?;
                map.end()
            }
            Self::Errored { seq, context } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("seq", seq)?;
                map.serialize_entry("errored", &true)?;
                map.serialize_entry("context", context)?;
                map.end()
            }
            Self::Skipped {
                seq,
                message,
                issue_url,
            } => {
                let len = if issue_url.is_some() { 4 } else { 3 };
                let mut map = serializer.serialize_map(Some(len))?;
                map.serialize_entry("seq", seq)?;
                map.serialize_entry("skipped", &true)?;
                map.serialize_entry("message", message)?;
                if let Some(url) = issue_url {
                    map.serialize_entry("issue_url", url)?;
                }
                map.end()
            }
        }
    }
}

// ─── fatal ───────────────────────────────────────────────────────────

/// Last line written before the harness exits on a protocol error.
///
/// When no `seq` could be recovered from the offending line the sentinel
/// `-1` is written in its place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatalResponse {
    /// Correlation identifier recovered from the offending line.
    pub seq: Option<Seq>,
    /// Diagnostic.
    pub context: ErrorContext,
}

impl Serialize for FatalResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        match &self.seq {
            Some(seq) => map.serialize_entry("seq", seq)?,
            None => map.serialize_entry("seq", &-1)?,
        }
        map.serialize_entry("errored", &true)?;
        map.serialize_entry("context", &self.context)?;
        map.end()
    }
}
