//! # Skip Policy
//!
//! A table of test cases (and individual tests) the backend is known not to
//! support, each mapped to a human-readable reason. A matching case is
//! answered with a case-level skip before any validator call; a matching
//! test is answered with a per-test skip in its position.
//!
//! ## File Format
//!
//! ```yaml
//! cases:
//!   - description: "minContains = 0 with no maxContains"
//!     message: "minContains is not honoured"
//!     issue_url: "https://example.org/issues/1"
//!     dialect: draft2019-09
//! tests:
//!   - case: "minContains = 0 with maxContains"
//!     test: "empty data"
//!     message: "minContains is not honoured"
//! ```
//!
//! Descriptions match exactly. `dialect` is optional and accepts a URI or a
//! short name; an entry without it applies under every dialect.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use ihop_core::{Dialect, KnownDialect};

/// Error loading a skip policy.
#[derive(Error, Debug)]
pub enum SkipPolicyError {
    /// The file could not be read.
    #[error("cannot read skip file '{path}': {source}")]
    Io {
        /// Path to the skip file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML of the expected shape.
    #[error("invalid skip file '{path}': {source}")]
    Parse {
        /// Path to the skip file, or `<inline>`.
        path: String,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// An entry is structurally valid but unusable.
    #[error("invalid skip entry for '{description}': {reason}")]
    InvalidEntry {
        /// Description of the offending entry.
        description: String,
        /// What is wrong with it.
        reason: String,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SkipFile {
    #[serde(default)]
    cases: Vec<CaseEntry>,
    #[serde(default)]
    tests: Vec<TestEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CaseEntry {
    description: String,
    message: String,
    #[serde(default)]
    issue_url: Option<String>,
    #[serde(default)]
    dialect: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TestEntry {
    case: String,
    test: String,
    message: String,
    #[serde(default)]
    dialect: Option<String>,
}

/// The dialects an entry applies under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialectScope {
    /// Every dialect, including none.
    Any,
    /// One catalogued dialect.
    Known(KnownDialect),
    /// An uncatalogued dialect URI, matched exactly.
    Uri(String),
}

impl DialectScope {
    fn parse(text: Option<String>) -> Self {
        match text {
            None => Self::Any,
            Some(text) => match KnownDialect::parse(&text) {
                Some(known) => Self::Known(known),
                None => Self::Uri(text),
            },
        }
    }

    /// Whether an entry with this scope applies under `active`.
    pub fn matches(&self, active: Option<&Dialect>) -> bool {
        match self {
            Self::Any => true,
            Self::Known(known) => active.and_then(Dialect::known) == Some(*known),
            Self::Uri(uri) => active.is_some_and(|d| d.uri() == uri),
        }
    }
}

/// Why a whole case is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseSkip {
    /// Human-readable reason.
    pub message: String,
    /// Tracking issue, if any.
    pub issue_url: Option<String>,
    /// Dialects the skip applies under.
    pub scope: DialectScope,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TestSkip {
    message: String,
    scope: DialectScope,
}

/// Known-unsupported cases and tests.
#[derive(Debug, Clone, Default)]
pub struct SkipPolicy {
    cases: HashMap<String, Vec<CaseSkip>>,
    tests: HashMap<(String, String), Vec<TestSkip>>,
}

impl SkipPolicy {
    /// A policy that skips nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a policy from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SkipPolicyError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SkipPolicyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse a policy from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SkipPolicyError> {
        Self::parse(yaml, "<inline>")
    }

    fn parse(yaml: &str, origin: &str) -> Result<Self, SkipPolicyError> {
        // An empty document deserializes as null rather than an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::empty());
        }
        let file: SkipFile = serde_yaml::from_str(yaml).map_err(|source| SkipPolicyError::Parse {
            path: origin.to_string(),
            source,
        })?;

        let mut policy = Self::empty();
        for entry in file.cases {
            require_message(&entry.description, &entry.message)?;
            policy.cases.entry(entry.description).or_default().push(CaseSkip {
                message: entry.message,
                issue_url: entry.issue_url,
                scope: DialectScope::parse(entry.dialect),
            });
        }
        for entry in file.tests {
            require_message(&format!("{} / {}", entry.case, entry.test), &entry.message)?;
            policy
                .tests
                .entry((entry.case, entry.test))
                .or_default()
                .push(TestSkip {
                    message: entry.message,
                    scope: DialectScope::parse(entry.dialect),
                });
        }
        tracing::debug!(
            origin,
            cases = policy.cases.len(),
            tests = policy.tests.len(),
            "loaded skip policy"
        );
        Ok(policy)
    }

    /// Add a case skip that applies under every dialect.
    pub fn skip_case(
        &mut self,
        description: impl Into<String>,
        message: impl Into<String>,
        issue_url: Option<String>,
    ) -> &mut Self {
        self.cases.entry(description.into()).or_default().push(CaseSkip {
            message: message.into(),
            issue_url,
            scope: DialectScope::Any,
        });
        self
    }

    /// Add a test skip that applies under every dialect.
    pub fn skip_test(
        &mut self,
        case: impl Into<String>,
        test: impl Into<String>,
        message: impl Into<String>,
    ) -> &mut Self {
        self.tests
            .entry((case.into(), test.into()))
            .or_default()
            .push(TestSkip {
                message: message.into(),
                scope: DialectScope::Any,
            });
        self
    }

    /// The skip for a case under the active dialect, if any.
    pub fn case_skip(&self, description: &str, dialect: Option<&Dialect>) -> Option<&CaseSkip> {
        self.cases
            .get(description)?
            .iter()
            .find(|s| s.scope.matches(dialect))
    }

    /// The skip reason for one test under the active dialect, if any.
    pub fn test_skip(&self, case: &str, test: &str, dialect: Option<&Dialect>) -> Option<&str> {
        self.tests
            .get(&(case.to_string(), test.to_string()))?
            .iter()
            .find(|s| s.scope.matches(dialect))
            .map(|s| s.message.as_str())
    }

    /// Whether the policy skips nothing.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty() && self.tests.is_empty()
    }
}

fn require_message(description: &str, message: &str) -> Result<(), SkipPolicyError> {
    if message.trim().is_empty() {
        return Err(SkipPolicyError::InvalidEntry {
            description: description.to_string(),
            reason: "message must not be empty".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const POLICY: &str = r#"
cases:
  - description: "minContains = 0 with no maxContains"
    message: "minContains is not honoured"
    issue_url: "https://example.org/issues/1"
    dialect: draft2019-09
  - description: "always skipped"
    message: "unsupported everywhere"
tests:
  - case: "minContains = 0 with maxContains"
    test: "empty data"
    message: "minContains is not honoured"
    dialect: "https://json-schema.org/draft/2019-09/schema"
"#;

    fn draft(known: KnownDialect) -> Dialect {
        known.into()
    }

    #[test]
    fn test_empty_policy_skips_nothing() {
        let policy = SkipPolicy::empty();
        assert!(policy.is_empty());
        assert!(policy.case_skip("anything", None).is_none());
        assert!(policy.test_skip("a", "b", None).is_none());
    }

    #[test]
    fn test_case_skip_scoped_to_dialect() {
        let policy = SkipPolicy::from_yaml_str(POLICY).unwrap();
        let d201909 = draft(KnownDialect::Draft201909);
        let d202012 = draft(KnownDialect::Draft202012);

        let skip = policy
            .case_skip("minContains = 0 with no maxContains", Some(&d201909))
            .unwrap();
        assert_eq!(skip.message, "minContains is not honoured");
        assert_eq!(skip.issue_url.as_deref(), Some("https://example.org/issues/1"));

        assert!(policy
            .case_skip("minContains = 0 with no maxContains", Some(&d202012))
            .is_none());
        assert!(policy
            .case_skip("minContains = 0 with no maxContains", None)
            .is_none());
    }

    #[test]
    fn test_unscoped_case_skip_applies_everywhere() {
        let policy = SkipPolicy::from_yaml_str(POLICY).unwrap();
        assert!(policy.case_skip("always skipped", None).is_some());
        assert!(policy
            .case_skip("always skipped", Some(&draft(KnownDialect::Draft4)))
            .is_some());
    }

    #[test]
    fn test_case_description_match_is_exact() {
        let policy = SkipPolicy::from_yaml_str(POLICY).unwrap();
        assert!(policy.case_skip("Always skipped", None).is_none());
        assert!(policy.case_skip("always skipped ", None).is_none());
    }

    #[test]
    fn test_test_skip_lookup() {
        let policy = SkipPolicy::from_yaml_str(POLICY).unwrap();
        let d = draft(KnownDialect::Draft201909);
        assert_eq!(
            policy.test_skip("minContains = 0 with maxContains", "empty data", Some(&d)),
            Some("minContains is not honoured")
        );
        assert!(policy
            .test_skip("minContains = 0 with maxContains", "other", Some(&d))
            .is_none());
    }

    #[test]
    fn test_uncatalogued_dialect_scope_matches_exact_uri() {
        let scope = DialectScope::parse(Some("urn:example:custom".into()));
        assert!(scope.matches(Some(&Dialect::new("urn:example:custom"))));
        assert!(!scope.matches(Some(&Dialect::new("urn:example:other"))));
        assert!(!scope.matches(None));
    }

    #[test]
    fn test_empty_message_is_rejected() {
        let err = SkipPolicy::from_yaml_str("cases:\n  - description: x\n    message: \"  \"\n")
            .unwrap_err();
        assert!(matches!(err, SkipPolicyError::InvalidEntry { .. }));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = SkipPolicy::from_yaml_str("cases: []\nskip_everything: true\n").unwrap_err();
        assert!(matches!(err, SkipPolicyError::Parse { .. }));
    }

    #[test]
    fn test_blank_document_is_empty_policy() {
        assert!(SkipPolicy::from_yaml_str("\n").unwrap().is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(POLICY.as_bytes()).unwrap();
        let policy = SkipPolicy::load(file.path()).unwrap();
        assert!(!policy.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SkipPolicy::load(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, SkipPolicyError::Io { .. }));
    }

    #[test]
    fn test_builder_methods() {
        let mut policy = SkipPolicy::empty();
        policy
            .skip_case("c", "reason", None)
            .skip_test("c2", "t", "test reason");
        assert_eq!(policy.case_skip("c", None).unwrap().message, "reason");
        assert_eq!(policy.test_skip("c2", "t", None), Some("test reason"));
    }
}
