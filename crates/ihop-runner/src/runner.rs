//! # Test Runner & Result Reporter
//!
//! Evaluates one [`TestCase`] against a [`ValidatorBackend`] and classifies
//! the outcome as exactly one of per-test results, a case-level error, or a
//! case-level skip.
//!
//! ## Order of Evaluation
//!
//! 1. Case skip check. A skipped case makes zero validator calls.
//! 2. Registry resolver built from the case, scoped to this call.
//! 3. Schema compiled once. Failure here is a case-level error.
//! 4. Each test, in order: a per-test skip, or one validator call.
//!
//! ## Error Isolation
//!
//! Per-test failures are isolated: a test whose evaluation fails is
//! reported as an errored record in its own position and the remaining
//! tests still run. A panic inside the backend is caught at this boundary
//! and reported the same way as a returned error, so the process survives
//! anything the validator does.

use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::{self, AssertUnwindSafe};

use ihop_core::{Dialect, ErrorClass, ErrorContext, RunResponse, Seq, TestCase, TestResult};
use ihop_schema::{BackendError, RegistryResolver, ValidatorBackend};

use crate::skip::SkipPolicy;

/// Classified outcome of one `run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseOutcome {
    /// One record per test, positionally aligned.
    Executed(Vec<TestResult>),
    /// The case as a whole could not be evaluated.
    Errored(ErrorContext),
    /// The case was intentionally not attempted.
    Skipped {
        /// Why.
        message: String,
        /// Tracking issue, if any.
        issue_url: Option<String>,
    },
}

impl CaseOutcome {
    /// Attach the request's correlation identifier.
    pub fn into_response(self, seq: Seq) -> RunResponse {
        match self {
            Self::Executed(results) => RunResponse::Executed { seq, results },
            Self::Errored(context) => RunResponse::Errored { seq, context },
            Self::Skipped { message, issue_url } => RunResponse::Skipped {
                seq,
                message,
                issue_url,
            },
        }
    }
}

/// Evaluate `case` under the active `dialect`.
pub fn run_case<B: ValidatorBackend>(
    backend: &B,
    skips: &SkipPolicy,
    dialect: Option<&Dialect>,
    case: &TestCase,
) -> CaseOutcome {
    if let Some(skip) = skips.case_skip(&case.description, dialect) {
        tracing::info!(case = %case.description, reason = %skip.message, "skipping case");
        return CaseOutcome::Skipped {
            message: skip.message.clone(),
            issue_url: skip.issue_url.clone(),
        };
    }

    let resolver = RegistryResolver::for_case(case.registry.as_ref());
    tracing::debug!(
        case = %case.description,
        tests = case.tests.len(),
        registry = resolver.as_ref().map_or(0, RegistryResolver::len),
        "running case"
    );

    let compiled = match guarded(|| backend.compile(&case.schema, resolver.as_ref())) {
        Ok(compiled) => compiled,
        Err(context) => {
            tracing::warn!(
                class = %ErrorClass::Case,
                case = %case.description,
                error = %context.message,
                "case errored"
            );
            return CaseOutcome::Errored(context);
        }
    };

    let results = case
        .tests
        .iter()
        .map(|test| {
            if let Some(reason) = skips.test_skip(&case.description, &test.description, dialect) {
                return TestResult::Skipped {
                    message: reason.to_string(),
                };
            }
            match guarded(|| backend.validate(&compiled, &test.instance)) {
                Ok(valid) => TestResult::valid(valid),
                Err(context) => {
                    tracing::warn!(
                        class = %ErrorClass::Test,
                        case = %case.description,
                        test = %test.description,
                        error = %context.message,
                        "test errored"
                    );
                    TestResult::Errored { context }
                }
            }
        })
        .collect();

    CaseOutcome::Executed(results)
}

/// Run a backend call, converting both returned errors and panics into an
/// [`ErrorContext`].
fn guarded<T>(call: impl FnOnce() -> Result<T, BackendError>) -> Result<T, ErrorContext> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(ErrorContext {
            message: err.to_string(),
            traceback: err.detail().to_string(),
        }),
        Err(payload) => Err(ErrorContext {
            message: format!("validator panicked: {}", panic_message(payload.as_ref())),
            traceback: Backtrace::force_capture().to_string(),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
