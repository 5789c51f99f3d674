//! # Command Dispatcher
//!
//! Routes each decoded [`Command`] to its handler, enforcing session
//! preconditions before any handler runs. The dispatcher owns the session,
//! the backend and the skip policy; nothing it touches is process-global.
//!
//! A rejected command leaves the session and backend untouched and is
//! returned as a [`ProtocolError`]. A case that fails is not a rejected
//! command: it becomes an `errored` record and the session stays usable.

use serde::Serialize;

use ihop_core::{
    Command, Dialect, DialectResponse, ProtocolError, RunResponse, Seq, StartResponse, TestCase,
    PROTOCOL_VERSION,
};
use ihop_schema::ValidatorBackend;
use ihop_state::{Session, SessionState};

use crate::host::HostInfo;
use crate::runner::{run_case, CaseOutcome};
use crate::skip::SkipPolicy;

/// A response owed to the driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    /// Reply to `start`.
    Start(StartResponse),
    /// Reply to `dialect`.
    Dialect(DialectResponse),
    /// Reply to `run`.
    Run(RunResponse),
}

/// What the serve loop does after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Write this response and read the next line.
    Respond(Response),
    /// Exit cleanly without writing anything further.
    Stop,
}

/// Running totals over a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// `run` commands handled.
    pub cases_run: usize,
    /// Cases answered with a case-level error.
    pub cases_errored: usize,
    /// Cases answered with a case-level skip.
    pub cases_skipped: usize,
    /// Individual tests answered with an errored record.
    pub tests_errored: usize,
}

/// Routes commands for one session.
#[derive(Debug)]
pub struct Dispatcher<B> {
    session: Session,
    backend: B,
    skips: SkipPolicy,
    host: HostInfo,
    stats: DispatchStats,
}

impl<B: ValidatorBackend> Dispatcher<B> {
    /// A dispatcher with a fresh session.
    pub fn new(backend: B, skips: SkipPolicy, host: HostInfo) -> Self {
        Self {
            session: Session::new(),
            backend,
            skips,
            host,
            stats: DispatchStats::default(),
        }
    }

    /// The session this dispatcher drives.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Totals so far.
    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Handle one decoded command.
    pub fn handle(&mut self, command: Command) -> Result<Outcome, ProtocolError> {
        tracing::debug!(cmd = command.name(), state = %self.session.state(), "dispatching");
        let response = match command {
            Command::Start { version } => Response::Start(self.start(version)?),
            Command::Dialect { dialect } => Response::Dialect(self.dialect(dialect)?),
            Command::Run { seq, case } => Response::Run(self.run(seq, &case)?),
            Command::Stop => {
                self.stop()?;
                return Ok(Outcome::Stop);
            }
        };
        Ok(Outcome::Respond(response))
    }

    fn start(&mut self, version: i64) -> Result<StartResponse, ProtocolError> {
        if version != i64::from(PROTOCOL_VERSION) {
            return Err(ProtocolError::UnsupportedVersion {
                requested: version,
                supported: PROTOCOL_VERSION,
            });
        }
        self.session.start()?;
        let implementation = self.host.implementation(&self.backend);
        tracing::info!(
            name = %implementation.name,
            version = %implementation.version,
            dialects = implementation.dialects.len(),
            "session started"
        );
        Ok(StartResponse::new(implementation))
    }

    fn dialect(&mut self, dialect: Dialect) -> Result<DialectResponse, ProtocolError> {
        self.session.ensure_started("dialect")?;
        let ok = self.backend.select_dialect(&dialect);
        if ok {
            tracing::info!(dialect = %dialect, "dialect selected");
            self.session.set_dialect(Some(dialect))?;
        } else {
            tracing::warn!(dialect = %dialect, "unsupported dialect, falling back to detection");
            self.session.set_dialect(None)?;
        }
        Ok(DialectResponse { ok })
    }

    fn run(&mut self, seq: Seq, case: &TestCase) -> Result<RunResponse, ProtocolError> {
        self.session.ensure_started("run")?;
        let outcome = run_case(&self.backend, &self.skips, self.session.dialect(), case);

        self.stats.cases_run += 1;
        match &outcome {
            CaseOutcome::Errored(_) => self.stats.cases_errored += 1,
            CaseOutcome::Skipped { .. } => self.stats.cases_skipped += 1,
            CaseOutcome::Executed(results) => {
                self.stats.tests_errored += results
                    .iter()
                    .filter(|r| matches!(r, ihop_core::TestResult::Errored { .. }))
                    .count();
            }
        }
        Ok(outcome.into_response(seq))
    }

    fn stop(&mut self) -> Result<(), ProtocolError> {
        self.session.stop()?;
        tracing::info!(
            cases = self.stats.cases_run,
            errored = self.stats.cases_errored,
            skipped = self.stats.cases_skipped,
            "session stopped"
        );
        Ok(())
    }

    /// Whether the session has reached its terminal state.
    pub fn is_terminated(&self) -> bool {
        self.session.state() == SessionState::Terminated
    }
}
