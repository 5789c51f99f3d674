//! # Session Lifecycle
//!
//! ## Design Decision
//!
//! Three states and a handful of self-loops do not warrant a typestate
//! encoding: the dispatcher receives commands at runtime and must answer
//! out-of-order ones with a diagnostic, not a compile error. The enum
//! approach with each transition returning `Result` keeps rejected
//! commands observable and side-effect free.

use thiserror::Error;

use ihop_core::{Dialect, ProtocolError};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Waiting for `start`.
    NotStarted,
    /// Accepting `dialect`, `run` and `stop`.
    Started,
    /// `stop` was received (terminal).
    Terminated,
}

impl SessionState {
    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NotStarted => "NOT_STARTED",
            Self::Started => "STARTED",
            Self::Terminated => "TERMINATED",
        };
        f.write_str(s)
    }
}

/// A command arrived in a state that does not accept it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Any command but `start` before the session began.
    #[error("Not started: '{command}' requires a prior 'start'")]
    NotStarted {
        /// The rejected command.
        command: String,
    },

    /// A second `start`.
    #[error("Already started: 'start' may only be sent once")]
    AlreadyStarted,

    /// Any command after `stop`.
    #[error("Terminated: '{command}' received after 'stop'")]
    Terminated {
        /// The rejected command.
        command: String,
    },
}

impl SessionError {
    fn command(&self) -> &str {
        match self {
            Self::NotStarted { command } | Self::Terminated { command } => command,
            Self::AlreadyStarted => "start",
        }
    }

    fn state(&self) -> SessionState {
        match self {
            Self::NotStarted { .. } => SessionState::NotStarted,
            Self::AlreadyStarted => SessionState::Started,
            Self::Terminated { .. } => SessionState::Terminated,
        }
    }
}

impl From<SessionError> for ProtocolError {
    fn from(err: SessionError) -> Self {
        ProtocolError::InvalidState {
            command: err.command().to_string(),
            state: err.state().to_string(),
            reason: err.to_string(),
        }
    }
}

/// A harness session: lifecycle state plus the active dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    state: SessionState,
    dialect: Option<Dialect>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A fresh session awaiting `start`.
    pub fn new() -> Self {
        Self {
            state: SessionState::NotStarted,
            dialect: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The active dialect, if one was selected.
    pub fn dialect(&self) -> Option<&Dialect> {
        self.dialect.as_ref()
    }

    /// `NotStarted → Started`.
    pub fn start(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::NotStarted => {
                self.state = SessionState::Started;
                Ok(())
            }
            SessionState::Started => Err(SessionError::AlreadyStarted),
            SessionState::Terminated => Err(SessionError::Terminated {
                command: "start".into(),
            }),
        }
    }

    /// Fail unless the session is `Started`.
    pub fn ensure_started(&self, command: &str) -> Result<(), SessionError> {
        match self.state {
            SessionState::Started => Ok(()),
            SessionState::NotStarted => Err(SessionError::NotStarted {
                command: command.into(),
            }),
            SessionState::Terminated => Err(SessionError::Terminated {
                command: command.into(),
            }),
        }
    }

    /// Replace the active dialect. `None` clears it, leaving dialect
    /// detection to the backend.
    pub fn set_dialect(&mut self, dialect: Option<Dialect>) -> Result<(), SessionError> {
        self.ensure_started("dialect")?;
        self.dialect = dialect;
        Ok(())
    }

    /// `Started → Terminated`.
    pub fn stop(&mut self) -> Result<(), SessionError> {
        self.ensure_started("stop")?;
        self.state = SessionState::Terminated;
        Ok(())
    }
}
