//! # Error Types: Protocol Error Taxonomy
//!
//! Every failure the harness can report falls into one of the classes of
//! [`ErrorClass`]. Codec failures and state violations are protocol errors;
//! an unsupported protocol version is a configuration error. Case-level and
//! test-level failures never surface as a [`ProtocolError`]: the runner turns
//! those into `errored` records on the wire and tags its diagnostics with
//! [`ErrorClass::Case`] or [`ErrorClass::Test`].

use thiserror::Error;

/// Severity class of a harness failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Malformed line, unknown command, or a command issued out of order.
    Protocol,
    /// Unsupported protocol version or dialect.
    Configuration,
    /// The whole case could not be evaluated.
    Case,
    /// A single test inside a case could not be evaluated.
    Test,
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Protocol => "protocol",
            Self::Configuration => "configuration",
            Self::Case => "case",
            Self::Test => "test",
        };
        f.write_str(s)
    }
}

/// Failure to decode or encode a single protocol line.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The line is not valid UTF-8.
    #[error("message is not valid UTF-8: {0}")]
    NotUtf8(#[source] std::str::Utf8Error),

    /// The line is not a JSON object.
    #[error("malformed message: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The object has no `cmd` field.
    #[error("message has no 'cmd' field")]
    MissingCommand,

    /// The `cmd` field names a command this protocol does not define.
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// A field the command requires is missing or has the wrong type.
    #[error("invalid '{command}' message: {source}")]
    InvalidFields {
        /// The command being decoded.
        command: &'static str,
        /// Underlying deserialization failure.
        #[source]
        source: serde_json::Error,
    },

    /// A response could not be serialized.
    #[error("cannot encode response: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Failure that stops the dispatcher from honouring a command.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The input line could not be decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The command is not valid in the current session state.
    #[error("'{command}' rejected in state {state}: {reason}")]
    InvalidState {
        /// The command that was rejected.
        command: String,
        /// Session state name at the time of rejection.
        state: String,
        /// Reason the command was rejected.
        reason: String,
    },

    /// `start` requested a protocol version this harness does not speak.
    #[error("unsupported protocol version {requested} (supported: {supported})")]
    UnsupportedVersion {
        /// Version the driver asked for.
        requested: i64,
        /// The only version this harness implements.
        supported: u32,
    },
}

impl ProtocolError {
    /// Classify this error within the harness taxonomy.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Codec(_) | Self::InvalidState { .. } => ErrorClass::Protocol,
            Self::UnsupportedVersion { .. } => ErrorClass::Configuration,
        }
    }
}
