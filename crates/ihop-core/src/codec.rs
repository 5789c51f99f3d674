//! # Message Codec
//!
//! Decodes one input line into a [`Command`] and encodes one response into
//! one output line.
//!
//! ## Decoding
//!
//! Decoding is two-pass. The first pass reads only the `cmd` tag; the second
//! deserializes the same text into the payload that command requires. Both
//! passes read straight from the line rather than through an intermediate
//! `Value`, which keeps [`Seq`] byte-exact. Unknown fields are ignored at
//! every level; missing required fields fail with
//! [`CodecError::InvalidFields`].
//!
//! ## Encoding
//!
//! Responses are written compactly by `serde_json`, which escapes control
//! characters inside strings, so an encoded response never contains a raw
//! newline.

use serde::{Deserialize, Serialize};

use crate::case::TestCase;
use crate::dialect::Dialect;
use crate::error::CodecError;
use crate::seq::Seq;

/// The only protocol version this harness speaks.
pub const PROTOCOL_VERSION: u32 = 1;

/// A decoded request line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Begin the session at the given protocol version.
    Start {
        /// Requested protocol version.
        version: i64,
    },
    /// Select the dialect for subsequent runs.
    Dialect {
        /// Requested dialect URI.
        dialect: Dialect,
    },
    /// Evaluate one test case.
    Run {
        /// Correlation identifier to echo.
        seq: Seq,
        /// The case to evaluate.
        case: TestCase,
    },
    /// End the session.
    Stop,
}

#[derive(Deserialize)]
struct Tag {
    cmd: Option<String>,
}

#[derive(Deserialize)]
struct StartFields {
    version: i64,
}

#[derive(Deserialize)]
struct DialectFields {
    dialect: Dialect,
}

#[derive(Deserialize)]
struct RunFields {
    seq: Seq,
    case: TestCase,
}

#[derive(Deserialize)]
struct SeqOnly {
    #[serde(default)]
    seq: Option<Seq>,
}

fn payload<'a, T: Deserialize<'a>>(command: &'static str, line: &'a str) -> Result<T, CodecError> {
    serde_json::from_str(line).map_err(|source| CodecError::InvalidFields { command, source })
}

impl Command {
    /// Decode a single input line.
    pub fn decode(line: &str) -> Result<Self, CodecError> {
        let tag: Tag = serde_json::from_str(line).map_err(CodecError::Malformed)?;
        let cmd = tag.cmd.ok_or(CodecError::MissingCommand)?;
        match cmd.as_str() {
            "start" => {
                let StartFields { version } = payload("start", line)?;
                Ok(Self::Start { version })
            }
            "dialect" => {
                let DialectFields { dialect } = payload("dialect", line)?;
                Ok(Self::Dialect { dialect })
            }
            "run" => {
                let RunFields { seq, case } = payload("run", line)?;
                Ok(Self::Run { seq, case })
            }
            "stop" => Ok(Self::Stop),
            _ => Err(CodecError::UnknownCommand(cmd)),
        }
    }

    /// The wire name of this command.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Dialect { .. } => "dialect",
            Self::Run { .. } => "run",
            Self::Stop => "stop",
        }
    }
}

/// Best-effort recovery of `seq` from a line that failed to decode.
pub fn recover_seq(line: &str) -> Option<Seq> {
    serde_json::from_str::<SeqOnly>(line).ok().and_then(|p| p.seq)
}

/// Encode a response as a single line, without the trailing newline.
pub fn encode_line<T: Serialize>(response: &T) -> Result<String, CodecError> {
    serde_json::to_string(response).map_err(CodecError::Encode)
}
