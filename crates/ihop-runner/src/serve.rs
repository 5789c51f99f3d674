//! # Serve Loop
//!
//! Reads newline-delimited JSON commands from a reader, dispatches each one
//! and streams exactly one response line per command to a writer, flushing
//! after every line so the driver never waits on a buffered reply.
//!
//! ## Termination
//!
//! | Cause                    | Last line written      | Exit code |
//! |--------------------------|------------------------|-----------|
//! | `stop`                   | none                   | 0         |
//! | end of input             | none                   | 0         |
//! | protocol error           | fatal diagnostics line | 1         |
//!
//! Blank lines are ignored. Any other line that does not decode, including
//! one that is not valid UTF-8, is a protocol error.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use serde::Serialize;

use ihop_core::codec::recover_seq;
use ihop_core::{
    CodecError, Command, ErrorClass, ErrorContext, FatalResponse, ProtocolError, Seq,
};
use ihop_schema::ValidatorBackend;

use crate::dispatch::{DispatchStats, Dispatcher, Outcome};

/// Why the serve loop returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServeExit {
    /// The driver sent `stop`.
    Stopped,
    /// The input closed without a `stop`.
    EndOfInput,
    /// A protocol error ended the session.
    Fatal {
        /// Taxonomy class of the error.
        class: ErrorClass,
        /// Human-readable description.
        message: String,
    },
}

impl ServeExit {
    /// Process exit code for this termination.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Stopped | Self::EndOfInput => 0,
            Self::Fatal { .. } => 1,
        }
    }
}

/// Summary of one served session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeReport {
    /// Non-blank lines read.
    pub processed_lines: usize,
    /// Dispatcher totals.
    pub stats: DispatchStats,
    /// How the session ended.
    pub exit: ServeExit,
}

/// Serve commands from `reader` until `stop`, end of input, or a protocol
/// error. I/O failures on either stream are returned as `Err`.
pub fn serve<B, R, W>(
    dispatcher: &mut Dispatcher<B>,
    mut reader: R,
    writer: &mut W,
) -> Result<ServeReport>
where
    B: ValidatorBackend,
    R: BufRead,
    W: Write,
{
    let mut buf = Vec::new();
    let mut processed_lines = 0_usize;

    let exit = loop {
        buf.clear();
        let bytes_read = reader
            .read_until(b'\n', &mut buf)
            .context("failed to read command line")?;
        if bytes_read == 0 {
            tracing::warn!("input closed without 'stop'");
            break ServeExit::EndOfInput;
        }
        let line = match std::str::from_utf8(&buf) {
            Ok(text) => text.trim(),
            Err(err) => {
                processed_lines = processed_lines.saturating_add(1);
                break fatal(writer, None, CodecError::NotUtf8(err).into())?;
            }
        };
        if line.is_empty() {
            continue;
        }
        processed_lines = processed_lines.saturating_add(1);

        let outcome = Command::decode(line)
            .map_err(ProtocolError::from)
            .and_then(|command| dispatcher.handle(command));
        match outcome {
            Ok(Outcome::Respond(response)) => write_line(writer, &response)?,
            Ok(Outcome::Stop) => break ServeExit::Stopped,
            Err(err) => break fatal(writer, recover_seq(line), err)?,
        }
    };

    Ok(ServeReport {
        processed_lines,
        stats: dispatcher.stats(),
        exit,
    })
}

/// Write the diagnostic line for a session-ending protocol error.
fn fatal<W: Write>(writer: &mut W, seq: Option<Seq>, err: ProtocolError) -> Result<ServeExit> {
    tracing::error!(class = %err.class(), error = %err, "protocol error");
    let response = FatalResponse {
        seq,
        context: ErrorContext {
            message: err.to_string(),
            traceback: format!("{err:?}"),
        },
    };
    write_line(writer, &response)?;
    Ok(ServeExit::Fatal {
        class: err.class(),
        message: err.to_string(),
    })
}

fn write_line<W: Write, T: Serialize>(writer: &mut W, response: &T) -> Result<()> {
    serde_json::to_writer(&mut *writer, response).context("failed to serialize response")?;
    writer
        .write_all(b"\n")
        .context("failed to write response delimiter")?;
    writer.flush().context("failed to flush response line")
}
