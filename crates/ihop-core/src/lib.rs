//! # ihop-core: Harness Protocol Wire Types
//!
//! The bedrock of the ihop workspace. Defines everything that crosses the
//! line-delimited JSON boundary between a test-suite driver and a validator
//! adapter, plus the error taxonomy every other crate reports through.
//! Depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **One command, one line.** [`Command::decode`] turns exactly one input
//!    line into a tagged command; [`encode_line`] turns exactly one response
//!    into a line with no embedded newlines.
//!
//! 2. **Lenient on extras, strict on requirements.** Unknown fields are
//!    ignored so newer drivers keep working. Fields the given `cmd` requires
//!    are enforced by the type of that command's payload.
//!
//! 3. **`seq` is never interpreted.** [`Seq`] holds the raw JSON text of the
//!    correlation identifier and writes it back byte-for-byte, so large
//!    integers and structured identifiers survive the round trip.
//!
//! 4. **Dialects are URIs first.** [`Dialect`] stores the URI exactly as the
//!    driver sent it; [`KnownDialect`] is the catalogue backends map onto.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ihop-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod case;
pub mod codec;
pub mod dialect;
pub mod error;
pub mod response;
pub mod seq;

// Re-export primary types for ergonomic imports.
pub use case::{Registry, SchemaDocument, Test, TestCase};
pub use codec::{encode_line, Command, PROTOCOL_VERSION};
pub use dialect::{Dialect, KnownDialect};
pub use error::{CodecError, ErrorClass, ProtocolError};
pub use response::{
    DialectResponse, ErrorContext, FatalResponse, Implementation, Link, RunResponse,
    StartResponse, TestResult,
};
pub use seq::Seq;
