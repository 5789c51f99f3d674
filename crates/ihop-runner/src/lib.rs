//! # ihop-runner
//!
//! Harness execution: everything between a decoded command and the line
//! written back to the driver.
//!
//! ## Modules
//!
//! - [`skip`]: YAML-loaded skip policy for whole cases and single tests.
//! - [`runner`]: evaluates one case against a backend, with per-test
//!   error and panic isolation.
//! - [`host`]: OS and toolchain facts for the `start` response.
//! - [`dispatch`]: routes commands through the session state machine.
//! - [`serve`]: the newline-delimited JSON read/dispatch/write loop.

pub mod dispatch;
pub mod host;
pub mod runner;
pub mod serve;
pub mod skip;

pub use dispatch::{DispatchStats, Dispatcher, Outcome, Response};
pub use host::HostInfo;
pub use runner::{run_case, CaseOutcome};
pub use serve::{serve, ServeExit, ServeReport};
pub use skip::{CaseSkip, DialectScope, SkipPolicy, SkipPolicyError};
