//! # ihop-state: Session State Machine
//!
//! Tracks where a harness session is in its lifecycle and which dialect is
//! active. The session is explicit state owned by the dispatch loop and
//! passed by reference into each handler; there is no process-global state.
//!
//! ## States
//!
//! ```text
//! NotStarted ──start──▶ Started ──stop──▶ Terminated
//!                        │   ▲
//!                        └───┘ dialect / run
//! ```
//!
//! Only `start` leaves `NotStarted`; only `stop` reaches `Terminated`, which
//! accepts nothing further. Every rejected command leaves the session
//! exactly as it was.

pub mod session;

pub use session::{Session, SessionError, SessionState};
