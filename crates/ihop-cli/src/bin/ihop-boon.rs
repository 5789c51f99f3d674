//! # ihop-boon entry point
//!
//! Serves the harness protocol on stdin/stdout with the `boon` crate.

use std::process::ExitCode;

use ihop_cli::{main_for, Engine};

fn main() -> ExitCode {
    main_for(Engine::Boon)
}
