//! # ihop-jsonschema entry point
//!
//! Serves the harness protocol on stdin/stdout with the `jsonschema` crate.

use std::process::ExitCode;

use ihop_cli::{main_for, Engine};

fn main() -> ExitCode {
    main_for(Engine::JsonSchema)
}
