//! # ihop harness binaries
//!
//! Command-line surface shared by the harness binaries, one per validation
//! [`Engine`]: `ihop-jsonschema` and `ihop-boon`. Each reads protocol
//! commands on stdin and writes one response line per command on stdout;
//! stdout carries nothing else. Diagnostics go to stderr through `tracing`.
//!
//! ## Configuration
//!
//! | Flag             | Effect                                             |
//! |------------------|----------------------------------------------------|
//! | `--skip-file`    | YAML skip policy applied to every `run`            |
//! | `-v` (repeat)    | Raise log verbosity: warn → info → debug → trace   |
//! | `--log-format`   | `text` (default) or `json` log lines on stderr     |
//!
//! `RUST_LOG`, when set, takes precedence over `-v`.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use ihop_runner::{serve, Dispatcher, HostInfo, ServeExit, SkipPolicy};
use ihop_schema::{BoonBackend, JsonSchemaBackend, ValidatorBackend};

/// Validation library a harness binary drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    /// The `jsonschema` crate.
    JsonSchema,
    /// The `boon` crate.
    Boon,
}

impl Engine {
    /// Name of the binary serving this engine.
    pub fn bin_name(self) -> &'static str {
        match self {
            Self::JsonSchema => "ihop-jsonschema",
            Self::Boon => "ihop-boon",
        }
    }

    fn about(self) -> &'static str {
        match self {
            Self::JsonSchema => "Test harness for the `jsonschema` crate.",
            Self::Boon => "Test harness for the `boon` crate.",
        }
    }

    /// The command-line definition, named for this engine's binary.
    pub fn command(self) -> clap::Command {
        Cli::command().name(self.bin_name()).about(self.about())
    }

    /// Parse `args` as this engine's binary would.
    pub fn try_parse_from<I, T>(self, args: I) -> Result<Cli, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = self.command().try_get_matches_from(args)?;
        Cli::from_arg_matches(&matches)
    }
}

/// Test harness for a JSON Schema validation library.
///
/// Speaks the newline-delimited JSON harness protocol on stdin/stdout.
#[derive(Parser, Debug)]
#[command(name = "ihop-jsonschema", version, about, long_about = None)]
pub struct Cli {
    /// YAML file listing cases and tests to skip.
    #[arg(long, value_name = "PATH")]
    pub skip_file: Option<PathBuf>,

    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Format of log lines written to stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

impl Cli {
    /// Default filter directive for the verbosity count.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Install the global subscriber. Logs always go to stderr.
pub fn init_logging(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    match cli.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stderr),
            )
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(io::stderr),
            )
            .init(),
    }
}

/// Entry point shared by the harness binaries.
pub fn main_for(engine: Engine) -> ExitCode {
    let matches = engine.command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    init_logging(&cli);

    tracing::debug!(
        bin = engine.bin_name(),
        version = env!("CARGO_PKG_VERSION"),
        "harness starting"
    );

    match run(engine, &cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

/// Load configuration and serve stdin until the session ends.
///
/// Returns the process exit code. Errors are configuration or I/O failures
/// that prevented the session from running to completion.
pub fn run(engine: Engine, cli: &Cli) -> Result<u8> {
    let skips = match &cli.skip_file {
        Some(path) => SkipPolicy::load(path)
            .with_context(|| format!("failed to load skip file {}", path.display()))?,
        None => SkipPolicy::empty(),
    };
    tracing::debug!(empty = skips.is_empty(), "skip policy loaded");

    match engine {
        Engine::JsonSchema => serve_stdio(JsonSchemaBackend::new(), skips),
        Engine::Boon => serve_stdio(BoonBackend::new(), skips),
    }
}

fn serve_stdio<B: ValidatorBackend>(backend: B, skips: SkipPolicy) -> Result<u8> {
    let mut dispatcher = Dispatcher::new(backend, skips, HostInfo::detect());

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let report = serve(&mut dispatcher, stdin.lock(), &mut writer)?;

    tracing::info!(
        processed_lines = report.processed_lines,
        cases_run = report.stats.cases_run,
        cases_errored = report.stats.cases_errored,
        cases_skipped = report.stats.cases_skipped,
        tests_errored = report.stats.tests_errored,
        "session ended"
    );
    if let ServeExit::Fatal { class, message } = &report.exit {
        tracing::error!(%class, %message, "session aborted");
    }
    Ok(report.exit.exit_code())
}
