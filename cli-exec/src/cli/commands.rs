//! CLI command execution.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use cli_exec::process::{default_print, run, RunConfig, RunError, RunRequest, Stream};

use super::args::{Cli, OutputFormat};

/// Exit code used when the program could not be started, as shells do.
const EXIT_NOT_STARTED: u8 = 127;

/// One output line in `--format json`.
#[derive(Debug, Serialize)]
struct LineRecord<'a> {
    stream: Stream,
    line: &'a str,
    ts: DateTime<Utc>,
}

/// Run the requested program and translate its outcome into an exit code.
pub async fn execute(cli: Cli) -> Result<u8> {
    let mut request = RunRequest::new(&cli.program).args(cli.args).envs(cli.env);
    if let Some(dir) = cli.dir {
        request = request.working_dir(dir);
    }

    let config = build_config(cli.format).synchronize_streams(!cli.no_sync);

    match run(request, config).await {
        Ok(()) => Ok(0),
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("cli-exec: {:#}", anyhow::Error::from(e));
            Ok(code)
        }
    }
}

/// Handlers for the chosen output format.
fn build_config(format: OutputFormat) -> RunConfig {
    match format {
        OutputFormat::Plain => RunConfig::new(),
        OutputFormat::Prefixed => RunConfig::new()
            .on_stdout_line(|line| default_print(prefixed(Stream::Stdout, &line)))
            .on_stderr_line(|line| default_print(prefixed(Stream::Stderr, &line))),
        OutputFormat::Json => RunConfig::new()
            .on_stdout_line(|line| emit_json(Stream::Stdout, &line))
            .on_stderr_line(|line| emit_json(Stream::Stderr, &line)),
    }
}

fn prefixed(stream: Stream, line: &str) -> String {
    format!("[{stream}] {line}")
}

fn json_line(stream: Stream, line: &str, ts: DateTime<Utc>) -> Result<String> {
    serde_json::to_string(&LineRecord { stream, line, ts }).context("Failed to encode line as JSON")
}

fn emit_json(stream: Stream, line: &str) {
    match json_line(stream, line, Utc::now()) {
        Ok(encoded) => default_print(encoded),
        Err(e) => tracing::warn!(%stream, error = %e, "dropping output line"),
    }
}

/// Map a failed run to the exit code `cli-exec` itself returns.
///
/// A program that ran and failed passes its own code through; one killed by
/// a signal reports `128 + signal`.
fn exit_code_for(err: &RunError) -> u8 {
    if err.is_not_started() {
        return EXIT_NOT_STARTED;
    }
    if let Some(code) = err.exit_code() {
        return u8::try_from(code).ok().filter(|c| *c != 0).unwrap_or(1);
    }
    if let Some(signal) = err.signal() {
        return u8::try_from(128 + signal).unwrap_or(1);
    }
    1
}
