//! cli-exec - run a program and stream its output line by line.
//!
//! The child's stdout and stderr are read concurrently and printed as they
//! arrive; `cli-exec` exits with the child's exit code.

mod cli;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use cli::{execute, init_logging, Cli};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    let code = execute(cli).await?;
    Ok(ExitCode::from(code))
}
