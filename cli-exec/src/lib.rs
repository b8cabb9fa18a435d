//! cli-exec - run external programs and watch their output as it happens.
//!
//! ```rust,no_run
//! use cli_exec::process::{run_command, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RunConfig::new()
//!         .on_stdout_line(|line| println!("out: {line}"))
//!         .on_stderr_line(|line| eprintln!("err: {line}"));
//!
//!     run_command("ls", ["-la"], config).await?;
//!     Ok(())
//! }
//! ```

pub mod process;
