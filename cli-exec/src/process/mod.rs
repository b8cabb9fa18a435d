//! Process execution with live line-by-line output.
//!
//! [`run`] starts a child with both output streams piped, drains them on
//! two concurrent tasks and hands each line to a caller-supplied handler,
//! then reports how the child exited. [`capture`] builds on it to collect
//! the output instead.

mod capture;
mod error;
mod lines;
mod options;
mod runner;

pub use capture::{capture, Captured};
pub use error::{ErrorKind, RunError};
pub use lines::{default_print, scan_lines};
pub use options::{LineHandler, RunConfig, RunRequest, Stream};
pub use runner::{run, run_command};
