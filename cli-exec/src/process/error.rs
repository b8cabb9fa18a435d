//! Errors returned by a run.

use std::io;
use std::process::ExitStatus;

use thiserror::Error;

use super::options::Stream;

/// Coarse classification of a [`RunError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An output stream could not be attached.
    Setup,
    /// The process could not be started.
    Start,
    /// Waiting on the started process failed.
    Wait,
    /// The process ran and exited unsuccessfully.
    Termination,
}

/// Why a run did not succeed.
#[derive(Debug, Error)]
pub enum RunError {
    /// The stream handle was not available, so nothing was observed.
    #[error("failed to attach {stream} of {program}")]
    Setup { program: String, stream: Stream },

    /// The OS refused to create the process.
    #[error("failed to start {program}")]
    Start {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The OS wait call failed.
    #[error("failed to wait for {program}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The process exited non-zero or was killed by a signal.
    #[error("{program} {}", describe_status(.status))]
    Termination { program: String, status: ExitStatus },
}

impl RunError {
    /// The kind of failure.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Setup { .. } => ErrorKind::Setup,
            Self::Start { .. } => ErrorKind::Start,
            Self::Wait { .. } => ErrorKind::Wait,
            Self::Termination { .. } => ErrorKind::Termination,
        }
    }

    /// True when the process never ran.
    pub const fn is_not_started(&self) -> bool {
        matches!(self, Self::Setup { .. } | Self::Start { .. })
    }

    /// Program the error refers to.
    pub fn program(&self) -> &str {
        match self {
            Self::Setup { program, .. }
            | Self::Start { program, .. }
            | Self::Wait { program, .. }
            | Self::Termination { program, .. } => program,
        }
    }

    /// Exit status of a terminated process.
    pub const fn status(&self) -> Option<ExitStatus> {
        match self {
            Self::Termination { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Exit code of a terminated process, if it exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        self.status().and_then(|status| status.code())
    }

    /// Signal that killed the process, on unix.
    pub fn signal(&self) -> Option<i32> {
        self.status().and_then(signal_of)
    }
}

#[cfg(unix)]
fn signal_of(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
const fn signal_of(_status: ExitStatus) -> Option<i32> {
    None
}

fn describe_status(status: &ExitStatus) -> String {
    match (status.code(), signal_of(*status)) {
        (Some(code), _) => format!("exited with status code {code}"),
        (None, Some(signal)) => format!("terminated by signal {signal}"),
        (None, None) => format!("terminated abnormally ({status})"),
    }
}
