//! Run a process while streaming its output line by line.
//!
//! Both stdout and stderr are piped and drained concurrently by two tokio
//! tasks, so a child that fills one pipe never stalls on the other. Each
//! line goes to the handler configured for its stream, or to
//! [`default_print`]. The call resolves with the child's exit outcome.
//!
//! There is no timeout. A child that never exits keeps `run` pending; the
//! child is killed if the caller drops the future, so wrapping the call in
//! `tokio::time::timeout` is the way to bound it.

use std::process::Stdio;

use tokio::io::{AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use super::error::RunError;
use super::lines::{default_print, scan_lines};
use super::options::{LineHandler, RunConfig, RunRequest, Stream};

/// Run `program` with `args` under `config`.
///
/// # Errors
///
/// See [`run`].
pub async fn run_command<I, S>(
    program: impl Into<String>,
    args: I,
    config: RunConfig,
) -> Result<(), RunError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    run(RunRequest::new(program).args(args), config).await
}

/// Run a process to completion, forwarding its output lines.
///
/// With `config.synchronize_streams` set, both streams are read to the end
/// before the child is reaped. Otherwise the stream tasks are detached and
/// may keep delivering lines after this returns.
///
/// # Errors
///
/// - [`RunError::Start`] if the process could not be spawned.
/// - [`RunError::Setup`] if a stream handle was not available.
/// - [`RunError::Wait`] if waiting on the child failed.
/// - [`RunError::Termination`] if the child exited non-zero or was signalled.
pub async fn run(request: RunRequest, config: RunConfig) -> Result<(), RunError> {
    let mut cmd = Command::new(&request.program);
    cmd.args(&request.args);

    if let Some(ref dir) = request.working_dir {
        cmd.current_dir(dir);
    }

    for (key, value) in &request.env {
        cmd.env(key, value);
    }

    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| RunError::Start {
        program: request.program.clone(),
        source,
    })?;

    tracing::debug!(program = %request.program, pid = ?child.id(), "process started");

    let Some(stdout) = child.stdout.take() else {
        return Err(abandon(child, request.program, Stream::Stdout).await);
    };
    let Some(stderr) = child.stderr.take() else {
        return Err(abandon(child, request.program, Stream::Stderr).await);
    };

    let stdout_task = spawn_reader(stdout, Stream::Stdout, &config);
    let stderr_task = spawn_reader(stderr, Stream::Stderr, &config);

    if config.synchronize_streams {
        let (stdout_done, stderr_done) = tokio::join!(stdout_task, stderr_task);
        for (stream, done) in [(Stream::Stdout, stdout_done), (Stream::Stderr, stderr_done)] {
            if let Err(e) = done {
                tracing::warn!(%stream, error = %e, "line handler task did not complete");
            }
        }
    } else {
        // Detached: the tasks end when their pipe reaches end-of-stream
        drop(stdout_task);
        drop(stderr_task);
    }

    let status = child.wait().await.map_err(|source| RunError::Wait {
        program: request.program.clone(),
        source,
    })?;

    tracing::debug!(program = %request.program, %status, "process exited");

    if status.success() {
        Ok(())
    } else {
        Err(RunError::Termination {
            program: request.program,
            status,
        })
    }
}

/// Kill a child whose output cannot be observed.
async fn abandon(mut child: Child, program: String, stream: Stream) -> RunError {
    if let Err(e) = child.kill().await {
        tracing::warn!(%program, error = %e, "failed to kill unobserved process");
    }
    RunError::Setup { program, stream }
}

/// Spawn a task that drains `pipe` into the handler `config` binds to `stream`.
fn spawn_reader<R>(pipe: R, stream: Stream, config: &RunConfig) -> JoinHandle<usize>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let handler: Option<LineHandler> = config.handler(stream).cloned();
    tokio::spawn(async move {
        let reader = BufReader::new(pipe);
        let lines = match handler {
            Some(handler) => scan_lines(reader, &*handler).await,
            None => scan_lines(reader, default_print).await,
        };
        tracing::debug!(%stream, lines, "stream closed");
        lines
    })
}
