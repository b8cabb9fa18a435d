//! Collect a process's output instead of streaming it.

use std::sync::{Arc, Mutex, PoisonError};

use super::error::RunError;
use super::options::{RunConfig, RunRequest};
use super::runner::run;

/// Output and outcome of a captured run.
#[derive(Debug)]
pub struct Captured {
    /// All stdout lines, in order.
    pub stdout: Vec<String>,

    /// All stderr lines, in order.
    pub stderr: Vec<String>,

    /// How the run ended. Lines are kept even when this is an error.
    pub result: Result<(), RunError>,
}

impl Captured {
    /// Check if the process ran and exited successfully.
    pub const fn success(&self) -> bool {
        self.result.is_ok()
    }

    /// Get stdout as a single string.
    pub fn stdout_string(&self) -> String {
        self.stdout.join("\n")
    }

    /// Get stderr as a single string.
    pub fn stderr_string(&self) -> String {
        self.stderr.join("\n")
    }

    /// Convert into the collected lines, failing if the run failed.
    ///
    /// # Errors
    ///
    /// Returns the run's error, discarding any output.
    pub fn into_result(self) -> Result<(Vec<String>, Vec<String>), RunError> {
        self.result.map(|()| (self.stdout, self.stderr))
    }
}

/// Run a process to completion and collect both streams.
///
/// Streams are always synchronized, so the returned lines are complete.
pub async fn capture(request: RunRequest) -> Captured {
    let stdout = Arc::new(Mutex::new(Vec::new()));
    let stderr = Arc::new(Mutex::new(Vec::new()));

    let config = RunConfig::new()
        .on_stdout_line(collector(&stdout))
        .on_stderr_line(collector(&stderr));

    let result = run(request, config).await;

    Captured {
        stdout: take_lines(&stdout),
        stderr: take_lines(&stderr),
        result,
    }
}

fn collector(lines: &Arc<Mutex<Vec<String>>>) -> impl Fn(String) + Send + Sync + 'static {
    let lines = Arc::clone(lines);
    move |line| lines.lock().unwrap_or_else(PoisonError::into_inner).push(line)
}

fn take_lines(lines: &Mutex<Vec<String>>) -> Vec<String> {
    std::mem::take(&mut *lines.lock().unwrap_or_else(PoisonError::into_inner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ErrorKind;

    #[tokio::test]
    async fn test_capture_echo() {
        let captured = capture(RunRequest::new("echo").arg("hello world")).await;

        assert!(captured.success());
        assert_eq!(captured.stdout, vec!["hello world"]);
        assert!(captured.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_capture_keeps_output_of_failed_run() {
        let captured = capture(
            RunRequest::new("sh")
                .arg("-c")
                .arg("echo one; echo two; echo oops >&2; exit 42"),
        )
        .await;

        assert!(!captured.success());
        assert_eq!(captured.stdout_string(), "one\ntwo");
        assert_eq!(captured.stderr_string(), "oops");
        assert_eq!(captured.result.as_ref().unwrap_err().exit_code(), Some(42));
    }

    #[tokio::test]
    async fn test_capture_into_result() {
        let (stdout, stderr) = capture(RunRequest::new("sh").arg("-c").arg("echo out; echo err >&2"))
            .await
            .into_result()
            .unwrap();

        assert_eq!(stdout, vec!["out"]);
        assert_eq!(stderr, vec!["err"]);

        let err = capture(RunRequest::new("nonexistent_command_12345"))
            .await
            .into_result()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Start);
    }
}
