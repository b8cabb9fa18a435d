//! Request and configuration types for a single run.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Callback invoked once per line, with the line terminator stripped.
pub type LineHandler = Arc<dyn Fn(String) + Send + Sync + 'static>;

/// Which output stream of the child a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

impl Stream {
    /// Lowercase name of the stream.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The program to run and what to hand it.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    /// Program path, or a name resolved through `PATH`.
    pub program: String,

    /// Arguments, passed through verbatim and in order.
    pub args: Vec<String>,

    /// Working directory for the child. Inherited when unset.
    pub working_dir: Option<PathBuf>,

    /// Environment variables set on top of the inherited environment.
    pub env: HashMap<String, String>,
}

impl RunRequest {
    /// Request to run `program` as-is, with no arguments and the caller's environment.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Append one argument; it reaches the child as a single argv entry.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append arguments in iteration order.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the child from `dir` instead of the caller's current directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Override one variable in the child's inherited environment.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Override several variables; later pairs win on duplicate keys.
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in vars {
            self.env.insert(k.into(), v.into());
        }
        self
    }
}

/// How a run observes the child's output.
#[derive(Clone)]
pub struct RunConfig {
    /// Wait for both streams to reach end-of-stream before reaping the child.
    ///
    /// When false, `run` returns once the child has exited and the stream
    /// tasks are left to finish on their own. Handlers may still fire after
    /// `run` returns; do not rely on their timing in this mode.
    pub synchronize_streams: bool,

    /// Handler for stdout lines. Falls back to [`default_print`](super::default_print).
    pub on_stdout_line: Option<LineHandler>,

    /// Handler for stderr lines. Falls back to [`default_print`](super::default_print).
    pub on_stderr_line: Option<LineHandler>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            synchronize_streams: true,
            on_stdout_line: None,
            on_stderr_line: None,
        }
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("synchronize_streams", &self.synchronize_streams)
            .field("on_stdout_line", &self.on_stdout_line.is_some())
            .field("on_stderr_line", &self.on_stderr_line.is_some())
            .finish()
    }
}

impl RunConfig {
    /// Default configuration: synchronized streams, console printing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to wait for stream drain before reaping.
    pub const fn synchronize_streams(mut self, synchronize: bool) -> Self {
        self.synchronize_streams = synchronize;
        self
    }

    /// Set the stdout line handler.
    pub fn on_stdout_line<F>(mut self, handler: F) -> Self
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.on_stdout_line = Some(Arc::new(handler));
        self
    }

    /// Set the stderr line handler.
    pub fn on_stderr_line<F>(mut self, handler: F) -> Self
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.on_stderr_line = Some(Arc::new(handler));
        self
    }

    /// The handler bound to `stream`, if one is configured.
    pub fn handler(&self, stream: Stream) -> Option<&LineHandler> {
        match stream {
            Stream::Stdout => self.on_stdout_line.as_ref(),
            Stream::Stderr => self.on_stderr_line.as_ref(),
        }
    }
}
