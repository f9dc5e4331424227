// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Context-bound external process execution.
//!
//! An [`ExecRequest`] is only a descriptor (path, args, dir, stdin, env).
//! [`ProcessRunner`] builds its own `tokio::process::Command` from it, so a
//! request extracted from a caller-built `std::process::Command` still gets a
//! child that dies when the [`CallContext`] is cancelled.
//!
//! Stdout and stderr are captured separately. On success only stdout is
//! returned, which keeps `-o json` / `-o jsonpath` output parseable.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::ChildStdin;

use crate::context::{CallContext, ContextError};
use crate::log::Log;

/// Appended to every child environment to pin Go module mode in the tooling
/// the control-plane CLI shells out to.
pub const TOOLING_MARKER: (&str, &str) = ("GO111MODULE", "on");

/// Descriptor of one external command invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecRequest {
    program: Option<String>,
    args: Vec<String>,
    dir: Option<PathBuf>,
    stdin: Option<Vec<u8>>,
    env: Option<Vec<(String, String)>>,
}

impl ExecRequest {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: Some(program.into()), ..Self::default() }
    }

    /// Build from a bare argument vector; `argv[0]` is the program path.
    pub fn from_argv<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { args: argv.into_iter().map(Into::into).collect(), ..Self::default() }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Feed `input` on stdin. An empty input is still a (closed) stdin pipe,
    /// not an absent one.
    pub fn stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Add one variable to the explicit environment override. Once any
    /// variable is set the child no longer inherits the host environment.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.get_or_insert_with(Vec::new).push((key.into(), value.into()));
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let env = self.env.get_or_insert_with(Vec::new);
        env.extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn program(&self) -> Option<&str> {
        self.program.as_deref()
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn input(&self) -> Option<&[u8]> {
        self.stdin.as_deref()
    }

    pub fn env_override(&self) -> Option<&[(String, String)]> {
        self.env.as_deref()
    }

    /// Program path and remaining arguments, falling back to `args[0]` when
    /// no program was set. `None` for an empty request.
    pub fn resolve(&self) -> Option<(&str, &[String])> {
        match self.program {
            Some(ref program) => Some((program.as_str(), self.args.as_slice())),
            None => self.args.split_first().map(|(first, rest)| (first.as_str(), rest)),
        }
    }

    /// Space-joined command line as it will be executed.
    pub fn command_line(&self) -> String {
        match self.resolve() {
            Some((path, args)) => {
                let mut line = path.to_string();
                for arg in args {
                    line.push(' ');
                    line.push_str(arg);
                }
                line
            }
            None => String::new(),
        }
    }
}

/// Extract the descriptor from a caller-built, context-unaware command.
///
/// `std::process::Command` only exposes explicit env changes, so when any are
/// present they are applied on top of the host environment to form the
/// override. `env_clear()` and piped stdin are not observable and are lost.
impl From<&std::process::Command> for ExecRequest {
    fn from(cmd: &std::process::Command) -> Self {
        let changes: Vec<(&OsStr, Option<&OsStr>)> = cmd.get_envs().collect();
        let env = if changes.is_empty() {
            None
        } else {
            let mut vars = host_env();
            for (key, value) in changes {
                let key = key.to_string_lossy();
                vars.retain(|(name, _)| *name != key);
                if let Some(value) = value {
                    vars.push((key.into_owned(), value.to_string_lossy().into_owned()));
                }
            }
            Some(vars)
        };

        Self {
            program: Some(cmd.get_program().to_string_lossy().into_owned()),
            args: cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect(),
            dir: cmd.get_current_dir().map(Path::to_path_buf),
            stdin: None,
            env,
        }
    }
}

fn host_env() -> Vec<(String, String)> {
    std::env::vars_os()
        .map(|(k, v)| (k.to_string_lossy().into_owned(), v.to_string_lossy().into_owned()))
        .collect()
}

/// Final child environment: the override (or the host environment when the
/// override is absent or empty) followed by [`TOOLING_MARKER`].
pub fn with_marker(env: Option<Vec<(String, String)>>) -> Vec<(String, String)> {
    let mut env = match env {
        Some(vars) if !vars.is_empty() => vars,
        _ => host_env(),
    };
    env.push((TOOLING_MARKER.0.to_string(), TOOLING_MARKER.1.to_string()));
    env
}

/// Why a command did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum FailureCause {
    #[error("failed to start: {0}")]
    Spawn(#[source] io::Error),

    #[error("i/o error: {0}")]
    Io(#[source] io::Error),

    #[error("{0}")]
    Exit(ExitStatus),

    #[error(transparent)]
    Context(#[from] ContextError),
}

/// Errors from [`CommandRunner::run`].
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("empty command: no program and no arguments")]
    EmptyCommand,

    /// The command could not start, exited non-zero, or was cancelled.
    /// `diagnostics` is stderr followed by stdout, trimmed.
    #[error("{command:?} failed: {diagnostics}: {cause}")]
    Failed {
        command: String,
        diagnostics: String,
        stdout: String,
        #[source]
        cause: FailureCause,
    },
}

impl RunError {
    pub fn failed(
        command: impl Into<String>,
        stderr: &str,
        stdout: impl Into<String>,
        cause: FailureCause,
    ) -> Self {
        let stdout = stdout.into();
        let diagnostics = format!("{}\n{}", stderr, stdout).trim().to_string();
        RunError::Failed { command: command.into(), diagnostics, stdout, cause }
    }

    /// Partial stdout captured before the failure.
    pub fn stdout(&self) -> &str {
        match self {
            RunError::Failed { stdout, .. } => stdout,
            RunError::EmptyCommand => "",
        }
    }

    pub fn command(&self) -> Option<&str> {
        match self {
            RunError::Failed { command, .. } => Some(command),
            RunError::EmptyCommand => None,
        }
    }

    pub fn cause(&self) -> Option<&FailureCause> {
        match self {
            RunError::Failed { cause, .. } => Some(cause),
            RunError::EmptyCommand => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.cause(), Some(FailureCause::Context(_)))
    }
}

/// The single boundary to the outside world: run one command to completion
/// or until `ctx` is done. Returns stdout on success.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, ctx: &CallContext, log: &Log, req: ExecRequest)
        -> Result<String, RunError>;
}

/// Runs requests as real child processes.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(
        &self,
        ctx: &CallContext,
        log: &Log,
        req: ExecRequest,
    ) -> Result<String, RunError> {
        let command = req.command_line();
        let ExecRequest { program, args, dir, stdin, env } = req;
        let (path, args) = match program {
            Some(program) => (program, args),
            None => {
                let mut argv = args.into_iter();
                match argv.next() {
                    Some(first) => (first, argv.collect()),
                    None => return Err(RunError::EmptyCommand),
                }
            }
        };

        log.logf(format_args!("running: {:?}", command));
        tracing::debug!(%command, "running");

        if let Some(cause) = ctx.err() {
            return Err(RunError::failed(command, "", "", cause.into()));
        }

        let mut cmd = tokio::process::Command::new(&path);
        cmd.args(&args)
            .env_clear()
            .envs(with_marker(env))
            .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(ref dir) = dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| RunError::failed(command.clone(), "", "", FailureCause::Spawn(e)))?;
        let pipe = child.stdin.take();

        // Dropping this future on cancellation drops the child, and
        // kill_on_drop sends SIGKILL.
        let exchange = async move {
            tokio::join!(feed_stdin(pipe, stdin), child.wait_with_output())
        };

        let (fed, output) = tokio::select! {
            biased;
            cause = ctx.done() => {
                tracing::debug!(%command, %cause, "cancelled, killing child");
                return Err(RunError::failed(command, "", "", cause.into()));
            }
            result = exchange => result,
        };

        let output = output
            .map_err(|e| RunError::failed(command.clone(), "", "", FailureCause::Io(e)))?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(RunError::failed(command, &stderr, stdout, FailureCause::Exit(output.status)));
        }
        if let Err(e) = fed {
            return Err(RunError::failed(command, &stderr, stdout, FailureCause::Io(e)));
        }
        Ok(stdout)
    }
}

/// Write all of `input` and close the pipe. A child that exits without
/// reading its stdin is not an error.
async fn feed_stdin(pipe: Option<ChildStdin>, input: Option<Vec<u8>>) -> io::Result<()> {
    let (Some(mut pipe), Some(input)) = (pipe, input) else {
        return Ok(());
    };
    let result = match pipe.write_all(&input).await {
        Ok(()) => pipe.shutdown().await,
        Err(e) => Err(e),
    };
    match result {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use std::collections::VecDeque;
    use std::sync::Arc;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::{CommandRunner, ExecRequest, FailureCause, RunError};
    use crate::context::CallContext;
    use crate::log::Log;

    /// Recorded runner invocation
    #[derive(Debug, Clone)]
    pub struct RunCall {
        pub request: ExecRequest,
        /// Whether the context was already done when the call was made
        pub ctx_done: bool,
    }

    enum Scripted {
        Ok(String),
        Fail { stderr: String, stdout: String },
    }

    #[derive(Default)]
    struct FakeRunnerState {
        calls: Vec<RunCall>,
        responses: VecDeque<Scripted>,
        fallback: Option<String>,
    }

    /// Fake runner for testing: replays scripted responses in order.
    ///
    /// When the script runs dry it answers with the fallback stdout if one is
    /// set, otherwise with a failure.
    #[derive(Clone, Default)]
    pub struct FakeRunner {
        inner: Arc<Mutex<FakeRunnerState>>,
    }

    impl FakeRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_ok(&self, stdout: impl Into<String>) -> &Self {
            self.inner.lock().responses.push_back(Scripted::Ok(stdout.into()));
            self
        }

        pub fn push_failure(&self, stderr: impl Into<String>) -> &Self {
            self.inner
                .lock()
                .responses
                .push_back(Scripted::Fail { stderr: stderr.into(), stdout: String::new() });
            self
        }

        pub fn push_failure_with_stdout(
            &self,
            stderr: impl Into<String>,
            stdout: impl Into<String>,
        ) -> &Self {
            self.inner
                .lock()
                .responses
                .push_back(Scripted::Fail { stderr: stderr.into(), stdout: stdout.into() });
            self
        }

        /// Answer every unscripted call with `stdout`.
        pub fn set_fallback(&self, stdout: impl Into<String>) -> &Self {
            self.inner.lock().fallback = Some(stdout.into());
            self
        }

        /// Get all recorded invocations
        pub fn calls(&self) -> Vec<RunCall> {
            self.inner.lock().calls.clone()
        }

        pub fn call_count(&self) -> usize {
            self.inner.lock().calls.len()
        }
    }

    #[async_trait]
    impl CommandRunner for FakeRunner {
        async fn run(
            &self,
            ctx: &CallContext,
            log: &Log,
            req: ExecRequest,
        ) -> Result<String, RunError> {
            let command = req.command_line();
            log.logf(format_args!("running: {:?}", command));

            let scripted = {
                let mut state = self.inner.lock();
                state.calls.push(RunCall { request: req, ctx_done: ctx.is_done() });
                match state.responses.pop_front() {
                    Some(scripted) => scripted,
                    None => match state.fallback {
                        Some(ref stdout) => Scripted::Ok(stdout.clone()),
                        None => Scripted::Fail {
                            stderr: "no scripted response".to_string(),
                            stdout: String::new(),
                        },
                    },
                }
            };

            match scripted {
                Scripted::Ok(stdout) => Ok(stdout),
                Scripted::Fail { stderr, stdout } => Err(RunError::failed(
                    command,
                    &stderr,
                    stdout,
                    FailureCause::Io(std::io::Error::other("exit status: 1")),
                )),
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRunner, RunCall};

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
