// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kubectl` front end shared by the RBAC, token, and cluster helpers.

use crate::context::{CallContext, ContextError};
use crate::log::Log;
use crate::runner::{CommandRunner, ExecRequest, ProcessRunner, RunError};

/// Errors from control-plane operations.
#[derive(Debug, thiserror::Error)]
pub enum KubeError {
    #[error("kubectl apply clusterrolebinding failed: {0}")]
    Apply(#[source] RunError),

    #[error("failed to encode manifest: {0}")]
    Manifest(#[source] serde_json::Error),

    #[error("token request failed (ns={namespace} sa={service_account}): {source}")]
    TokenRequest {
        namespace: String,
        service_account: String,
        #[source]
        source: RunError,
    },

    #[error("token response json parse failed: {source} (body={body:?})")]
    TokenParse {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("token is empty")]
    EmptyToken,

    /// A named helper step (e.g. `kubectl wait cert-manager-webhook`) failed.
    #[error("{stage} failed: {source}")]
    Step {
        stage: &'static str,
        #[source]
        source: RunError,
    },

    #[error(transparent)]
    Context(#[from] ContextError),
}

/// Runs `kubectl` through a [`CommandRunner`].
///
/// Generic over the runner so tests can swap in a fake.
#[derive(Debug, Clone)]
pub struct Kubectl<R = ProcessRunner> {
    runner: R,
    binary: String,
    log: Log,
}

impl Kubectl<ProcessRunner> {
    /// Real processes, `kubectl` from `PATH`, no log sink.
    pub fn new() -> Self {
        Self::with_runner(ProcessRunner)
    }

    /// Like [`Kubectl::new`] but honoring `KH_KUBECTL`.
    pub fn from_env() -> Self {
        Self::new().binary(crate::env::kubectl_binary())
    }
}

impl Default for Kubectl<ProcessRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> Kubectl<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner, binary: crate::env::DEFAULT_KUBECTL.to_string(), log: Log::none() }
    }

    /// Override the `kubectl` executable.
    pub fn binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn log(mut self, log: Log) -> Self {
        self.log = log;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn binary_path(&self) -> &str {
        &self.binary
    }

    pub(crate) fn logger(&self) -> &Log {
        &self.log
    }

    /// A request for `kubectl <args...>`.
    pub(crate) fn request<I, S>(&self, args: I) -> ExecRequest
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExecRequest::new(self.binary.as_str()).args(args)
    }

    pub(crate) async fn run(&self, ctx: &CallContext, req: ExecRequest) -> Result<String, RunError> {
        self.runner.run(ctx, &self.log, req).await
    }

    /// Echo trimmed command output through the log sink.
    pub(crate) fn log_output(&self, stdout: &str) {
        let trimmed = stdout.trim();
        if !trimmed.is_empty() {
            self.log.logf(format_args!("{}", trimmed));
        }
    }
}
