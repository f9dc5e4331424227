// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! kh-kubeutil: helpers that drive a cluster control plane through its CLI.
//!
//! Every operation here is an argument-vector builder over one boundary, the
//! [`CommandRunner`]. The runner binds each child process to a
//! [`CallContext`] so cancelling the context kills the real process.

pub mod cluster;
pub mod context;
pub mod env;
pub mod log;
pub mod rbac;
pub mod runner;
pub mod token;

mod kubectl;

pub use cluster::Kind;
pub use context::{CallContext, ContextError};
pub use kubectl::{KubeError, Kubectl};
pub use log::{Log, LogSink, TracingSink};
pub use rbac::ClusterRoleBindingSpec;
pub use runner::{
    with_marker, CommandRunner, ExecRequest, FailureCause, ProcessRunner, RunError,
    TOOLING_MARKER,
};
pub use token::{ServiceAccountToken, TOKEN_POLL_INTERVAL};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use runner::{FakeRunner, RunCall};
