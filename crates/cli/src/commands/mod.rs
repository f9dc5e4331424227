// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod cert_manager;
pub mod kind;
pub mod rbac;
pub mod token;

use kh_kubeutil::{CallContext, KubeError};

use crate::exit_error::{ExitError, EXIT_TIMEOUT};

/// Map a failed operation to an exit error, using the timeout code when the
/// context ran out first.
pub(crate) fn operation_failed(ctx: &CallContext, err: KubeError) -> anyhow::Error {
    let code = if ctx.is_done() { EXIT_TIMEOUT } else { 1 };
    ExitError::new(code, err.to_string()).into()
}
