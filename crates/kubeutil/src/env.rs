// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.

use std::time::Duration;

pub const DEFAULT_KUBECTL: &str = "kubectl";
pub const DEFAULT_KIND: &str = "kind";
pub const DEFAULT_KIND_CLUSTER: &str = "kind";

/// kubectl executable: KH_KUBECTL > `kubectl` on PATH
pub fn kubectl_binary() -> String {
    non_empty_var("KH_KUBECTL").unwrap_or_else(|| DEFAULT_KUBECTL.to_string())
}

/// kind executable: KH_KIND > `kind` on PATH
pub fn kind_binary() -> String {
    non_empty_var("KH_KIND").unwrap_or_else(|| DEFAULT_KIND.to_string())
}

/// Target kind cluster. A set-but-empty KIND_CLUSTER is passed through as is.
pub fn kind_cluster() -> String {
    std::env::var("KIND_CLUSTER").unwrap_or_else(|_| DEFAULT_KIND_CLUSTER.to_string())
}

/// Deadline for token polling (default 2m, configurable via `KH_TOKEN_TIMEOUT_MS`).
pub fn token_timeout() -> Duration {
    millis_var("KH_TOKEN_TIMEOUT_MS").unwrap_or(Duration::from_secs(2 * 60))
}

/// Deadline for apply and setup helpers (default 10m, configurable via
/// `KH_APPLY_TIMEOUT_MS`).
pub fn apply_timeout() -> Duration {
    millis_var("KH_APPLY_TIMEOUT_MS").unwrap_or(Duration::from_secs(10 * 60))
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn millis_var(name: &str) -> Option<Duration> {
    std::env::var(name).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
