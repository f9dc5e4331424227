// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ServiceAccount token polling.
//!
//! The API server issues tokens asynchronously, so a freshly deployed
//! ServiceAccount may not be able to get one yet. The poller tries once
//! immediately, then once per [`TOKEN_POLL_INTERVAL`] tick until a non-empty
//! token comes back or the context is done:
//!
//! ```text
//! Requesting ──ok──▶ Success
//!     │ failure (logged, kept as last error)
//!     ▼
//!  Waiting ──tick──▶ Requesting
//!     │ ctx done
//!     ▼
//! Cancelled (returns the last error)
//! ```
//!
//! At most one request is in flight at any time.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use tokio::time::{Instant, MissedTickBehavior};

use crate::context::CallContext;
use crate::kubectl::{KubeError, Kubectl};
use crate::runner::CommandRunner;

/// Fixed delay between attempts. No backoff, no jitter.
pub const TOKEN_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Minimal TokenRequest body: default audience and lifetime.
// TODO(token): marshal a struct instead once audiences/expirationSeconds are configurable.
pub const TOKEN_REQUEST_BODY: &str =
    r#"{"apiVersion":"authentication.k8s.io/v1","kind":"TokenRequest"}"#;

/// Bearer token for one ServiceAccount. The value never appears in `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceAccountToken(String);

impl ServiceAccountToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for ServiceAccountToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ServiceAccountToken(<redacted>)")
    }
}

impl AsRef<str> for ServiceAccountToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    status: TokenStatus,
}

#[derive(Deserialize)]
struct TokenStatus {
    token: String,
}

/// Raw API path of the `token` subresource.
pub fn token_path(namespace: &str, service_account: &str) -> String {
    format!("/api/v1/namespaces/{}/serviceaccounts/{}/token", namespace, service_account)
}

/// Extract `status.token`. Any other shape, or an empty token, is an error.
pub fn parse_token_response(body: &str) -> Result<ServiceAccountToken, KubeError> {
    let response: TokenResponse = serde_json::from_str(body)
        .map_err(|source| KubeError::TokenParse { body: body.to_string(), source })?;
    if response.status.token.is_empty() {
        return Err(KubeError::EmptyToken);
    }
    Ok(ServiceAccountToken(response.status.token))
}

impl<R: CommandRunner> Kubectl<R> {
    /// Request a token for `namespace/service_account`, retrying every
    /// [`TOKEN_POLL_INTERVAL`] until one is issued or `ctx` is done.
    ///
    /// On cancellation the most recent failure is returned; if the context
    /// was already done on entry, no request is made and the context's own
    /// error is returned.
    pub async fn service_account_token(
        &self,
        ctx: &CallContext,
        namespace: &str,
        service_account: &str,
    ) -> Result<ServiceAccountToken, KubeError> {
        if let Some(cause) = ctx.err() {
            return Err(cause.into());
        }

        let mut ticker =
            tokio::time::interval_at(Instant::now() + TOKEN_POLL_INTERVAL, TOKEN_POLL_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut attempt = 1u32;
        let mut last_err = match self.request_token(ctx, namespace, service_account).await {
            Ok(token) => return Ok(token),
            Err(e) => e,
        };
        self.token_not_ready(attempt, &last_err);

        loop {
            tokio::select! {
                biased;
                _ = ctx.done() => return Err(last_err),
                _ = ticker.tick() => {
                    attempt += 1;
                    match self.request_token(ctx, namespace, service_account).await {
                        Ok(token) => {
                            tracing::info!(namespace, service_account, attempt, "token issued");
                            return Ok(token);
                        }
                        Err(e) => {
                            self.token_not_ready(attempt, &e);
                            last_err = e;
                        }
                    }
                }
            }
        }
    }

    /// One `kubectl create --raw <path> -f -` round trip.
    async fn request_token(
        &self,
        ctx: &CallContext,
        namespace: &str,
        service_account: &str,
    ) -> Result<ServiceAccountToken, KubeError> {
        let path = token_path(namespace, service_account);
        let req = self.request(["create", "--raw", path.as_str(), "-f", "-"]).stdin(TOKEN_REQUEST_BODY);

        let stdout = self.run(ctx, req).await.map_err(|source| KubeError::TokenRequest {
            namespace: namespace.to_string(),
            service_account: service_account.to_string(),
            source,
        })?;
        parse_token_response(&stdout)
    }

    fn token_not_ready(&self, attempt: u32, err: &KubeError) {
        self.logger().logf(format_args!("token not ready yet: {}", err));
        tracing::warn!(attempt, error = %err, "token not ready yet");
    }
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;
