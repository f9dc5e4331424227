// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test-environment setup helpers: cert-manager and kind image loading.
//!
//! Plain sequential invocations over the same runner as everything else.

use crate::context::CallContext;
use crate::kubectl::{KubeError, Kubectl};
use crate::log::Log;
use crate::runner::{CommandRunner, ExecRequest, ProcessRunner};

pub const CERT_MANAGER_VERSION: &str = "v1.16.3";

/// CRDs whose presence means cert-manager is already installed.
const CERT_MANAGER_CRDS: [&str; 6] = [
    "certificates.cert-manager.io",
    "issuers.cert-manager.io",
    "clusterissuers.cert-manager.io",
    "certificaterequests.cert-manager.io",
    "orders.acme.cert-manager.io",
    "challenges.acme.cert-manager.io",
];

pub fn cert_manager_url() -> String {
    format!(
        "https://github.com/cert-manager/cert-manager/releases/download/{}/cert-manager.yaml",
        CERT_MANAGER_VERSION
    )
}

/// Split command output into trimmed, non-empty lines.
pub fn non_empty_lines(output: &str) -> Vec<&str> {
    output.lines().map(str::trim).filter(|line| !line.is_empty()).collect()
}

impl<R: CommandRunner> Kubectl<R> {
    /// Apply the cert-manager bundle and wait for its webhook.
    ///
    /// The wait matters after a reinstall: the webhook deployment can take a
    /// while to become Available again.
    pub async fn install_cert_manager(&self, ctx: &CallContext) -> Result<(), KubeError> {
        let url = cert_manager_url();
        self.run(ctx, self.request(["apply", "-f", url.as_str()]))
            .await
            .map_err(|source| KubeError::Step { stage: "kubectl apply cert-manager", source })?;

        let wait = self.request([
            "wait",
            "deployment.apps/cert-manager-webhook",
            "--for",
            "condition=Available",
            "--namespace",
            "cert-manager",
            "--timeout",
            "5m",
        ]);
        self.run(ctx, wait)
            .await
            .map_err(|source| KubeError::Step { stage: "kubectl wait cert-manager-webhook", source })?;
        Ok(())
    }

    pub async fn uninstall_cert_manager(&self, ctx: &CallContext) -> Result<(), KubeError> {
        let url = cert_manager_url();
        self.run(ctx, self.request(["delete", "-f", url.as_str()]))
            .await
            .map_err(|source| KubeError::Step { stage: "kubectl delete cert-manager", source })?;
        Ok(())
    }

    /// Whether any cert-manager CRD is present. A failed lookup counts as
    /// "not installed".
    pub async fn cert_manager_crds_installed(&self, ctx: &CallContext) -> bool {
        let output = match self.run(ctx, self.request(["get", "crds"])).await {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!(error = %e, "listing CRDs failed");
                return false;
            }
        };
        let lines = non_empty_lines(&output);
        CERT_MANAGER_CRDS.iter().any(|crd| lines.iter().any(|line| line.contains(crd)))
    }
}

/// Runs `kind` against one cluster.
#[derive(Debug, Clone)]
pub struct Kind<R = ProcessRunner> {
    runner: R,
    binary: String,
    cluster: String,
    log: Log,
}

impl Kind<ProcessRunner> {
    /// Real processes; binary and cluster from `KH_KIND` / `KIND_CLUSTER`.
    pub fn from_env() -> Self {
        Self::with_runner(ProcessRunner)
            .binary(crate::env::kind_binary())
            .cluster(crate::env::kind_cluster())
    }
}

impl<R: CommandRunner> Kind<R> {
    pub fn with_runner(runner: R) -> Self {
        Self {
            runner,
            binary: crate::env::DEFAULT_KIND.to_string(),
            cluster: crate::env::DEFAULT_KIND_CLUSTER.to_string(),
            log: Log::none(),
        }
    }

    pub fn binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = cluster.into();
        self
    }

    pub fn log(mut self, log: Log) -> Self {
        self.log = log;
        self
    }

    pub fn cluster_name(&self) -> &str {
        &self.cluster
    }

    /// `kind load docker-image <image> --name <cluster>`
    pub async fn load_image(&self, ctx: &CallContext, image: &str) -> Result<(), KubeError> {
        let req = ExecRequest::new(self.binary.as_str()).args([
            "load",
            "docker-image",
            image,
            "--name",
            self.cluster.as_str(),
        ]);
        self.runner
            .run(ctx, &self.log, req)
            .await
            .map_err(|source| KubeError::Step { stage: "kind load docker-image", source })?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "cluster_tests.rs"]
mod tests;
