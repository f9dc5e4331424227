// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Idempotent ClusterRoleBinding apply.
//!
//! The manifest is piped to `kubectl apply -f -`, so repeating the call with
//! the same inputs leaves the cluster unchanged and does not fail on an
//! existing binding. No retry happens here.

use k8s_openapi::api::rbac::v1::{ClusterRoleBinding, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::context::CallContext;
use crate::kubectl::{KubeError, Kubectl};
use crate::runner::CommandRunner;

const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";

/// Binds one ServiceAccount to a ClusterRole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterRoleBindingSpec {
    pub name: String,
    pub cluster_role: String,
    pub namespace: String,
    pub service_account: String,
}

impl ClusterRoleBindingSpec {
    pub fn new(
        name: impl Into<String>,
        cluster_role: impl Into<String>,
        namespace: impl Into<String>,
        service_account: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            cluster_role: cluster_role.into(),
            namespace: namespace.into(),
            service_account: service_account.into(),
        }
    }

    pub fn to_binding(&self) -> ClusterRoleBinding {
        ClusterRoleBinding {
            metadata: ObjectMeta { name: Some(self.name.clone()), ..Default::default() },
            role_ref: RoleRef {
                api_group: RBAC_API_GROUP.to_string(),
                kind: "ClusterRole".to_string(),
                name: self.cluster_role.clone(),
            },
            subjects: Some(vec![Subject {
                kind: "ServiceAccount".to_string(),
                name: self.service_account.clone(),
                namespace: Some(self.namespace.clone()),
                ..Default::default()
            }]),
        }
    }

    /// JSON manifest for `kubectl apply -f -`.
    pub fn manifest(&self) -> Result<String, KubeError> {
        serde_json::to_string_pretty(&self.to_binding()).map_err(KubeError::Manifest)
    }
}

impl<R: CommandRunner> Kubectl<R> {
    /// Create or update the binding. Safe to call repeatedly.
    pub async fn apply_cluster_role_binding(
        &self,
        ctx: &CallContext,
        spec: &ClusterRoleBindingSpec,
    ) -> Result<(), KubeError> {
        self.logger().logf(format_args!(
            "apply ClusterRoleBinding name={:?} role={:?} sa={}/{}",
            spec.name, spec.cluster_role, spec.namespace, spec.service_account
        ));
        tracing::info!(
            name = %spec.name,
            role = %spec.cluster_role,
            namespace = %spec.namespace,
            service_account = %spec.service_account,
            "applying cluster role binding"
        );

        let manifest = spec.manifest()?;
        let req = self.request(["apply", "-f", "-"]).stdin(manifest);

        match self.run(ctx, req).await {
            Ok(stdout) => {
                self.log_output(&stdout);
                Ok(())
            }
            Err(e) => {
                self.log_output(e.stdout());
                Err(KubeError::Apply(e))
            }
        }
    }
}

#[cfg(test)]
#[path = "rbac_tests.rs"]
mod tests;
