// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kh rbac` - access-control bindings

use anyhow::Result;
use clap::{Args, Subcommand};
use kh_kubeutil::{CallContext, ClusterRoleBindingSpec, Kubectl};

use super::operation_failed;

#[derive(Args)]
pub struct RbacArgs {
    #[command(subcommand)]
    pub command: RbacCommand,
}

#[derive(Subcommand)]
pub enum RbacCommand {
    /// Bind a ServiceAccount to a ClusterRole (idempotent)
    Apply {
        /// ClusterRoleBinding name
        #[arg(long)]
        name: String,
        /// ClusterRole to bind
        #[arg(long)]
        role: String,
        /// ServiceAccount namespace
        #[arg(long, short = 'n')]
        namespace: String,
        /// ServiceAccount name
        #[arg(long)]
        service_account: String,
    },
}

pub async fn handle(command: RbacCommand, ctx: &CallContext, kubectl: &Kubectl) -> Result<()> {
    match command {
        RbacCommand::Apply { name, role, namespace, service_account } => {
            let spec = ClusterRoleBindingSpec::new(name, role, namespace, service_account);
            let ctx = ctx.child().with_timeout(kh_kubeutil::env::apply_timeout());
            kubectl
                .apply_cluster_role_binding(&ctx, &spec)
                .await
                .map_err(|e| operation_failed(&ctx, e))?;
            println!("clusterrolebinding/{} applied", spec.name);
            Ok(())
        }
    }
}
