// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kh cert-manager` - install or inspect cert-manager

use anyhow::Result;
use clap::{Args, Subcommand};
use kh_kubeutil::{CallContext, Kubectl};

use super::operation_failed;
use crate::exit_error::ExitError;

#[derive(Args)]
pub struct CertManagerArgs {
    #[command(subcommand)]
    pub command: CertManagerCommand,
}

#[derive(Subcommand)]
pub enum CertManagerCommand {
    /// Apply the pinned cert-manager bundle and wait for its webhook
    Install,
    /// Delete the cert-manager bundle
    Uninstall,
    /// Report whether cert-manager CRDs are present (exit 1 if not)
    Status,
}

pub async fn handle(
    command: CertManagerCommand,
    ctx: &CallContext,
    kubectl: &Kubectl,
) -> Result<()> {
    let ctx = ctx.child().with_timeout(kh_kubeutil::env::apply_timeout());
    match command {
        CertManagerCommand::Install => {
            if kubectl.cert_manager_crds_installed(&ctx).await {
                println!("cert-manager already installed");
                return Ok(());
            }
            kubectl.install_cert_manager(&ctx).await.map_err(|e| operation_failed(&ctx, e))?;
            println!("cert-manager {} installed", kh_kubeutil::cluster::CERT_MANAGER_VERSION);
        }
        CertManagerCommand::Uninstall => {
            kubectl.uninstall_cert_manager(&ctx).await.map_err(|e| operation_failed(&ctx, e))?;
            println!("cert-manager uninstalled");
        }
        CertManagerCommand::Status => {
            if kubectl.cert_manager_crds_installed(&ctx).await {
                println!("installed");
            } else {
                println!("not installed");
                return Err(ExitError::silent(1).into());
            }
        }
    }
    Ok(())
}
