// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kh` - drive a cluster through kubectl for operator test setups

mod commands;
mod exit_error;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use kh_kubeutil::{CallContext, Kubectl, Log, TracingSink};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::{cert_manager, kind, rbac, token};
use exit_error::ExitError;

#[derive(Parser)]
#[command(
    name = "kh",
    version = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH")),
    about = "Cluster setup helpers for operator end-to-end tests"
)]
pub(crate) struct Cli {
    /// kubectl binary to run (default: KH_KUBECTL or "kubectl")
    #[arg(long, global = true)]
    kubectl: Option<String>,

    /// Echo each command and its output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// ClusterRoleBinding management
    Rbac(rbac::RbacArgs),
    /// Print a token for a ServiceAccount, polling until one is issued
    Token(token::TokenArgs),
    /// cert-manager install, uninstall and status
    CertManager(cert_manager::CertManagerArgs),
    /// kind cluster helpers
    Kind(kind::KindArgs),
}

impl Cli {
    fn log(&self) -> Log {
        if self.verbose {
            Log::new(Arc::new(TracingSink))
        } else {
            Log::none()
        }
    }

    fn kubectl(&self) -> Kubectl {
        let kubectl = Kubectl::from_env().log(self.log());
        match self.kubectl {
            Some(ref binary) => kubectl.binary(binary.as_str()),
            None => kubectl,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        if let Some(exit) = e.downcast_ref::<ExitError>() {
            if !exit.message.is_empty() {
                eprintln!("error: {}", exit.message);
            }
            std::process::exit(exit.code);
        }
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = CallContext::new();
    let interrupt = ctx.token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, cancelling");
            interrupt.cancel();
        }
    });

    let log = cli.log();
    let kubectl = cli.kubectl();
    match cli.command {
        Commands::Rbac(args) => rbac::handle(args.command, &ctx, &kubectl).await,
        Commands::Token(args) => token::handle(args, &ctx, &kubectl).await,
        Commands::CertManager(args) => cert_manager::handle(args.command, &ctx, &kubectl).await,
        Commands::Kind(args) => kind::handle(args.command, &ctx, &log).await,
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
