// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kh kind` - local kind cluster helpers

use anyhow::Result;
use clap::{Args, Subcommand};
use kh_kubeutil::cluster::Kind;
use kh_kubeutil::{CallContext, Log};

use super::operation_failed;

#[derive(Args)]
pub struct KindArgs {
    #[command(subcommand)]
    pub command: KindCommand,
}

#[derive(Subcommand)]
pub enum KindCommand {
    /// Load a local docker image into the kind cluster
    Load {
        /// Image reference, e.g. example.com/my-operator:v0.0.1
        image: String,
        /// Cluster name (default: KIND_CLUSTER or "kind")
        #[arg(long)]
        cluster: Option<String>,
    },
}

pub async fn handle(command: KindCommand, ctx: &CallContext, log: &Log) -> Result<()> {
    match command {
        KindCommand::Load { image, cluster } => {
            let mut kind = Kind::from_env().log(log.clone());
            if let Some(cluster) = cluster {
                kind = kind.cluster(cluster);
            }
            let ctx = ctx.child().with_timeout(kh_kubeutil::env::apply_timeout());
            kind.load_image(&ctx, &image).await.map_err(|e| operation_failed(&ctx, e))?;
            println!("loaded {} into kind cluster {}", image, kind.cluster_name());
            Ok(())
        }
    }
}
