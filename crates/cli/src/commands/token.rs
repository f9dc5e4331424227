// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kh token` - request a ServiceAccount token
//!
//! Prints only the token on stdout so the output can be captured directly.

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use kh_kubeutil::{CallContext, Kubectl};

use super::operation_failed;

#[derive(Args)]
pub struct TokenArgs {
    /// ServiceAccount namespace
    #[arg(long, short = 'n')]
    pub namespace: String,

    /// ServiceAccount name
    #[arg(long)]
    pub service_account: String,

    /// Give up after this many milliseconds (default: KH_TOKEN_TIMEOUT_MS or 2m)
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

pub async fn handle(args: TokenArgs, ctx: &CallContext, kubectl: &Kubectl) -> Result<()> {
    let timeout =
        args.timeout_ms.map(Duration::from_millis).unwrap_or_else(kh_kubeutil::env::token_timeout);
    let ctx = ctx.child().with_timeout(timeout);

    let token = kubectl
        .service_account_token(&ctx, &args.namespace, &args.service_account)
        .await
        .map_err(|e| operation_failed(&ctx, e))?;
    println!("{}", token.as_str());
    Ok(())
}
