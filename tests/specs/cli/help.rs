// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI help output specs

use crate::prelude::*;

#[test]
fn kh_help_lists_commands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("Usage:")
        .stdout_has("rbac")
        .stdout_has("token")
        .stdout_has("cert-manager")
        .stdout_has("kind");
}

#[test]
fn kh_rbac_apply_help_shows_flags() {
    cli()
        .args(&["rbac", "apply", "--help"])
        .passes()
        .stdout_has("--name")
        .stdout_has("--role")
        .stdout_has("--service-account");
}

#[test]
fn kh_version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.2");
}

#[test]
fn kh_no_args_is_usage_error() {
    cli().fails().code_is(2).stderr_has("Usage:");
}
