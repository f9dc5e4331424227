// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kh cert-manager` specs

use crate::prelude::*;

const CRDS_PRESENT: &str = "echo 'NAME CREATED AT'; echo 'certificates.cert-manager.io 2026-10-19T08:00:00Z'";

#[test]
fn status_reports_installed() {
    let kubectl = FakeKubectl::new(CRDS_PRESENT);

    kubectl.kh().args(&["cert-manager", "status"]).passes().stdout_eq("installed\n");

    assert_eq!(kubectl.calls(), ["get crds"]);
}

#[test]
fn status_reports_missing_with_exit_code() {
    let kubectl = FakeKubectl::new("echo 'NAME CREATED AT'");

    kubectl
        .kh()
        .args(&["cert-manager", "status"])
        .fails()
        .code_is(1)
        .stdout_eq("not installed\n");
}

#[test]
fn install_applies_then_waits() {
    let kubectl = FakeKubectl::new("case \"$1\" in get) echo 'NAME CREATED AT';; esac");

    kubectl.kh().args(&["cert-manager", "install"]).passes().stdout_has("v1.16.3 installed");

    let calls = kubectl.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], "get crds");
    assert!(calls[1].starts_with("apply -f https://github.com/cert-manager/"), "{:?}", calls);
    assert!(calls[2].starts_with("wait deployment.apps/cert-manager-webhook"), "{:?}", calls);
}

#[test]
fn install_skips_when_already_present() {
    let kubectl = FakeKubectl::new(CRDS_PRESENT);

    kubectl.kh().args(&["cert-manager", "install"]).passes().stdout_has("already installed");

    assert_eq!(kubectl.calls(), ["get crds"]);
}
