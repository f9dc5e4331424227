// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kh rbac apply` specs

use crate::prelude::*;

const APPLY_ARGS: [&str; 10] = [
    "rbac",
    "apply",
    "--name",
    "metrics-reader-rolebinding",
    "--role",
    "metrics-reader",
    "--namespace",
    "operator-system",
    "--service-account",
    "controller-manager",
];

#[test]
fn apply_pipes_binding_manifest_to_kubectl() {
    let kubectl = FakeKubectl::new(
        "echo 'clusterrolebinding.rbac.authorization.k8s.io/metrics-reader-rolebinding created'",
    );

    kubectl.kh().args(&APPLY_ARGS).passes().stdout_has("metrics-reader-rolebinding applied");

    assert_eq!(kubectl.calls(), ["apply -f -"]);
    let manifest: serde_json::Value = serde_json::from_str(kubectl.stdin_log().trim()).unwrap();
    assert_eq!(manifest["kind"], "ClusterRoleBinding");
    assert_eq!(manifest["metadata"]["name"], "metrics-reader-rolebinding");
    assert_eq!(manifest["roleRef"]["name"], "metrics-reader");
    assert_eq!(manifest["subjects"][0]["kind"], "ServiceAccount");
    assert_eq!(manifest["subjects"][0]["name"], "controller-manager");
    assert_eq!(manifest["subjects"][0]["namespace"], "operator-system");
}

#[test]
fn apply_twice_succeeds_both_times() {
    let kubectl = FakeKubectl::new("echo configured");

    kubectl.kh().args(&APPLY_ARGS).passes();
    kubectl.kh().args(&APPLY_ARGS).passes();

    assert_eq!(kubectl.calls().len(), 2);
}

#[test]
fn apply_failure_reports_kubectl_stderr() {
    let kubectl = FakeKubectl::new("echo 'Error from server (Forbidden)' >&2; exit 1");

    kubectl
        .kh()
        .args(&APPLY_ARGS)
        .fails()
        .code_is(1)
        .stderr_has("kubectl apply clusterrolebinding failed")
        .stderr_has("Forbidden");

    assert_eq!(kubectl.calls().len(), 1, "apply is not retried");
}

#[test]
fn kubectl_flag_overrides_environment() {
    let kubectl = FakeKubectl::new("echo ok");

    cli()
        .env("KH_KUBECTL", "/nonexistent/kubectl")
        .args(&APPLY_ARGS)
        .args(&["--kubectl", kubectl.path().to_str().unwrap()])
        .passes();

    assert_eq!(kubectl.calls(), ["apply -f -"]);
}

#[test]
fn verbose_echoes_commands() {
    let kubectl = FakeKubectl::new("echo created");

    kubectl
        .kh()
        .args(&APPLY_ARGS)
        .args(&["-v"])
        .passes()
        .stderr_has("running:")
        .stderr_has("apply ClusterRoleBinding");
}

#[test]
fn missing_kubectl_binary_fails() {
    cli()
        .env("KH_KUBECTL", "/nonexistent/kubectl")
        .args(&APPLY_ARGS)
        .fails()
        .code_is(1)
        .stderr_has("kubectl apply clusterrolebinding failed");
}
