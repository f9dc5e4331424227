// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kh token` specs

use crate::prelude::*;

const TOKEN_ARGS: [&str; 5] =
    ["token", "--namespace", "operator-system", "--service-account", "controller-manager"];

#[test]
fn prints_only_the_token() {
    let kubectl = FakeKubectl::new(r#"echo '{"status":{"token":"abc123"}}'"#);

    kubectl.kh().args(&TOKEN_ARGS).passes().stdout_eq("abc123\n");

    assert_eq!(
        kubectl.calls(),
        ["create --raw /api/v1/namespaces/operator-system/serviceaccounts/controller-manager/token -f -"]
    );
    let body: serde_json::Value = serde_json::from_str(kubectl.stdin_log().trim()).unwrap();
    assert_eq!(body["kind"], "TokenRequest");
    assert_eq!(body["apiVersion"], "authentication.k8s.io/v1");
}

#[test]
fn retries_until_token_is_issued() {
    let kubectl = FakeKubectl::new(
        "attempts=\"$(dirname \"$0\")/attempts\"\n\
         n=$(cat \"$attempts\" 2>/dev/null || echo 0); n=$((n+1)); echo $n > \"$attempts\"\n\
         if [ $n -lt 2 ]; then echo 'serviceaccounts \"controller-manager\" not found' >&2; exit 1; fi\n\
         echo '{\"status\":{\"token\":\"late-token\"}}'",
    );

    kubectl.kh().args(&TOKEN_ARGS).passes().stdout_eq("late-token\n");

    assert_eq!(kubectl.calls().len(), 2);
}

#[test]
fn gives_up_at_deadline_with_timeout_code() {
    let kubectl = FakeKubectl::new("echo 'not found' >&2; exit 1");

    kubectl
        .kh()
        .args(&TOKEN_ARGS)
        .args(&["--timeout-ms", "1000"])
        .fails()
        .code_is(124)
        .stderr_has("token request failed (ns=operator-system sa=controller-manager)")
        .stderr_has("not found");

    assert_eq!(kubectl.calls().len(), 1);
}

#[test]
fn timeout_from_environment() {
    let kubectl = FakeKubectl::new(r#"echo '{"status":{"token":""}}'"#);

    kubectl
        .kh()
        .env("KH_TOKEN_TIMEOUT_MS", "1000")
        .args(&TOKEN_ARGS)
        .fails()
        .code_is(124)
        .stderr_has("token is empty");
}
