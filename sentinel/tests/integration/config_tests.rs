use std::fs;

use crate::common::{assert_contains, init_test_logging, sentinel};
use tempfile::TempDir;

fn check(toml: &str) -> std::process::Output {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("sentinel.toml");
    fs::write(&path, toml).expect("Failed to write policy");
    sentinel()
        .arg("check-config")
        .arg(&path)
        .output()
        .expect("Failed to run sentinel")
}

#[test]
fn test_sample_policy_validates() {
    init_test_logging();
    crate::test_log!("TEST START: test_sample_policy_validates");

    let output = check(include_str!("../../../conf/sentinel.toml"));
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_contains(&stdout, "Policy OK: ");
    assert_contains(&stdout, "restricted paths: 4");
    assert_contains(&stdout, "branching pairs: 4");
    assert_contains(&stdout, "relocation pairs: 4");

    crate::test_log!("TEST PASS: test_sample_policy_validates");
}

#[test]
fn test_invalid_glob_is_reported() {
    init_test_logging();
    crate::test_log!("TEST START: test_invalid_glob_is_reported");

    let output = check("branching_paths = [[\"production/\", \"branches/b[0-9/\"]]\n");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_contains(&stderr, "[ERROR]");
    assert_contains(&stderr, "branching_paths");

    crate::test_log!("TEST PASS: test_invalid_glob_is_reported");
}

#[test]
fn test_wildcard_prefix_is_rejected() {
    init_test_logging();
    crate::test_log!("TEST START: test_wildcard_prefix_is_rejected");

    let output = check("[[no_direct_commits]]\npath = \"branches/*/\"\n");
    assert_eq!(output.status.code(), Some(1));
    assert_contains(
        &String::from_utf8_lossy(&output.stderr),
        "must not contain wildcards",
    );

    crate::test_log!("TEST PASS: test_wildcard_prefix_is_rejected");
}

#[test]
fn test_unknown_key_is_rejected() {
    init_test_logging();
    crate::test_log!("TEST START: test_unknown_key_is_rejected");

    let output = check("no_direct_commit = []\n");
    assert_eq!(output.status.code(), Some(1));
    assert_contains(&String::from_utf8_lossy(&output.stderr), "Failed to parse policy file");

    crate::test_log!("TEST PASS: test_unknown_key_is_rejected");
}
