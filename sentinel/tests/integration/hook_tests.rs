#![cfg(unix)]

use crate::common::{FakeRepo, assert_contains, assert_not_contains, init_test_logging, sentinel};

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_unrestricted_commit_is_silent() {
    init_test_logging();
    crate::test_log!("TEST START: test_unrestricted_commit_is_silent");

    let repo = FakeRepo::new();
    repo.set_changed("U   trunk/src/main.c\nA   trunk/README\n");

    let output = repo.run("pre-commit", &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).is_empty(), "stderr: {}", stderr(&output));

    crate::test_log!("TEST PASS: test_unrestricted_commit_is_silent");
}

#[test]
fn test_direct_commit_to_production_is_rejected() {
    init_test_logging();
    crate::test_log!("TEST START: test_direct_commit_to_production_is_rejected");

    let repo = FakeRepo::new();
    repo.set_changed("U   production/src/main.c\n");

    let output = repo.run("pre-commit", &[]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert_contains(&err, "SVN Sentinel : COMMIT REJECTED");
    assert_contains(&err, "!! Direct commits to production/ are not allowed");
    assert_contains(&err, "Changed path: production/src/main.c");
    assert_contains(&err, "Restricted path: production/");
    assert_contains(&err, " - Merge from ^/development/ to ^/production/");
    assert!(stdout(&output).is_empty());

    crate::test_log!("TEST PASS: test_direct_commit_to_production_is_rejected");
}

#[test]
fn test_feature_branch_commit_is_allowed() {
    init_test_logging();
    crate::test_log!("TEST START: test_feature_branch_commit_is_allowed");

    let repo = FakeRepo::new();
    repo.set_changed("U   branches/feature/f7/src/lib.c\n_U  branches/feature/f7/\n");

    let output = repo.run("pre-commit", &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    crate::test_log!("TEST PASS: test_feature_branch_commit_is_allowed");
}

#[test]
fn test_whitelisted_branch_is_allowed() {
    init_test_logging();
    crate::test_log!("TEST START: test_whitelisted_branch_is_allowed");

    let repo = FakeRepo::new();
    repo.set_changed("A + branches/bugfix/b12/\n    (from production/:r200)\n");

    let output = repo.run("pre-commit", &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_not_contains(&repo.calls(), "propget");

    crate::test_log!("TEST PASS: test_whitelisted_branch_is_allowed");
}

#[test]
fn test_unlisted_tag_is_rejected() {
    init_test_logging();
    crate::test_log!("TEST START: test_unlisted_tag_is_rejected");

    let repo = FakeRepo::new();
    repo.set_changed("A + tags/releases/2.0/\n    (from development/:r201)\n");

    let output = repo.run("pre-commit", &[]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert_contains(
        &err,
        "!! Branching from ^/development/ to ^/tags/releases/2.0/ is not allowed",
    );
    assert_contains(&err, "Changed path: tags/releases/2.0/");
    assert_contains(&err, " - Branching from ^/production/ to ^/tags/releases/*/");

    crate::test_log!("TEST PASS: test_unlisted_tag_is_rejected");
}

#[test]
fn test_merge_into_production() {
    init_test_logging();
    crate::test_log!("TEST START: test_merge_into_production");

    let repo = FakeRepo::new();
    repo.set_changed("_U  production/\nU   production/src/main.c\n");
    repo.set_merge_info("production/", "previous", "/development:10-14\n");
    repo.set_merge_info("production/", "current", "/development:10-14,20-31\n");

    let output = repo.run("pre-commit", &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let calls = repo.calls();
    assert_contains(&calls, "propget");
    assert_contains(&calls, "svn:mergeinfo production/");

    // Same change set, but merged from a feature branch.
    repo.set_merge_info("production/", "current", "/branches/feature/f3:10-18\n");
    repo.remove("mergeinfo-previous-production_");
    let output = repo.run("pre-commit", &[]);
    assert_eq!(output.status.code(), Some(1));
    assert_contains(
        &stderr(&output),
        "!! Merge from ^/branches/feature/f3/ to ^/production/ (up to r18) is not allowed",
    );

    crate::test_log!("TEST PASS: test_merge_into_production");
}

#[test]
fn test_bypass_prefix_skips_checks() {
    init_test_logging();
    crate::test_log!("TEST START: test_bypass_prefix_skips_checks");

    let repo = FakeRepo::new();
    repo.set_changed("_U  production/\nU   production/src/main.c\n");
    repo.set_info("lsc", "<Maintenance> restore build script");

    let output = repo.run("pre-commit", &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_not_contains(&repo.calls(), "propget");

    crate::test_log!("TEST PASS: test_bypass_prefix_skips_checks");
}

#[test]
fn test_svnlook_failure_is_fatal() {
    init_test_logging();
    crate::test_log!("TEST START: test_svnlook_failure_is_fatal");

    let repo = FakeRepo::new();
    repo.set_changed("U   trunk/a.c\n");
    repo.remove("info.txt");

    let output = repo.run("pre-commit", &[]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert_contains(&err, "[ERROR]");
    assert_contains(&err, "svnlook info");

    crate::test_log!("TEST PASS: test_svnlook_failure_is_fatal");
}

#[test]
fn test_malformed_listing_is_fatal() {
    init_test_logging();
    crate::test_log!("TEST START: test_malformed_listing_is_fatal");

    let repo = FakeRepo::new();
    repo.set_changed("X   trunk/a.c\n");

    let output = repo.run("pre-commit", &[]);
    assert_eq!(output.status.code(), Some(1));
    assert_contains(&stderr(&output), "[ERROR]");
    assert_contains(&stderr(&output), "Malformed change record");

    crate::test_log!("TEST PASS: test_malformed_listing_is_fatal");
}

#[test]
fn test_missing_policy_fails_closed() {
    init_test_logging();
    crate::test_log!("TEST START: test_missing_policy_fails_closed");

    let repo = FakeRepo::new();
    repo.set_changed("U   trunk/a.c\n");
    repo.remove("conf/sentinel.toml");

    let output = repo.run("pre-commit", &[]);
    assert_eq!(output.status.code(), Some(1));
    assert_contains(&stderr(&output), "[ERROR] Failed to load policy");

    crate::test_log!("TEST PASS: test_missing_policy_fails_closed");
}

#[test]
fn test_explicit_config_flag() {
    init_test_logging();
    crate::test_log!("TEST START: test_explicit_config_flag");

    let repo = FakeRepo::new();
    repo.set_changed("U   trunk/a.c\n");
    let policy = repo.path().join("strict.toml");
    std::fs::write(&policy, "[[no_direct_commits]]\npath = \"trunk\"\n")
        .expect("Failed to write policy");

    let output = repo.run("pre-commit", &["--config", policy.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert_contains(&stderr(&output), "Direct commits to trunk/ are not allowed");

    crate::test_log!("TEST PASS: test_explicit_config_flag");
}

#[test]
fn test_start_commit_capabilities() {
    init_test_logging();
    crate::test_log!("TEST START: test_start_commit_capabilities");

    let ok = sentinel()
        .args(["start-commit", "/svn/repo", "alice", "depth:mergeinfo:log-revprops"])
        .output()
        .expect("Failed to run sentinel");
    assert!(ok.status.success());
    assert!(stderr(&ok).is_empty());

    let old = sentinel()
        .args(["start-commit", "/svn/repo", "alice", "depth:log-revprops"])
        .output()
        .expect("Failed to run sentinel");
    assert_eq!(old.status.code(), Some(1));
    assert_contains(&stderr(&old), "upgrade");

    crate::test_log!("TEST PASS: test_start_commit_capabilities");
}
