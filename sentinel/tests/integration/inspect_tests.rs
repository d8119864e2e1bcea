#![cfg(unix)]

use crate::common::{FakeRepo, assert_contains, init_test_logging};

#[test]
fn test_inspect_text_output() {
    init_test_logging();
    crate::test_log!("TEST START: test_inspect_text_output");

    let repo = FakeRepo::new();
    repo.set_info("bob", "Archive feature f3");
    repo.set_changed(
        "D   branches/feature/f3/\nA + branches/feature/merged/f3/\n    (from branches/feature/f3/:r80)\n",
    );

    let output = repo.run("inspect", &[]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_contains(&stdout, "Archive feature f3\n");
    assert_contains(&stdout, "branches/feature/f3/ (deleted)");
    assert_contains(
        &stdout,
        "branches/feature/merged/f3/ (copied from branches/feature/f3/@80)",
    );
    assert_contains(
        &stdout,
        "Operation: Move from ^/branches/feature/f3/ to ^/branches/feature/merged/f3/",
    );

    crate::test_log!("TEST PASS: test_inspect_text_output");
}

#[test]
fn test_inspect_json_output() {
    init_test_logging();
    crate::test_log!("TEST START: test_inspect_json_output");

    let repo = FakeRepo::new();
    repo.set_changed("U   trunk/a.c\n");

    let output = repo.run("inspect", &["--json"]);
    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("inspect --json must print JSON");
    assert_eq!(report["transaction"]["author"], "alice");
    assert_eq!(
        report["transaction"]["changes"]["trunk/a.c"]["status"],
        "updated"
    );
    assert!(report["operation"].is_null());

    crate::test_log!("TEST PASS: test_inspect_json_output");
}

#[test]
fn test_inspect_revision_mode() {
    init_test_logging();
    crate::test_log!("TEST START: test_inspect_revision_mode");

    let repo = FakeRepo::new();
    repo.set_changed("U   trunk/a.c\n");

    let output = crate::common::sentinel()
        .arg("inspect")
        .arg(repo.path())
        .arg("17")
        .arg("--revision")
        .arg("--svnlook")
        .arg(&repo.svnlook)
        .output()
        .expect("Failed to run sentinel");
    assert!(output.status.success());
    assert_contains(&repo.calls(), "changed");
    assert_contains(&repo.calls(), "--revision 17");

    crate::test_log!("TEST PASS: test_inspect_revision_mode");
}
