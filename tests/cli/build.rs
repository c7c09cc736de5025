//! Tests for `ferry build`.

#![cfg(unix)]

use crate::support::*;

#[test]
fn test_build_prints_artifact_path() {
    let t = Test::with_project("foo==1.0\n");

    let output = t.build();
    assert_success(&output);

    let printed = stdout(&output);
    assert_eq!(printed.lines().count(), 1);
    assert!(printed.trim_end().ends_with("out.zip"));
    assert!(t.path("out.zip").is_file());
}

#[test]
fn test_build_archive_layout() {
    let t = Test::with_project("foo==1.0\n");
    assert_success(&t.build());

    let entries = t.zip_entries("out.zip");
    assert!(entries.contains(&"index.py".to_string()));
    assert!(entries.contains(&"events/".to_string()));
    assert!(entries.contains(&"events/s3.py".to_string()));
    assert!(entries.contains(&"foo/".to_string()));
    assert!(entries.contains(&"foo/__init__.py".to_string()));
    assert!(entries.iter().all(|e| !e.starts_with("package")));
    assert!(!t.path("lambda/package").exists());
}

#[test]
fn test_build_propagates_installer_exit_code() {
    let t = Test::with_project("foo==1.0\nunavailable==2.0\n");

    let output = t.build();
    assert_eq!(output.status.code(), Some(3));
    assert_stderr_contains(&output, "No matching distribution");
    assert!(stdout(&output).is_empty());
    assert!(!t.path("lambda/package").exists());
    assert!(!t.path("out.zip").exists());
}

#[test]
fn test_build_rejects_foreign_platform() {
    let t = Test::with_project("foo==1.0\n");

    let output = t
        .cmd()
        .arg("build")
        .env("FAKE_PIP_TAG", "cp312-cp312-win_amd64")
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "linux_x86_64");
    assert!(!t.path("lambda/package").exists());
    assert!(!t.path("out.zip").exists());
}

#[test]
fn test_build_without_section_hints() {
    let t = Test::with_secret();

    let output = t.build();
    assert_failure(&output);
    assert_stderr_contains(&output, "no [build] section");
}
