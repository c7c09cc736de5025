//! Tests for `ferry provision` and `ferry teardown`.

use crate::support::*;

#[test]
fn test_provision_creates_then_reuses() {
    let t = Test::with_secret();

    let first = t.provision();
    assert_success(&first);
    assert_stdout_contains(&first, "created");

    let second = t.provision();
    assert_success(&second);
    assert_stdout_contains(&second, "unchanged");
}

#[test]
fn test_provision_redacts_value() {
    let t = Test::with_secret();

    let output = t.provision();
    assert_success(&output);
    assert_stdout_contains(&output, "<sensitive>");

    let value = t.stored_value("ingestion/api-token");
    assert_eq!(value.len(), 40);
    assert_stdout_excludes(&output, &value);
}

#[test]
fn test_reveal_prints_only_value() {
    let t = Test::with_secret();
    assert_success(&t.provision());

    let output = t.reveal();
    assert_success(&output);
    assert_eq!(
        stdout(&output).trim_end(),
        t.stored_value("ingestion/api-token")
    );
}

#[test]
fn test_reveal_is_stable_across_runs() {
    let t = Test::with_secret();

    let first = stdout(&t.reveal());
    let second = stdout(&t.reveal());
    assert_eq!(first, second);
}

#[test]
fn test_changed_length_rotates() {
    let t = Test::with_secret();
    let before = stdout(&t.reveal());

    t.write(
        "ferry.toml",
        &SECRET_CONFIG.replace("length = 40", "length = 24"),
    );
    let output = t.provision();
    assert_success(&output);
    assert_stdout_contains(&output, "rotated");

    let after = stdout(&t.reveal());
    assert_ne!(before, after);
    assert_eq!(after.trim_end().len(), 24);
}

#[test]
fn test_invalid_length_fails_without_writing() {
    let t = Test::new();
    t.write(
        "ferry.toml",
        &SECRET_CONFIG.replace("length = 40", "length = 0"),
    );

    let output = t.provision();
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid token length");
    assert!(!t.path(".ferry/secrets.json").exists());
}

#[test]
fn test_teardown_removes_secret() {
    let t = Test::with_secret();
    let before = stdout(&t.reveal());

    let output = t.teardown();
    assert_success(&output);
    assert_stdout_contains(&output, "deleted");

    let output = t.provision();
    assert_success(&output);
    assert_stdout_contains(&output, "created");
    assert_ne!(stdout(&t.reveal()), before);
}

#[test]
fn test_teardown_with_recovery_window_blocks_reprovision() {
    let t = Test::new();
    t.write(
        "ferry.toml",
        &SECRET_CONFIG.replace("recovery_window_days = 0", "recovery_window_days = 7"),
    );
    assert_success(&t.provision());

    let output = t.teardown();
    assert_success(&output);
    assert_stdout_contains(&output, "7 days");

    let output = t.provision();
    assert_failure(&output);
    assert_stderr_contains(&output, "scheduled for deletion");
}

#[test]
fn test_teardown_missing_secret_warns() {
    let t = Test::with_secret();

    let output = t.teardown();
    assert_success(&output);
    assert_stderr_contains(&output, "nothing to delete");
}
