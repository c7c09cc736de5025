//! Tests for error handling and CLI flags.

use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    let t = Test::new();

    let output = t.cmd().arg("--help").output().unwrap();
    assert_success(&output);
    let out = stdout(&output);
    for command in ["init", "provision", "teardown", "build", "completions"] {
        assert!(out.contains(command), "help missing {command}");
    }
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();

    t.cmd()
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_missing_config_hints_init() {
    let t = Test::new();

    let output = t.provision();
    assert_failure(&output);
    assert_eq!(output.status.code(), Some(1));
    assert_stderr_contains(&output, "config file not found");
    assert_stderr_contains(&output, "ferry init");
}

#[test]
fn test_config_flag_and_env() {
    let t = Test::new();
    t.write("conf/custom.toml", SECRET_CONFIG);

    let output = t
        .cmd()
        .args(["--config", "conf/custom.toml", "provision"])
        .output()
        .unwrap();
    assert_success(&output);
    // Store path resolves against the config file's directory
    assert!(t.path("conf/.ferry/secrets.json").exists());

    let output = t
        .cmd()
        .env("FERRY_CONFIG", "conf/custom.toml")
        .arg("provision")
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "unchanged");
}

#[test]
fn test_malformed_config_fails() {
    let t = Test::new();
    t.write("ferry.toml", "[secret\nname = ");

    let output = t.provision();
    assert_failure(&output);
    assert_stderr_contains(&output, "failed to parse config");
}

#[test]
fn test_unknown_backend_fails() {
    let t = Test::new();
    t.write(
        "ferry.toml",
        &SECRET_CONFIG.replace("backend = \"file\"", "backend = \"vault\""),
    );

    assert_failure(&t.provision());
}

#[test]
fn test_completions_generate() {
    let t = Test::new();

    for shell in ["bash", "zsh", "fish", "power-shell"] {
        let output = t.cmd().args(["completions", shell]).output().unwrap();
        assert_success(&output);
        assert_stdout_contains(&output, "ferry");
    }
}
