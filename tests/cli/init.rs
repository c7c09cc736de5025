//! Tests for `ferry init`.

use crate::support::*;

#[test]
fn test_init_writes_template() {
    let t = Test::new();

    let output = t.init();
    assert_success(&output);
    assert_stdout_contains(&output, "wrote");

    let config = t.read("ferry.toml");
    assert!(config.contains("[store]"));
    assert!(config.contains("[secret]"));
    assert!(config.contains("[build]"));
}

#[test]
fn test_init_refuses_to_overwrite() {
    let t = Test::new();
    t.write("ferry.toml", SECRET_CONFIG);

    let output = t.init();
    assert_failure(&output);
    assert_stderr_contains(&output, "already exists");
    assert_eq!(t.read("ferry.toml"), SECRET_CONFIG);
}

#[test]
fn test_init_force_overwrites() {
    let t = Test::new();
    t.write("ferry.toml", "garbage");

    let output = t.cmd().args(["init", "--force"]).output().unwrap();
    assert_success(&output);
    assert!(t.read("ferry.toml").contains("[build]"));
}

#[test]
fn test_init_template_provisions() {
    let t = Test::new();
    assert_success(&t.init());

    let output = t.provision();
    assert_success(&output);
    assert_stdout_contains(&output, "created");
}
