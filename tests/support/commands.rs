//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a ferry command running in the project directory.
    ///
    /// Inherited `FERRY_*` variables are cleared so the host environment
    /// cannot change behavior.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("ferry").expect("failed to find ferry binary");
        cmd.env_remove("FERRY_CONFIG");
        cmd.env_remove("FERRY_LOG");
        cmd.env("NO_COLOR", "1");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Shortcut for `ferry init`.
    pub fn init(&self) -> Output {
        self.cmd()
            .arg("init")
            .output()
            .expect("failed to run ferry init")
    }

    /// Shortcut for `ferry provision`.
    pub fn provision(&self) -> Output {
        self.cmd()
            .arg("provision")
            .output()
            .expect("failed to run ferry provision")
    }

    /// Shortcut for `ferry provision --reveal`.
    pub fn reveal(&self) -> Output {
        self.cmd()
            .args(["provision", "--reveal"])
            .output()
            .expect("failed to run ferry provision --reveal")
    }

    /// Shortcut for `ferry teardown`.
    pub fn teardown(&self) -> Output {
        self.cmd()
            .arg("teardown")
            .output()
            .expect("failed to run ferry teardown")
    }

    /// Shortcut for `ferry build`.
    pub fn build(&self) -> Output {
        self.cmd()
            .arg("build")
            .output()
            .expect("failed to run ferry build")
    }
}
