use std::cell::RefCell;
use std::rc::Rc;

use crossterm_utils::{ErrorKind, Result};

use crate::sys::System;
use crate::{Platform, Shell};

/// A scripted `System` recording every probe and command it is asked for.
///
/// The call log is shared, so it can still be inspected after the system was moved into a
/// `ConsoleInput`.
#[derive(Clone)]
pub struct FakeSystem {
    platform: Platform,
    stty: bool,
    echo_fails: bool,
    env: bool,
    shells: Vec<Shell>,
    helper_output: Option<String>,
    script_output: Option<String>,
    calls: Rc<RefCell<Vec<String>>>,
}

impl FakeSystem {
    pub fn new() -> FakeSystem {
        FakeSystem {
            platform: Platform::Posix,
            stty: false,
            echo_fails: false,
            env: true,
            shells: Vec::new(),
            helper_output: None,
            script_output: None,
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> FakeSystem {
        self.platform = platform;
        self
    }

    pub fn with_stty(mut self) -> FakeSystem {
        self.stty = true;
        self
    }

    pub fn with_failing_echo(mut self) -> FakeSystem {
        self.echo_fails = true;
        self
    }

    pub fn without_env(mut self) -> FakeSystem {
        self.env = false;
        self
    }

    pub fn with_shells(mut self, shells: &[Shell]) -> FakeSystem {
        self.shells = shells.to_vec();
        self
    }

    pub fn with_helper_output(mut self, output: &str) -> FakeSystem {
        self.helper_output = Some(output.to_string());
        self
    }

    pub fn with_script_output(mut self, output: &str) -> FakeSystem {
        self.script_output = Some(output.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn log(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }
}

impl System for FakeSystem {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn has_stty(&self) -> bool {
        self.log("probe stty");
        self.stty
    }

    fn set_echo(&self, enabled: bool) -> Result<()> {
        self.log(if enabled { "stty echo" } else { "stty -echo" });

        if self.echo_fails {
            return Err(ErrorKind::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                "stty failed",
            )));
        }
        Ok(())
    }

    fn has_env(&self) -> bool {
        self.env
    }

    fn probe_shell(&self, shell: Shell) -> bool {
        self.log(format!("probe {}", shell.name()));
        self.shells.contains(&shell)
    }

    fn run_hidden_input_helper(&self) -> Option<String> {
        self.log("run hiddeninput.exe");
        self.helper_output.clone()
    }

    fn run_shell_script(&self, shell: Shell, script: &str) -> Option<String> {
        self.log(format!("run {} -c '{}'", shell.name(), script));
        self.script_output.clone()
    }
}

/// Creates an anonymous pipe, returning its read and write ends.
#[cfg(unix)]
pub fn pipe() -> (std::fs::File, std::fs::File) {
    use std::os::unix::io::FromRawFd;

    let mut fds = [0 as libc::c_int; 2];
    let result = unsafe { libc::pipe(fds.as_mut_ptr()) };
    assert_eq!(result, 0, "pipe() failed");

    unsafe {
        (
            std::fs::File::from_raw_fd(fds[0]),
            std::fs::File::from_raw_fd(fds[1]),
        )
    }
}
