//! Probes and external programs used by the console input.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use crossterm_utils::{ErrorKind, Result};
use lazy_static::lazy_static;
use tracing::{debug, trace};

use crate::{Platform, Shell};

#[cfg(unix)]
pub(crate) mod unix;
#[cfg(windows)]
pub(crate) mod windows;

#[cfg(test)]
pub(crate) mod fake;

const ENV_PATH: &str = "/usr/bin/env";
const SHELL_SENTINEL: &str = "OK";

lazy_static! {
    static ref HIDDEN_INPUT_HELPER: Option<PathBuf> = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("hiddeninput.exe")));
}

/// The operating system facilities the console input depends on.
///
/// Every probe reports absence of a facility as a negative result instead of an error, so
/// the hidden input strategies can fall through to the next one.
pub trait System {
    /// Returns the platform family.
    fn platform(&self) -> Platform;

    /// Returns `true` if `stty` can be run and exits successfully.
    fn has_stty(&self) -> bool;

    /// Switches the terminal echo on or off.
    fn set_echo(&self, enabled: bool) -> Result<()>;

    /// Returns `true` if `/usr/bin/env` exists.
    fn has_env(&self) -> bool;

    /// Returns `true` if `shell` runs through `/usr/bin/env` and echoes the sentinel back.
    fn probe_shell(&self, shell: Shell) -> bool;

    /// Runs the bundled Windows helper and returns its standard output, if it printed any.
    fn run_hidden_input_helper(&self) -> Option<String>;

    /// Runs `script` with `shell` and returns its standard output, if it printed any.
    fn run_shell_script(&self, shell: Shell, script: &str) -> Option<String>;

    /// Returns the first shell of [`Shell::PROBE_ORDER`] that is usable.
    fn get_shell(&self) -> Option<Shell> {
        if !self.has_env() {
            return None;
        }

        Shell::PROBE_ORDER
            .iter()
            .copied()
            .find(|&shell| self.probe_shell(shell))
    }
}

/// The real operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsSystem;

impl OsSystem {
    /// Creates a handle to the real operating system.
    pub fn new() -> OsSystem {
        OsSystem
    }
}

impl System for OsSystem {
    fn platform(&self) -> Platform {
        Platform::current()
    }

    fn has_stty(&self) -> bool {
        exits_successfully("stty")
    }

    fn set_echo(&self, enabled: bool) -> Result<()> {
        #[cfg(unix)]
        unix::track_echo(enabled);

        set_stty_echo(enabled)
    }

    fn has_env(&self) -> bool {
        Path::new(ENV_PATH).exists()
    }

    fn probe_shell(&self, shell: Shell) -> bool {
        echoes_sentinel(shell.name())
    }

    fn run_hidden_input_helper(&self) -> Option<String> {
        let helper = match HIDDEN_INPUT_HELPER.as_ref() {
            Some(helper) => helper,
            None => {
                debug!("unable to locate the hidden input helper");
                return None;
            }
        };

        capture_stdout(Command::new(helper))
    }

    fn run_shell_script(&self, shell: Shell, script: &str) -> Option<String> {
        run_script(shell.name(), script)
    }
}

/// Returns `true` if `program` runs and exits with status 0.
fn exits_successfully(program: &str) -> bool {
    // stty inspects its stdin, which `output()` would otherwise replace with null
    match Command::new(program).stdin(Stdio::inherit()).output() {
        Ok(output) => output.status.code() == Some(0),
        Err(e) => {
            trace!("{} is not available: {}", program, e);
            false
        }
    }
}

/// Returns `true` if the shell named `shell` echoes the sentinel back through `/usr/bin/env`.
fn echoes_sentinel(shell: &str) -> bool {
    let output = Command::new(ENV_PATH)
        .args(&[shell, "-c", "echo OK"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output();

    match output {
        Ok(output) => is_sentinel(&output.stdout),
        Err(e) => {
            trace!("probing {} failed: {}", shell, e);
            false
        }
    }
}

fn is_sentinel(stdout: &[u8]) -> bool {
    String::from_utf8_lossy(stdout).trim_end() == SHELL_SENTINEL
}

fn run_script(shell: &str, script: &str) -> Option<String> {
    let mut command = Command::new(ENV_PATH);
    command.args(&[shell, "-c", script]);
    capture_stdout(command)
}

pub(crate) fn set_stty_echo(enabled: bool) -> Result<()> {
    let status = Command::new("stty")
        .arg(if enabled { "echo" } else { "-echo" })
        .stdin(Stdio::inherit())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;

    if status.success() {
        Ok(())
    } else {
        Err(ErrorKind::IoError(io::Error::new(
            io::ErrorKind::Other,
            format!("stty exited with {}", status),
        )))
    }
}

/// Runs `command` against the terminal and collects what it prints.
///
/// Returns `None` if the command cannot be started or prints nothing.
fn capture_stdout(mut command: Command) -> Option<String> {
    let output = command
        .stdin(Stdio::inherit())
        .stderr(Stdio::inherit())
        .output();

    match output {
        Ok(output) if output.stdout.is_empty() => None,
        Ok(output) => Some(String::from_utf8_lossy(&output.stdout).into_owned()),
        Err(e) => {
            debug!("unable to run {:?}: {}", command, e);
            None
        }
    }
}

/// Waits until `file` is readable or `timeout` elapses.
#[cfg(unix)]
pub(crate) fn wait_readable(file: &File, timeout: Duration) -> Result<bool> {
    use std::os::unix::io::AsRawFd;
    unix::poll_readable(file.as_raw_fd(), timeout)
}

/// Waits until `file` is readable or `timeout` elapses.
#[cfg(windows)]
pub(crate) fn wait_readable(file: &File, timeout: Duration) -> Result<bool> {
    use std::os::windows::io::AsRawHandle;
    windows::wait_readable(file.as_raw_handle(), timeout)
}

/// Duplicates the process's standard input into an owned file.
pub(crate) fn stdin_file() -> Result<File> {
    #[cfg(unix)]
    let owned = {
        use std::os::unix::io::AsFd;
        io::stdin().as_fd().try_clone_to_owned()?
    };

    #[cfg(windows)]
    let owned = {
        use std::os::windows::io::AsHandle;
        io::stdin().as_handle().try_clone_to_owned()?
    };

    Ok(File::from(owned))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::{is_sentinel, System};
    use crate::sys::fake::FakeSystem;
    use crate::Shell;

    #[test]
    fn test_sentinel_ignores_trailing_whitespace() {
        assert!(is_sentinel(b"OK"));
        assert!(is_sentinel(b"OK\n"));
        assert!(is_sentinel(b"OK \r\n"));
        assert!(!is_sentinel(b" OK\n"));
        assert!(!is_sentinel(b"NOT OK\n"));
        assert!(!is_sentinel(b""));
    }

    #[test]
    fn test_get_shell_requires_env() {
        let system = FakeSystem::new().with_shells(&[Shell::Bash]).without_env();

        assert_eq!(system.get_shell(), None);
        assert!(system.calls().is_empty());
    }

    #[test]
    fn test_get_shell_stops_at_first_match() {
        let system = FakeSystem::new().with_shells(&[Shell::Zsh, Shell::Csh]);

        assert_eq!(system.get_shell(), Some(Shell::Zsh));
        assert_eq!(system.calls(), vec!["probe bash", "probe zsh"]);
    }

    #[test]
    fn test_get_shell_none_found() {
        let system = FakeSystem::new();

        assert_eq!(system.get_shell(), None);
        assert_eq!(
            system.calls(),
            vec!["probe bash", "probe zsh", "probe ksh", "probe csh"]
        );
    }

    #[test]
    fn test_get_shell_default_method_on_custom_system() {
        struct OnlyCsh(RefCell<Vec<Shell>>);

        impl System for OnlyCsh {
            fn platform(&self) -> crate::Platform {
                crate::Platform::Posix
            }
            fn has_stty(&self) -> bool {
                false
            }
            fn set_echo(&self, _: bool) -> crossterm_utils::Result<()> {
                Ok(())
            }
            fn has_env(&self) -> bool {
                true
            }
            fn probe_shell(&self, shell: Shell) -> bool {
                self.0.borrow_mut().push(shell);
                shell == Shell::Csh
            }
            fn run_hidden_input_helper(&self) -> Option<String> {
                None
            }
            fn run_shell_script(&self, _: Shell, _: &str) -> Option<String> {
                None
            }
        }

        let system = OnlyCsh(RefCell::new(Vec::new()));
        assert_eq!(system.get_shell(), Some(Shell::Csh));
        assert_eq!(*system.0.borrow(), Shell::PROBE_ORDER.to_vec());
    }

    #[cfg(unix)]
    mod os {
        use std::path::Path;

        use super::super::{echoes_sentinel, exits_successfully, run_script, OsSystem, ENV_PATH};
        use crate::{Shell, System};

        fn has_env() -> bool {
            Path::new(ENV_PATH).exists()
        }

        #[test]
        fn test_exit_status() {
            assert!(exits_successfully("true"));
            assert!(!exits_successfully("false"));
            assert!(!exits_successfully("console-input-no-such-program"));
        }

        #[test]
        fn test_existing_shell_echoes_sentinel() {
            if !has_env() {
                return;
            }

            assert!(echoes_sentinel("sh"));
        }

        #[test]
        fn test_unknown_shell_is_not_found() {
            if !has_env() {
                return;
            }

            assert!(!echoes_sentinel("console-input-no-such-shell"));
        }

        #[test]
        fn test_installed_shells_are_detected() {
            let system = OsSystem::new();
            if !system.has_env() {
                return;
            }

            for &shell in Shell::PROBE_ORDER.iter() {
                let installed = ["/bin", "/usr/bin"]
                    .iter()
                    .any(|dir| Path::new(dir).join(shell.name()).exists());

                if installed {
                    assert!(system.probe_shell(shell), "{} not detected", shell.name());
                }
            }
        }

        #[test]
        fn test_run_script_captures_stdout() {
            if !has_env() {
                return;
            }

            assert_eq!(run_script("sh", "echo hi"), Some("hi\n".to_string()));
        }

        #[test]
        fn test_run_shell_script_with_bash() {
            let system = OsSystem::new();
            if !system.has_env() || !system.probe_shell(Shell::Bash) {
                return;
            }

            assert_eq!(
                system.run_shell_script(Shell::Bash, "echo hi"),
                Some("hi\n".to_string())
            );
        }

        #[test]
        fn test_silent_script_yields_nothing() {
            if !has_env() {
                return;
            }

            assert_eq!(run_script("sh", "true"), None);
        }
    }
}
