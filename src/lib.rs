//! # Console Input
//!
//! The `console_input` crate reads lines from the console, optionally with line editing and
//! history, reads lines with the terminal echo switched off (for passwords), and checks whether
//! input is available within a timeout.
//!
//! Everything goes through a single [`ConsoleInput`](struct.ConsoleInput.html) value which owns
//! the input handle it was created for.
//!
//! ## Line Reading
//!
//! When the crate is compiled with the `readline` feature (enabled by default) and the input is
//! bound to the process's standard input, lines are read through a line editor. Non-empty lines
//! are added to the editor history. Any other input is read with a plain buffered line read,
//! which keeps the trailing newline.
//!
//! ## Hidden Input
//!
//! [`ConsoleInput::read_hidden`](struct.ConsoleInput.html#method.read_hidden) tries these
//! strategies in order and uses the first one that is available:
//!
//! * `stty` - echo is switched off, a line is read from the handle and echo is switched back on,
//! * Windows - the `hiddeninput.exe` helper next to the executable is run,
//! * a Unix shell (`bash`, `zsh`, `ksh` or `csh`) started through `/usr/bin/env` reads the line.
//!
//! If none of them is available, no value is returned. There is no guaranteed return value on
//! unsupported platforms.
//!
//! ### Technical details
//!
//! The probes and the external programs are reached through the [`System`](trait.System.html)
//! trait. [`OsSystem`](struct.OsSystem.html) is the real implementation; tests and embedders can
//! inject their own.
//!
//! On UNIX systems the readiness check uses `poll`, on Windows it depends on the handle type
//! (`WaitForSingleObject` for consoles, `PeekNamedPipe` for pipes).

#[doc(no_inline)]
pub use crossterm_utils::{ErrorKind, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "readline")]
pub use self::editor::DefaultLineEditor;
pub use self::{
    editor::LineEditor,
    hidden::{EchoGuard, HiddenStrategy},
    input::{ConsoleInput, STDIN},
    sys::{OsSystem, System},
};

mod editor;
mod hidden;
mod input;
mod sys;

/// Represents the platform family the hidden input strategies are chosen for.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialOrd, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Platform {
    /// Unix-like systems, forward slash path separator.
    Posix,
    /// Windows-family systems, backslash path separator.
    Windows,
}

impl Platform {
    /// Returns the platform this binary was compiled for.
    pub fn current() -> Platform {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }
}

/// Represents a Unix shell that can read a line with echo switched off.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialOrd, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Shell {
    /// GNU Bourne-Again shell.
    Bash,
    /// Z shell.
    Zsh,
    /// Korn shell.
    Ksh,
    /// C shell.
    Csh,
}

impl Shell {
    /// The order in which shells are probed.
    pub const PROBE_ORDER: [Shell; 4] = [Shell::Bash, Shell::Zsh, Shell::Ksh, Shell::Csh];

    /// Returns the program name of the shell.
    pub fn name(self) -> &'static str {
        match self {
            Shell::Bash => "bash",
            Shell::Zsh => "zsh",
            Shell::Ksh => "ksh",
            Shell::Csh => "csh",
        }
    }

    /// Returns the shell statement reading one line into `$mypassword`.
    ///
    /// `csh` has no `read` builtin, it reads a line from `$<` instead.
    pub fn read_fragment(self) -> &'static str {
        match self {
            Shell::Csh => "set mypassword = $<",
            _ => "read -r mypassword",
        }
    }

    /// Returns the script that reads one line with echo switched off and prints it.
    pub fn hidden_read_script(self) -> String {
        format!(
            "stty -echo; {}; stty echo; echo $mypassword",
            self.read_fragment()
        )
    }
}
