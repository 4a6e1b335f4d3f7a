//! A module that contains the `ConsoleInput`, the reader of console lines.
//! Like reading a line, reading a hidden line and checking for available input.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

use crossterm_utils::Result;
use tracing::{debug, warn};

#[cfg(feature = "readline")]
use crate::editor::DefaultLineEditor;
use crate::editor::LineEditor;
use crate::hidden::{EchoGuard, HiddenStrategy};
use crate::sys::{self, OsSystem, System};

/// The pseudo-path of the process's standard input.
pub const STDIN: &str = "-";

/// Reads lines from a console input handle.
///
/// The handle is opened when the `ConsoleInput` is created and closed when it is dropped.
/// Binding to the standard input duplicates its descriptor, so the process's own standard
/// input stays open.
///
/// # Examples
///
/// ```no_run
/// use console_input::ConsoleInput;
///
/// fn main() -> console_input::Result<()> {
///     let mut input = ConsoleInput::new()?;
///
///     print!("Password: ");
///     let password = input.read_hidden()?;
///     println!();
///
///     if password.is_none() {
///         println!("Hidden input is not supported here.");
///     }
///     Ok(())
/// }
/// ```
pub struct ConsoleInput {
    reader: BufReader<File>,
    editor: Option<Box<dyn LineEditor>>,
    system: Box<dyn System>,
}

impl ConsoleInput {
    /// Creates a `ConsoleInput` bound to the process's standard input.
    pub fn new() -> Result<ConsoleInput> {
        ConsoleInput::open(STDIN)
    }

    /// Creates a `ConsoleInput` reading from `path`.
    ///
    /// [`STDIN`](constant.STDIN.html) binds to the process's standard input, the only handle
    /// lines are read through the line editor for.
    ///
    /// # Errors
    ///
    /// Fails if the stream cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<ConsoleInput> {
        let path = path.as_ref();

        if path == Path::new(STDIN) {
            let mut input = ConsoleInput::from_file(sys::stdin_file()?);
            input.editor = default_editor();
            Ok(input)
        } else {
            Ok(ConsoleInput::from_file(File::open(path)?))
        }
    }

    /// Creates a `ConsoleInput` reading from an already opened file, pipe or terminal.
    ///
    /// Lines are read without the line editor.
    pub fn from_file(file: File) -> ConsoleInput {
        ConsoleInput {
            reader: BufReader::new(file),
            editor: None,
            system: Box::new(OsSystem::new()),
        }
    }

    /// Replaces the operating system facilities used by [`read_hidden`](#method.read_hidden).
    pub fn with_system<S: System + 'static>(mut self, system: S) -> ConsoleInput {
        self.system = Box::new(system);
        self
    }

    /// Reads lines through `editor`, whatever the input is bound to.
    pub fn with_editor<E: LineEditor + 'static>(mut self, editor: E) -> ConsoleInput {
        self.editor = Some(Box::new(editor));
        self
    }

    /// Returns `true` if lines are read through a line editor.
    pub fn can_readline(&self) -> bool {
        self.editor.is_some()
    }

    /// Reads the next line.
    ///
    /// With a line editor the line comes without the trailing newline and is added to the
    /// history when it is not empty. Otherwise the line keeps its newline.
    ///
    /// Returns `Ok(None)` at the end of the input.
    pub fn read(&mut self) -> Result<Option<String>> {
        let editor = match self.editor.as_mut() {
            Some(editor) => editor,
            None => return read_line(&mut self.reader),
        };

        let line = editor.readline("")?;

        if let Some(line) = &line {
            if !line.is_empty() {
                if let Err(e) = editor.add_history(line) {
                    warn!("unable to add line to history: {:?}", e);
                }
            }
        }

        Ok(line)
    }

    /// Reads the next line without echoing it, e.g. for passwords.
    ///
    /// The first available of these strategies is used:
    ///
    /// 1. `stty` switches the echo off while a line is read from the input handle,
    /// 2. on Windows, `hiddeninput.exe` next to the executable reads the line,
    /// 3. `bash`, `zsh`, `ksh` or `csh` reads the line.
    ///
    /// # Notes
    ///
    /// * There is no guaranteed return value on unsupported platforms: `Ok(None)` is returned
    ///   when no strategy is available.
    /// * If `stty` is found but cannot switch the echo off, the next strategy is tried.
    /// * The helper and shell strategies return their output verbatim, or `None` when they
    ///   print nothing or cannot be started.
    pub fn read_hidden(&mut self) -> Result<Option<String>> {
        let system = &*self.system;
        let mut strategy = HiddenStrategy::select(system);

        loop {
            match strategy {
                Some(strategy) => debug!("reading hidden input with {:?}", strategy),
                None => debug!("no hidden input strategy available"),
            }

            match strategy {
                None => return Ok(None),
                Some(HiddenStrategy::Stty) => match EchoGuard::disable(system) {
                    Ok(_echo) => return read_line(&mut self.reader),
                    Err(e) => {
                        warn!("unable to switch terminal echo off: {:?}", e);
                        strategy = HiddenStrategy::select_after(system, HiddenStrategy::Stty);
                    }
                },
                Some(HiddenStrategy::WindowsHelper) => {
                    return Ok(system.run_hidden_input_helper())
                }
                Some(HiddenStrategy::Shell(shell)) => {
                    return Ok(system.run_shell_script(shell, &shell.hidden_read_script()))
                }
            }
        }
    }

    /// Checks whether input can be read within `timeout`.
    ///
    /// A zero `timeout` doesn't block. Lines already buffered by a previous read count as
    /// available input.
    pub fn data_available(&self, timeout: Duration) -> Result<bool> {
        if !self.reader.buffer().is_empty() {
            return Ok(true);
        }

        sys::wait_readable(self.reader.get_ref(), timeout)
    }
}

fn read_line(reader: &mut BufReader<File>) -> Result<Option<String>> {
    let mut line = Vec::new();

    if reader.read_until(b'\n', &mut line)? == 0 {
        return Ok(None);
    }

    Ok(Some(String::from_utf8_lossy(&line).into_owned()))
}

#[cfg(feature = "readline")]
fn default_editor() -> Option<Box<dyn LineEditor>> {
    match DefaultLineEditor::new() {
        Ok(editor) => Some(Box::new(editor)),
        Err(e) => {
            debug!("line editing unavailable: {:?}", e);
            None
        }
    }
}

#[cfg(not(feature = "readline"))]
fn default_editor() -> Option<Box<dyn LineEditor>> {
    None
}
