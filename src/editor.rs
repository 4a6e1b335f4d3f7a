//! Line editing with history.

use crossterm_utils::Result;

/// A line editor used to read lines from an interactive standard input.
///
/// Implemented by [`DefaultLineEditor`](struct.DefaultLineEditor.html) when the `readline`
/// feature is enabled. Custom implementations can be handed to
/// [`ConsoleInput::with_editor`](struct.ConsoleInput.html#method.with_editor).
pub trait LineEditor {
    /// Reads one line, without the trailing newline.
    ///
    /// Returns `Ok(None)` on end of input or when the read was interrupted.
    fn readline(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Adds `line` to the history so it can be recalled later.
    fn add_history(&mut self, line: &str) -> Result<()>;
}

#[cfg(feature = "readline")]
pub use self::readline::DefaultLineEditor;

#[cfg(feature = "readline")]
mod readline {
    use std::io;

    use crossterm_utils::{ErrorKind, Result};
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    use super::LineEditor;

    /// A [`LineEditor`](trait.LineEditor.html) backed by `rustyline`.
    pub struct DefaultLineEditor {
        editor: DefaultEditor,
    }

    impl DefaultLineEditor {
        /// Creates an editor attached to the terminal.
        pub fn new() -> Result<DefaultLineEditor> {
            let editor = DefaultEditor::new().map_err(readline_error)?;
            Ok(DefaultLineEditor { editor })
        }
    }

    impl LineEditor for DefaultLineEditor {
        fn readline(&mut self, prompt: &str) -> Result<Option<String>> {
            match self.editor.readline(prompt) {
                Ok(line) => Ok(Some(line)),
                Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(None),
                Err(e) => Err(readline_error(e)),
            }
        }

        fn add_history(&mut self, line: &str) -> Result<()> {
            self.editor
                .add_history_entry(line)
                .map(|_| ())
                .map_err(readline_error)
        }
    }

    fn readline_error(error: ReadlineError) -> ErrorKind {
        match error {
            ReadlineError::Io(e) => ErrorKind::IoError(e),
            e => ErrorKind::IoError(io::Error::new(io::ErrorKind::Other, e.to_string())),
        }
    }
}
