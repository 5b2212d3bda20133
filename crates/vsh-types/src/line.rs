//! Transcript line model.

/// Whether a transcript line echoes user input or command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Echo of a submitted command line, rendered `<path> $ <line>`.
    Input,
    /// Output produced by a command or a running task.
    Output,
}

/// A single line of the visible transcript.
///
/// The transcript is an append-only sequence of these, truncated only by
/// the `clear` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub kind: LineKind,
    pub text: String,
}

impl OutputLine {
    /// An echoed input line.
    pub fn input(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Input,
            text: text.into(),
        }
    }

    /// A command output line.
    pub fn output(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Output,
            text: text.into(),
        }
    }
}
