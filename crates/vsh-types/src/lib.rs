//! Shared types for the vsh virtual shell.
//!
//! Defines the transcript line model and the error taxonomy used by the
//! filesystem store and the command dispatcher.

mod error;
mod line;

/// Filesystem lookup/type-mismatch errors.
pub use error::FsError;
/// Shell-level errors rendered as transcript lines.
pub use error::ShellError;
/// Convenience alias for shell results.
pub use error::Result;
/// A single line of the visible transcript.
pub use line::OutputLine;
/// Whether a transcript line echoes user input or command output.
pub use line::LineKind;
