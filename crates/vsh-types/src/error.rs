//! Error types for the virtual shell.
//!
//! Every command handler is total: failures become `ShellError` values that
//! the dispatcher renders as ordinary transcript lines. Nothing here ever
//! aborts the session.

/// Filesystem-level failures, phrased the way a POSIX tool would print them.
///
/// Handlers embed the `Display` string into their own message, e.g.
/// `cat: notes.txt: No such file or directory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FsError {
    #[error("No such file or directory")]
    NotFound,

    #[error("Not a directory")]
    NotADirectory,

    #[error("Is a directory")]
    IsADirectory,
}

/// Shell-level errors. Each variant carries the fully formatted message so
/// the transcript matches the real tool output; the variant itself records
/// which failure class occurred.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShellError {
    /// A command was invoked without a required argument.
    #[error("{0}")]
    MissingOperand(String),

    /// A path argument did not resolve to a node.
    #[error("{0}")]
    NotFound(String),

    /// A directory was required but the path named a file.
    #[error("{0}")]
    NotADirectory(String),

    /// A file was required but the path named a directory.
    #[error("{0}")]
    IsADirectory(String),

    /// Malformed `export` assignment or `calc` expression.
    #[error("{0}")]
    InvalidSyntax(String),

    /// The command name is not in the registry.
    #[error("Command not found: {0}. Type 'help' for available commands.")]
    UnknownCommand(String),

    /// Package-manager install on an already-installed package.
    #[error("{0}")]
    AlreadySatisfied(String),

    /// Package-manager remove on a package that was never installed.
    #[error("{0}")]
    NotInstalled(String),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ShellError>;
