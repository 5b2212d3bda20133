//! Virtual shell engine for vsh.
//!
//! A [`Shell`] is a complete simulated terminal session: an in-memory
//! filesystem, environment and history, a closed set of built-in
//! commands, and a scheduler for deferred tasks (downloads, installs,
//! pings) that the host drives tick by tick.
//!
//! ```
//! use vsh_shell::Shell;
//!
//! let mut shell = Shell::new();
//! shell.submit_line("echo hello > hi.txt");
//! shell.submit_line("cat hi.txt");
//! assert_eq!(shell.transcript().last().unwrap().text, "hello");
//! ```

mod calc;
mod command;
mod fs_commands;
mod net_commands;
mod pkg_commands;
mod rng;
mod session;
mod shell;
mod system_commands;
mod task;
mod text_commands;

/// The closed set of built-in commands.
pub use command::CommandKind;
/// Deterministic generator behind the simulated sizes and timings.
pub use rng::Lcg;
/// Per-session state: cwd, environment, history, packages.
pub use session::SessionState;
/// The shell session engine.
pub use shell::Shell;
/// Deferred-task simulator types.
pub use task::{SideEffect, Task, TaskId, TaskKind, TaskScheduler, TaskTick};
