//! The closed command set.
//!
//! Dispatch is a total `match` over [`CommandKind`] rather than a runtime
//! string-keyed table, so adding a command without a handler fails to
//! compile. [`CommandKind::NAMES`] is the single source of truth for
//! parsing and tab completion.

/// Every command the shell understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Help,
    Clear,
    Echo,
    Date,
    Whoami,
    Uname,
    Env,
    Export,
    Ls,
    Cd,
    Pwd,
    Cat,
    Touch,
    Mkdir,
    Rm,
    Cp,
    Mv,
    Chmod,
    Wget,
    Curl,
    Ping,
    Apt,
    Npm,
    Pip,
    Winget,
    Ps,
    Kill,
    Top,
    Df,
    Du,
    Free,
    Grep,
    Find,
    Head,
    Tail,
    Wc,
    Nano,
    History,
    Calc,
    Weather,
}

impl CommandKind {
    /// All registered names with their kinds, sorted by name.
    pub const NAMES: &'static [(&'static str, CommandKind)] = &[
        ("apt", CommandKind::Apt),
        ("calc", CommandKind::Calc),
        ("cat", CommandKind::Cat),
        ("cd", CommandKind::Cd),
        ("chmod", CommandKind::Chmod),
        ("clear", CommandKind::Clear),
        ("cp", CommandKind::Cp),
        ("curl", CommandKind::Curl),
        ("date", CommandKind::Date),
        ("df", CommandKind::Df),
        ("du", CommandKind::Du),
        ("echo", CommandKind::Echo),
        ("env", CommandKind::Env),
        ("export", CommandKind::Export),
        ("find", CommandKind::Find),
        ("free", CommandKind::Free),
        ("grep", CommandKind::Grep),
        ("head", CommandKind::Head),
        ("help", CommandKind::Help),
        ("history", CommandKind::History),
        ("kill", CommandKind::Kill),
        ("ls", CommandKind::Ls),
        ("mkdir", CommandKind::Mkdir),
        ("mv", CommandKind::Mv),
        ("nano", CommandKind::Nano),
        ("npm", CommandKind::Npm),
        ("ping", CommandKind::Ping),
        ("pip", CommandKind::Pip),
        ("ps", CommandKind::Ps),
        ("pwd", CommandKind::Pwd),
        ("rm", CommandKind::Rm),
        ("tail", CommandKind::Tail),
        ("top", CommandKind::Top),
        ("touch", CommandKind::Touch),
        ("uname", CommandKind::Uname),
        ("wc", CommandKind::Wc),
        ("weather", CommandKind::Weather),
        ("wget", CommandKind::Wget),
        ("whoami", CommandKind::Whoami),
        ("winget", CommandKind::Winget),
    ];

    /// Look up a command by name.
    pub fn parse(name: &str) -> Option<CommandKind> {
        Self::NAMES
            .binary_search_by_key(&name, |&(n, _)| n)
            .ok()
            .map(|i| Self::NAMES[i].1)
    }

    /// Registered names starting with `prefix`, in sorted order.
    pub fn completions(prefix: &str) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .map(|(n, _)| *n)
            .filter(|n| n.starts_with(prefix))
            .collect()
    }
}
