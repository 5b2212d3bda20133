//! The shell engine: one [`Shell`] owns the session, the filesystem, the
//! task scheduler, and the transcript, and turns submitted input lines
//! into transcript output.
//!
//! Dispatch is a total `match` over [`CommandKind`], so every registered
//! name has a handler and every handler is total: errors come back as
//! [`vsh_types::ShellError`] values whose rendering is the transcript
//! line, never as panics.

use vsh_types::{OutputLine, Result, ShellError};
use vsh_vfs::{resolve, FsStore};

use crate::command::CommandKind;
use crate::rng::Lcg;
use crate::session::SessionState;
use crate::task::{SideEffect, Task, TaskId, TaskScheduler};
use crate::{fs_commands, net_commands, pkg_commands, system_commands, text_commands};

/// First operand: the first non-empty argument that is not a flag.
pub(crate) fn first_operand<'a>(args: &[&'a str]) -> Option<&'a str> {
    args.iter()
        .copied()
        .find(|a| !a.is_empty() && !a.starts_with('-'))
}

pub(crate) fn has_flag(args: &[&str], flag: &str) -> bool {
    args.iter().any(|a| *a == flag)
}

/// What a command handler asks the shell to do.
pub(crate) enum Action {
    /// Plain output; subject to `>` redirection.
    Lines(Vec<String>),
    /// Wipe the transcript.
    Clear,
    /// Emit the preamble now and hand the task to the scheduler.
    /// Preamble and later task output bypass redirection.
    Spawn { preamble: Vec<String>, task: Task },
}

/// Everything a handler may touch, borrowed from the [`Shell`].
pub(crate) struct Ctx<'a> {
    pub session: &'a mut SessionState,
    pub fs: &'a mut FsStore,
    pub rng: &'a mut Lcg,
    pub tasks: &'a mut TaskScheduler,
}

/// A complete interactive shell session.
pub struct Shell {
    session: SessionState,
    fs: FsStore,
    rng: Lcg,
    tasks: TaskScheduler,
    transcript: Vec<OutputLine>,
    input: String,
    /// History navigation cursor; `None` means "editing a fresh line".
    cursor: Option<usize>,
}

impl Shell {
    /// A fresh session with the seed filesystem and the greeting banner.
    pub fn new() -> Self {
        Self::with_rng(Lcg::from_time())
    }

    /// Deterministic variant for reproducible sessions.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(Lcg::new(seed))
    }

    fn with_rng(rng: Lcg) -> Self {
        let mut fs = FsStore::new();
        seed_filesystem(&mut fs);
        Self {
            session: SessionState::new(),
            fs,
            rng,
            tasks: TaskScheduler::new(),
            transcript: vec![
                OutputLine::output("vsh v0.1.0 - Full Command Support"),
                OutputLine::output("Type \"help\" for available commands"),
            ],
            input: String::new(),
            cursor: None,
        }
    }

    // -- Accessors --

    pub fn transcript(&self) -> &[OutputLine] {
        &self.transcript
    }

    pub fn cwd(&self) -> &str {
        self.session.cwd()
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn fs(&self) -> &FsStore {
        &self.fs
    }

    pub fn fs_mut(&mut self) -> &mut FsStore {
        &mut self.fs
    }

    /// Current input buffer (edited by history navigation and
    /// tab completion).
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: &str) {
        self.input = input.to_string();
    }

    pub fn tasks_idle(&self) -> bool {
        self.tasks.is_idle()
    }

    /// Ids and command names of the tasks still running.
    pub fn running_tasks(&self) -> Vec<(TaskId, &'static str)> {
        self.tasks
            .running()
            .map(|(id, task)| (id, task.command()))
            .collect()
    }

    // -- Input --

    /// Replace the buffer with `line` and submit it.
    pub fn submit_line(&mut self, line: &str) {
        self.set_input(line);
        self.submit();
    }

    /// Execute the input buffer and clear it. Blank input does nothing,
    /// not even echo a prompt line.
    pub fn submit(&mut self) {
        let line = std::mem::take(&mut self.input);
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }

        self.transcript.push(OutputLine::input(format!(
            "{} $ {trimmed}",
            self.session.cwd()
        )));
        self.session.push_history(trimmed);
        self.cursor = None;

        // Redirection: first ` > ` splits command from target. An empty
        // target means no redirection.
        let (command_line, redirect) = match trimmed.find(" > ") {
            Some(pos) => {
                let target = trimmed[pos + 3..].trim();
                (
                    trimmed[..pos].trim(),
                    (!target.is_empty()).then(|| target.to_string()),
                )
            }
            None => (trimmed, None),
        };

        let mut parts = command_line.split(' ');
        let name = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        let Some(kind) = CommandKind::parse(name) else {
            // Unknown commands are not redirectable.
            self.transcript.push(OutputLine::output(
                ShellError::UnknownCommand(name.to_string()).to_string(),
            ));
            return;
        };
        log::debug!("dispatch {name} args={args:?} redirect={redirect:?}");

        let mut ctx = Ctx {
            session: &mut self.session,
            fs: &mut self.fs,
            rng: &mut self.rng,
            tasks: &mut self.tasks,
        };
        let action = match dispatch(kind, &args, &mut ctx) {
            Ok(action) => action,
            Err(err) => Action::Lines(vec![err.to_string()]),
        };

        match action {
            Action::Lines(lines) => match redirect {
                Some(target) if !lines.is_empty() => {
                    let path = resolve(&target, self.session.cwd());
                    if self.fs.set_file(&path, &lines.join("\n")).is_err() {
                        self.transcript.push(OutputLine::output(format!(
                            "bash: {target}: Not a directory"
                        )));
                    }
                }
                _ => self
                    .transcript
                    .extend(lines.into_iter().map(OutputLine::output)),
            },
            Action::Clear => self.transcript.clear(),
            Action::Spawn { preamble, task } => {
                self.transcript
                    .extend(preamble.into_iter().map(OutputLine::output));
                self.tasks.spawn(task);
            }
        }
    }

    /// Advance every running task by one tick, appending their output and
    /// applying completion side effects.
    pub fn tick(&mut self) {
        for (id, tick) in self.tasks.tick(&mut self.rng) {
            self.transcript
                .extend(tick.lines.into_iter().map(OutputLine::output));
            match tick.effect {
                Some(SideEffect::WriteFile { path, content }) => {
                    if self.fs.set_file(&path, &content).is_err() {
                        log::warn!("task {id}: could not write {path}");
                    }
                }
                Some(SideEffect::InstallPackage { id }) => self.session.install(&id),
                None => {}
            }
        }
    }

    // -- History navigation --

    /// Arrow-up: walk backwards through command history into the input
    /// buffer. Does nothing on an empty history.
    pub fn history_up(&mut self) {
        let history = self.session.history();
        if history.is_empty() {
            return;
        }
        let index = match self.cursor {
            None => history.len() - 1,
            Some(i) => i.saturating_sub(1),
        };
        self.cursor = Some(index);
        self.input = history[index].clone();
    }

    /// Arrow-down: walk forwards; stepping past the newest entry restores
    /// an empty fresh line.
    pub fn history_down(&mut self) {
        let Some(index) = self.cursor else {
            return;
        };
        let next = index + 1;
        if next >= self.session.history().len() {
            self.cursor = None;
            self.input.clear();
        } else {
            self.cursor = Some(next);
            self.input = self.session.history()[next].clone();
        }
    }

    // -- Tab completion --

    /// Complete the command word of the input buffer. A unique match
    /// replaces the buffer; multiple matches are listed as output.
    pub fn tab_complete(&mut self) {
        let prefix = self.input.split(' ').next().unwrap_or_default();
        let matches = CommandKind::completions(prefix);
        match matches.as_slice() {
            [only] => self.input = (*only).to_string(),
            [] => {}
            many => self.transcript.push(OutputLine::output(many.join("   "))),
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

/// The starting tree every session sees.
fn seed_filesystem(fs: &mut FsStore) {
    // Fixed, valid paths; these cannot fail.
    let _ = fs.set_dir("~/documents");
    let _ = fs.set_dir("~/.local/bin");
    let _ = fs.set_file("~/readme.txt", "Welcome to vsh!");
}

/// Route a parsed command to its handler. Total over [`CommandKind`].
fn dispatch(kind: CommandKind, args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    use CommandKind::*;
    match kind {
        Help => system_commands::help(args, ctx),
        Clear => system_commands::clear(args, ctx),
        Echo => system_commands::echo(args, ctx),
        Date => system_commands::date(args, ctx),
        Whoami => system_commands::whoami(args, ctx),
        Uname => system_commands::uname(args, ctx),
        Env => system_commands::env(args, ctx),
        Export => system_commands::export(args, ctx),
        Ls => fs_commands::ls(args, ctx),
        Cd => fs_commands::cd(args, ctx),
        Pwd => fs_commands::pwd(args, ctx),
        Cat => fs_commands::cat(args, ctx),
        Touch => fs_commands::touch(args, ctx),
        Mkdir => fs_commands::mkdir(args, ctx),
        Rm => fs_commands::rm(args, ctx),
        Cp => fs_commands::cp(args, ctx),
        Mv => fs_commands::mv(args, ctx),
        Chmod => fs_commands::chmod(args, ctx),
        Wget => net_commands::wget(args, ctx),
        Curl => net_commands::curl(args, ctx),
        Ping => net_commands::ping(args, ctx),
        Apt => pkg_commands::apt(args, ctx),
        Npm => pkg_commands::npm(args, ctx),
        Pip => pkg_commands::pip(args, ctx),
        Winget => pkg_commands::winget(args, ctx),
        Ps => system_commands::ps(args, ctx),
        Kill => system_commands::kill(args, ctx),
        Top => system_commands::top(args, ctx),
        Df => system_commands::df(args, ctx),
        Du => fs_commands::du(args, ctx),
        Free => system_commands::free(args, ctx),
        Grep => text_commands::grep(args, ctx),
        Find => fs_commands::find(args, ctx),
        Head => text_commands::head(args, ctx),
        Tail => text_commands::tail(args, ctx),
        Wc => text_commands::wc(args, ctx),
        Nano => text_commands::nano(args, ctx),
        History => system_commands::history(args, ctx),
        Calc => text_commands::calc(args, ctx),
        Weather => system_commands::weather(args, ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use vsh_types::LineKind;

    #[test]
    fn banner_is_present_on_a_fresh_session() {
        let shell = Shell::new();
        assert_eq!(shell.transcript().len(), 2);
        assert!(shell.transcript()[0].text.starts_with("vsh"));
    }

    #[test]
    fn blank_input_leaves_no_trace() {
        let mut shell = Shell::new();
        shell.submit_line("");
        shell.submit_line("   ");
        assert_eq!(shell.transcript().len(), 2);
        assert!(shell.session().history().is_empty());
    }

    #[test]
    fn input_lines_echo_the_prompt() {
        let mut shell = Shell::new();
        shell.submit_line("  pwd  ");
        let echoed = &shell.transcript()[2];
        assert_eq!(echoed.kind, LineKind::Input);
        assert_eq!(echoed.text, "~ $ pwd");
    }

    #[test]
    fn unknown_command_message() {
        let mut shell = Shell::new();
        shell.submit_line("frobnicate now");
        let last = shell.transcript().last().unwrap();
        assert_eq!(
            last.text,
            "Command not found: frobnicate. Type 'help' for available commands."
        );
    }

    #[test]
    fn clear_wipes_the_transcript() {
        let mut shell = Shell::new();
        shell.submit_line("pwd");
        shell.submit_line("clear");
        assert!(shell.transcript().is_empty());
        // History survives the wipe.
        assert_eq!(shell.session().history(), ["pwd", "clear"]);
    }

    #[test]
    fn redirect_writes_instead_of_printing() {
        let mut shell = Shell::new();
        shell.submit_line("echo hello world > greeting.txt");
        assert_eq!(shell.fs().read("~/greeting.txt").unwrap(), "hello world");
        // Only the echoed input line was added.
        assert_eq!(shell.transcript().last().unwrap().kind, LineKind::Input);
    }

    #[test]
    fn redirect_joins_multiline_output() {
        let mut shell = Shell::new();
        shell.submit_line("ls -a > listing.txt");
        let content = shell.fs().read("~/listing.txt").unwrap();
        assert!(content.contains(".local\n"));
        assert!(content.contains("readme.txt"));
    }

    #[test]
    fn redirect_of_empty_output_creates_no_file() {
        let mut shell = Shell::new();
        shell.submit_line("cd documents > marker.txt");
        assert!(!shell.fs().exists("~/marker.txt"));
        assert!(!shell.fs().exists("~/documents/marker.txt"));
    }

    #[test]
    fn redirect_captures_command_errors() {
        let mut shell = Shell::new();
        shell.submit_line("cat missing.txt > err.txt");
        assert_eq!(
            shell.fs().read("~/err.txt").unwrap(),
            "cat: missing.txt: No such file or directory"
        );
    }

    #[test]
    fn only_first_redirect_marker_splits() {
        let mut shell = Shell::new();
        shell.submit_line("echo a > b > c");
        // Everything after the first marker is the target, verbatim.
        assert_eq!(shell.fs().read("~/b > c").unwrap(), "a");
    }

    #[test]
    fn trailing_redirect_marker_is_not_a_redirect() {
        // The outer trim eats the trailing space, so ` > ` never matches
        // and the `>` token is plain echo input.
        let mut shell = Shell::new();
        shell.submit_line("echo hi > ");
        assert_eq!(shell.transcript().last().unwrap().text, "hi >");
        assert!(!shell.fs().exists("~/hi"));
    }

    #[test]
    fn history_navigation_walks_both_ways() {
        let mut shell = Shell::new();
        shell.submit_line("pwd");
        shell.submit_line("ls");
        shell.submit_line("whoami");

        shell.history_up();
        assert_eq!(shell.input(), "whoami");
        shell.history_up();
        assert_eq!(shell.input(), "ls");
        shell.history_up();
        assert_eq!(shell.input(), "pwd");
        // Clamped at the oldest entry.
        shell.history_up();
        assert_eq!(shell.input(), "pwd");

        shell.history_down();
        assert_eq!(shell.input(), "ls");
        shell.history_down();
        assert_eq!(shell.input(), "whoami");
        // Past the newest: fresh empty line.
        shell.history_down();
        assert_eq!(shell.input(), "");
        // Down with no cursor does nothing.
        shell.history_down();
        assert_eq!(shell.input(), "");
    }

    #[test]
    fn history_up_on_empty_history_is_a_no_op() {
        let mut shell = Shell::new();
        shell.history_up();
        assert_eq!(shell.input(), "");
    }

    #[test]
    fn submitting_resets_the_history_cursor() {
        let mut shell = Shell::new();
        shell.submit_line("pwd");
        shell.history_up();
        shell.submit();
        shell.history_up();
        // Newest entry again, not a continuation of the old walk.
        assert_eq!(shell.input(), "pwd");
    }

    #[test]
    fn tab_completes_unique_prefix() {
        let mut shell = Shell::new();
        shell.set_input("ech");
        shell.tab_complete();
        assert_eq!(shell.input(), "echo");
    }

    #[test]
    fn tab_lists_ambiguous_matches() {
        let mut shell = Shell::new();
        shell.set_input("c");
        shell.tab_complete();
        assert_eq!(shell.input(), "c");
        assert_eq!(
            shell.transcript().last().unwrap().text,
            "calc   cat   cd   chmod   clear   cp   curl"
        );
    }

    #[test]
    fn tab_with_no_matches_does_nothing() {
        let mut shell = Shell::new();
        shell.set_input("zz");
        let len = shell.transcript().len();
        shell.tab_complete();
        assert_eq!(shell.input(), "zz");
        assert_eq!(shell.transcript().len(), len);
    }

    #[test]
    fn two_downloads_interleave_and_both_land() {
        let mut shell = Shell::with_seed(7);
        shell.submit_line("wget http://a.example/one.bin");
        shell.submit_line("wget http://b.example/two.bin");
        let running = shell.running_tasks();
        assert_eq!(running.len(), 2);
        assert!(running.iter().all(|(_, name)| *name == "wget"));
        while !shell.tasks_idle() {
            shell.tick();
        }
        assert!(shell.fs().exists("~/one.bin"));
        assert!(shell.fs().exists("~/two.bin"));
    }

    #[test]
    fn dot_segments_stay_literal() {
        // Relative `.` and `..` are not normalized; they name literal
        // children and never resolve, matching the path resolver.
        let mut shell = Shell::new();
        shell.submit_line("cd documents");
        shell.submit_line("cd ..");
        assert_eq!(shell.cwd(), "~/documents");
        let out = shell.transcript().last().unwrap();
        assert_eq!(out.text, "cd: ..: No such file or directory");
    }

    fn command_line() -> impl Strategy<Value = String> {
        let name = prop_oneof![
            proptest::sample::select(
                CommandKind::NAMES.iter().map(|(n, _)| *n).collect::<Vec<_>>()
            )
            .prop_map(str::to_string),
            "[a-z]{1,8}",
        ];
        let args = proptest::collection::vec("[ -~]{0,10}", 0..4);
        (name, args).prop_map(|(name, args)| {
            let mut line = name;
            for arg in args {
                line.push(' ');
                line.push_str(&arg);
            }
            line
        })
    }

    proptest! {
        #[test]
        fn arbitrary_input_never_panics(lines in proptest::collection::vec(command_line(), 1..20)) {
            let mut shell = Shell::with_seed(42);
            for line in &lines {
                shell.submit_line(line);
            }
            while !shell.tasks_idle() {
                shell.tick();
            }
        }

        #[test]
        fn cwd_is_always_canonical(lines in proptest::collection::vec(command_line(), 1..20)) {
            let mut shell = Shell::with_seed(42);
            for line in &lines {
                shell.submit_line(line);
                prop_assert!(shell.cwd().starts_with('~'));
                prop_assert!(shell.fs().exists(shell.cwd()));
            }
        }

        #[test]
        fn transcript_only_grows_without_clear(lines in proptest::collection::vec(command_line(), 1..20)) {
            let mut shell = Shell::with_seed(42);
            for line in &lines {
                let before = shell.transcript().len();
                shell.submit_line(line);
                if !line.trim().starts_with("clear") {
                    prop_assert!(shell.transcript().len() > before);
                }
            }
        }

        #[test]
        fn history_records_trimmed_non_empty_lines(lines in proptest::collection::vec("[ -~]{0,20}", 1..20)) {
            let mut shell = Shell::with_seed(42);
            let mut expected = Vec::new();
            for line in &lines {
                shell.submit_line(line);
                if !line.trim().is_empty() {
                    expected.push(line.trim().to_string());
                }
            }
            prop_assert_eq!(shell.session().history(), expected.as_slice());
        }
    }
}
