//! Deferred-task simulator.
//!
//! Time-extended commands (downloads, installs, pings) return a [`Task`]
//! instead of output. The host drives [`TaskScheduler::tick`] from its own
//! clock; each tick advances every running task by its command-specific
//! step, emits that task's progress lines, and, on reaching 100, surfaces
//! the completion side effect exactly once.
//!
//! Tasks are independent: two running tasks interleave their lines in
//! whatever order the scheduler visits them, and nothing stops a task
//! except completion or an explicit [`TaskScheduler::cancel`] (the `kill`
//! command).

use crate::rng::Lcg;

/// Identifier of a spawned task, also shown as its `ps` pid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// State change applied when a task completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    /// Write a file node (downloads, `npm init`).
    WriteFile { path: String, content: String },
    /// Register a namespaced package id as installed.
    InstallPackage { id: String },
}

/// What a deferred command is simulating.
#[derive(Debug, Clone)]
pub enum TaskKind {
    Wget {
        url: String,
        /// Output name as the user typed it (shown in the transcript).
        dest_raw: String,
        /// Canonical path the file is written to on completion.
        dest_path: String,
    },
    Curl {
        url: String,
    },
    Ping {
        host: String,
    },
    AptUpdate,
    AptInstall {
        package: String,
    },
    NpmInit {
        /// Canonical path of the package.json to write.
        dest_path: String,
    },
    NpmInstall {
        package: String,
    },
    PipInstall {
        package: String,
        version: String,
    },
    WingetInstall {
        package: String,
    },
}

/// Result of advancing a task by one tick.
#[derive(Debug)]
pub struct TaskTick {
    pub lines: Vec<String>,
    pub completed: bool,
    /// Present only on the completing tick.
    pub effect: Option<SideEffect>,
}

/// A deferred command in flight: progress runs 0 to 100 in
/// command-specific steps.
#[derive(Debug, Clone)]
pub struct Task {
    kind: TaskKind,
    progress: u8,
}

impl Task {
    pub fn new(kind: TaskKind) -> Self {
        Self { kind, progress: 0 }
    }

    /// The command that spawned this task.
    pub fn command(&self) -> &'static str {
        match self.kind {
            TaskKind::Wget { .. } => "wget",
            TaskKind::Curl { .. } => "curl",
            TaskKind::Ping { .. } => "ping",
            TaskKind::AptUpdate | TaskKind::AptInstall { .. } => "apt",
            TaskKind::NpmInit { .. } | TaskKind::NpmInstall { .. } => "npm",
            TaskKind::PipInstall { .. } => "pip",
            TaskKind::WingetInstall { .. } => "winget",
        }
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    fn step(&self) -> u8 {
        match self.kind {
            TaskKind::Wget { .. } => 15,
            TaskKind::Ping { .. } => 25,
            TaskKind::AptInstall { .. } => 50,
            TaskKind::WingetInstall { .. } => 20,
            TaskKind::Curl { .. }
            | TaskKind::AptUpdate
            | TaskKind::NpmInit { .. }
            | TaskKind::NpmInstall { .. }
            | TaskKind::PipInstall { .. } => 100,
        }
    }

    /// Advance one tick: bump progress, emit this tick's lines, and on
    /// reaching 100 report completion plus the side effect.
    pub fn tick(&mut self, rng: &mut Lcg) -> TaskTick {
        self.progress = self.progress.saturating_add(self.step()).min(100);
        let p = self.progress;
        let done = p >= 100;

        let mut lines = Vec::new();
        let mut effect = None;

        match &self.kind {
            TaskKind::Wget {
                url,
                dest_raw,
                dest_path,
            } => {
                let filled = usize::from(p / 5);
                lines.push(format!(
                    "[{}>{}] {p}%",
                    "=".repeat(filled),
                    " ".repeat(20 - filled)
                ));
                if done {
                    lines.push(String::new());
                    lines.push(format!("'{dest_raw}' saved"));
                    lines.push(String::new());
                    effect = Some(SideEffect::WriteFile {
                        path: dest_path.clone(),
                        content: format!("Downloaded from {url}"),
                    });
                }
            }
            TaskKind::Curl { url } => {
                lines.push("HTTP/1.1 200 OK".to_string());
                lines.push("Content-Type: text/html".to_string());
                lines.push(String::new());
                lines.push(format!("<html><body>Content from {url}</body></html>"));
            }
            TaskKind::Ping { host } => {
                let seq = p / 25 - 1;
                let time = rng.float(10.0, 60.0);
                lines.push(format!(
                    "64 bytes from {host}: icmp_seq={seq} ttl=64 time={time:.1} ms"
                ));
                if done {
                    lines.push(String::new());
                    lines.push(format!("--- {host} ping statistics ---"));
                    lines.push("4 packets transmitted, 4 received, 0% packet loss".to_string());
                }
            }
            TaskKind::AptUpdate => {
                lines.push("All packages are up to date.".to_string());
            }
            TaskKind::AptInstall { package } => {
                if p == 50 {
                    lines.push(format!("Fetched {}kB in 2s", rng.below(5000)));
                    lines.push(format!("Unpacking {package}..."));
                    lines.push(format!("Setting up {package}..."));
                } else {
                    lines.push("Processing triggers...".to_string());
                    lines.push("Done.".to_string());
                    effect = Some(SideEffect::InstallPackage {
                        id: package.clone(),
                    });
                }
            }
            TaskKind::NpmInit { dest_path } => {
                lines.push("Wrote to package.json".to_string());
                effect = Some(SideEffect::WriteFile {
                    path: dest_path.clone(),
                    content: "{\n  \"name\": \"my-project\",\n  \"version\": \"1.0.0\"\n}"
                        .to_string(),
                });
            }
            TaskKind::NpmInstall { package } => {
                lines.push("found 0 vulnerabilities".to_string());
                effect = Some(SideEffect::InstallPackage {
                    id: format!("npm:{package}"),
                });
            }
            TaskKind::PipInstall { package, version } => {
                lines.push(format!("Installing collected packages: {package}"));
                lines.push(format!("Successfully installed {package}-{version}"));
                effect = Some(SideEffect::InstallPackage {
                    id: format!("pip:{package}"),
                });
            }
            TaskKind::WingetInstall { package } => {
                let filled = usize::from(p / 5);
                lines.push(format!(
                    "  ██{}{}  {p}%",
                    "█".repeat(filled),
                    "░".repeat(20 - filled)
                ));
                if done {
                    lines.push(format!("Successfully installed {package}"));
                    lines.push(String::new());
                    effect = Some(SideEffect::InstallPackage {
                        id: format!("winget:{package}"),
                    });
                }
            }
        }

        TaskTick {
            lines,
            completed: done,
            effect,
        }
    }
}

/// Holds running tasks and drives them tick by tick.
#[derive(Debug, Default)]
pub struct TaskScheduler {
    next_id: u64,
    tasks: Vec<(TaskId, Task)>,
}

/// First task id; keeps task pids clear of the synthetic `ps` rows.
const FIRST_TASK_ID: u64 = 100;

impl TaskScheduler {
    pub fn new() -> Self {
        Self {
            next_id: FIRST_TASK_ID,
            tasks: Vec::new(),
        }
    }

    /// Register a task and return its id.
    pub fn spawn(&mut self, task: Task) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        log::debug!("spawned task {id} ({})", task.command());
        self.tasks.push((id, task));
        id
    }

    /// Cancel a running task. Its side effect never happens. Returns the
    /// command name of the cancelled task, or `None` for an unknown id.
    pub fn cancel(&mut self, id: TaskId) -> Option<&'static str> {
        let pos = self.tasks.iter().position(|(tid, _)| *tid == id)?;
        let (_, task) = self.tasks.remove(pos);
        log::debug!("cancelled task {id} ({})", task.command());
        Some(task.command())
    }

    /// Look up a task id by its numeric value.
    pub fn find(&self, pid: u64) -> Option<TaskId> {
        self.tasks
            .iter()
            .map(|(id, _)| *id)
            .find(|id| id.value() == pid)
    }

    /// Currently running tasks.
    pub fn running(&self) -> impl Iterator<Item = (TaskId, &Task)> {
        self.tasks.iter().map(|(id, task)| (*id, task))
    }

    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tick every running task once, removing the ones that completed.
    ///
    /// Relative ordering between independent tasks is an implementation
    /// detail (spawn order here); within one task, lines and the side
    /// effect come out in tick order.
    pub fn tick(&mut self, rng: &mut Lcg) -> Vec<(TaskId, TaskTick)> {
        let mut out = Vec::new();
        for (id, task) in &mut self.tasks {
            let tick = task.tick(rng);
            if tick.completed {
                log::debug!("task {id} ({}) completed", task.command());
            }
            out.push((*id, tick));
        }
        self.tasks.retain(|(id, _)| {
            !out.iter()
                .any(|(done_id, tick)| done_id == id && tick.completed)
        });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> Lcg {
        Lcg::new(1234)
    }

    #[test]
    fn wget_reaches_completion_in_seven_ticks() {
        let mut task = Task::new(TaskKind::Wget {
            url: "https://example.com/tool.tar.gz".into(),
            dest_raw: "tool.tar.gz".into(),
            dest_path: "~/tool.tar.gz".into(),
        });
        let mut rng = rng();
        let mut ticks = 0;
        let mut effects = 0;
        loop {
            ticks += 1;
            let t = task.tick(&mut rng);
            if t.effect.is_some() {
                effects += 1;
            }
            if t.completed {
                break;
            }
        }
        assert_eq!(ticks, 7); // 15% per tick, clamped at 100
        assert_eq!(effects, 1);
        assert_eq!(task.progress(), 100);
    }

    #[test]
    fn wget_final_tick_writes_the_download() {
        let mut task = Task::new(TaskKind::Wget {
            url: "https://example.com/x".into(),
            dest_raw: "x".into(),
            dest_path: "~/x".into(),
        });
        let mut rng = rng();
        let mut last = task.tick(&mut rng);
        while !last.completed {
            last = task.tick(&mut rng);
        }
        assert!(last.lines.iter().any(|l| l == "'x' saved"));
        assert_eq!(
            last.effect,
            Some(SideEffect::WriteFile {
                path: "~/x".into(),
                content: "Downloaded from https://example.com/x".into(),
            })
        );
    }

    #[test]
    fn wget_progress_bar_shape() {
        let mut task = Task::new(TaskKind::Wget {
            url: "u".into(),
            dest_raw: "f".into(),
            dest_path: "~/f".into(),
        });
        let first = task.tick(&mut rng());
        assert_eq!(first.lines[0], "[===>                 ] 15%");
    }

    #[test]
    fn ping_emits_four_replies_then_statistics() {
        let mut task = Task::new(TaskKind::Ping {
            host: "example.com".into(),
        });
        let mut rng = rng();
        let mut replies = 0;
        let mut all_lines = Vec::new();
        loop {
            let t = task.tick(&mut rng);
            replies += t
                .lines
                .iter()
                .filter(|l| l.starts_with("64 bytes from"))
                .count();
            let done = t.completed;
            all_lines.extend(t.lines);
            if done {
                break;
            }
        }
        assert_eq!(replies, 4);
        assert!(all_lines.contains(&"--- example.com ping statistics ---".to_string()));
        assert!(all_lines
            .contains(&"4 packets transmitted, 4 received, 0% packet loss".to_string()));
    }

    #[test]
    fn apt_install_applies_bare_package_id() {
        let mut task = Task::new(TaskKind::AptInstall {
            package: "htop".into(),
        });
        let mut rng = rng();
        let mid = task.tick(&mut rng);
        assert!(!mid.completed);
        assert!(mid.lines.iter().any(|l| l.contains("Setting up htop")));
        let end = task.tick(&mut rng);
        assert!(end.completed);
        assert_eq!(
            end.effect,
            Some(SideEffect::InstallPackage { id: "htop".into() })
        );
    }

    #[test]
    fn winget_bar_and_namespace() {
        let mut task = Task::new(TaskKind::WingetInstall {
            package: "vscode".into(),
        });
        let mut rng = rng();
        let first = task.tick(&mut rng);
        assert_eq!(first.lines[0], "  ██████░░░░░░░░░░░░░░░░  20%");
        let mut last = first;
        while !last.completed {
            last = task.tick(&mut rng);
        }
        assert_eq!(
            last.effect,
            Some(SideEffect::InstallPackage {
                id: "winget:vscode".into()
            })
        );
    }

    #[test]
    fn scheduler_removes_completed_tasks() {
        let mut sched = TaskScheduler::new();
        sched.spawn(Task::new(TaskKind::AptUpdate));
        let mut rng = rng();
        let out = sched.tick(&mut rng);
        assert_eq!(out.len(), 1);
        assert!(out[0].1.completed);
        assert!(sched.is_idle());
        assert!(sched.tick(&mut rng).is_empty());
    }

    #[test]
    fn cancel_prevents_side_effect() {
        let mut sched = TaskScheduler::new();
        let id = sched.spawn(Task::new(TaskKind::NpmInstall {
            package: "left-pad".into(),
        }));
        assert_eq!(sched.cancel(id), Some("npm"));
        assert!(sched.cancel(id).is_none());
        assert!(sched.tick(&mut rng()).is_empty());
    }

    #[test]
    fn independent_tasks_interleave() {
        let mut sched = TaskScheduler::new();
        let wget = sched.spawn(Task::new(TaskKind::Wget {
            url: "u".into(),
            dest_raw: "f".into(),
            dest_path: "~/f".into(),
        }));
        let ping = sched.spawn(Task::new(TaskKind::Ping { host: "h".into() }));
        let mut rng = rng();
        let out = sched.tick(&mut rng);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].0, wget);
        assert_eq!(out[1].0, ping);
        // Ping finishes after 4 ticks, wget after 7; both run to the end.
        for _ in 0..3 {
            sched.tick(&mut rng);
        }
        assert_eq!(sched.running().count(), 1);
        assert_eq!(sched.running().next().unwrap().0, wget);
        for _ in 0..3 {
            sched.tick(&mut rng);
        }
        assert!(sched.is_idle());
    }

    #[test]
    fn task_ids_are_unique_and_findable() {
        let mut sched = TaskScheduler::new();
        let a = sched.spawn(Task::new(TaskKind::AptUpdate));
        let b = sched.spawn(Task::new(TaskKind::Curl { url: "u".into() }));
        assert_ne!(a, b);
        assert_eq!(sched.find(a.value()), Some(a));
        assert_eq!(sched.find(b.value()), Some(b));
        assert_eq!(sched.find(9999), None);
    }
}
