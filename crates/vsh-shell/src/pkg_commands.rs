//! Package managers: apt, npm, pip, winget.
//!
//! Queries (`list`, removals, already-installed checks) answer
//! synchronously; installs spawn a deferred task whose completion side
//! effect registers the package under its manager's namespace prefix.

use vsh_types::{Result, ShellError};
use vsh_vfs::resolve;

use crate::shell::{Action, Ctx};
use crate::task::{Task, TaskKind};

fn operands<'a>(args: &[&'a str]) -> Vec<&'a str> {
    args.iter().copied().filter(|a| !a.is_empty()).collect()
}

pub(crate) fn apt(args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    const USAGE: &str = "Usage: apt [install|remove|list|update] <package>";
    let args = operands(args);
    match args.as_slice() {
        [] => Ok(Action::Lines(vec![USAGE.to_string()])),
        ["update", ..] => Ok(Action::Spawn {
            preamble: vec![
                "Hit:1 http://archive.ubuntu.com/ubuntu focal InRelease".to_string(),
                "Reading package lists...".to_string(),
            ],
            task: Task::new(TaskKind::AptUpdate),
        }),
        ["list", ..] => {
            let mut lines = vec!["Installed packages:".to_string()];
            lines.extend(ctx.session.installed_bare().iter().map(|p| format!("  {p}")));
            Ok(Action::Lines(lines))
        }
        ["install", package, ..] => {
            if ctx.session.is_installed(package) {
                return Err(ShellError::AlreadySatisfied(format!(
                    "{package} is already the newest version"
                )));
            }
            let preamble = vec![
                "Reading package lists...".to_string(),
                "Building dependency tree...".to_string(),
                "The following NEW packages will be installed:".to_string(),
                format!("  {package}"),
                "0 upgraded, 1 newly installed, 0 to remove".to_string(),
                format!("Need to get {}kB of archives.", ctx.rng.below(5000)),
                format!(
                    "Get:1 http://archive.ubuntu.com/ubuntu focal/main amd64 {package} amd64 1.0 [{}kB]",
                    ctx.rng.below(1000)
                ),
            ];
            Ok(Action::Spawn {
                preamble,
                task: Task::new(TaskKind::AptInstall {
                    package: package.to_string(),
                }),
            })
        }
        ["remove", package, ..] => {
            if !ctx.session.uninstall(package) {
                return Err(ShellError::NotInstalled(format!(
                    "Package '{package}' is not installed"
                )));
            }
            Ok(Action::Lines(vec![
                format!("Removing {package}..."),
                "Done.".to_string(),
            ]))
        }
        _ => Ok(Action::Lines(vec![USAGE.to_string()])),
    }
}

pub(crate) fn npm(args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    const USAGE: &str = "Usage: npm [install|uninstall|list|init] <package>";
    let args = operands(args);
    match args.as_slice() {
        [] => Ok(Action::Lines(vec![USAGE.to_string()])),
        ["init", ..] => Ok(Action::Spawn {
            preamble: vec![
                "This utility will walk you through creating a package.json file.".to_string(),
            ],
            task: Task::new(TaskKind::NpmInit {
                dest_path: resolve("package.json", ctx.session.cwd()),
            }),
        }),
        ["list", ..] | ["ls", ..] => {
            let packages = ctx.session.installed_with_prefix("npm:");
            if packages.is_empty() {
                return Ok(Action::Lines(vec!["(empty)".to_string()]));
            }
            Ok(Action::Lines(
                packages
                    .iter()
                    .map(|p| format!("├── {}@latest", &p["npm:".len()..]))
                    .collect(),
            ))
        }
        ["install", package, ..] => {
            if ctx.session.is_installed(&format!("npm:{package}")) {
                return Err(ShellError::AlreadySatisfied(
                    "up to date, audited 1 package in 0.5s".to_string(),
                ));
            }
            let preamble = vec![
                String::new(),
                format!(
                    "added 1 package, and audited 2 packages in {:.1}s",
                    ctx.rng.float(1.0, 4.0)
                ),
            ];
            Ok(Action::Spawn {
                preamble,
                task: Task::new(TaskKind::NpmInstall {
                    package: package.to_string(),
                }),
            })
        }
        ["uninstall", package, ..] => {
            if !ctx.session.uninstall(&format!("npm:{package}")) {
                return Err(ShellError::NotInstalled(format!(
                    "npm ERR! Cannot find module '{package}'"
                )));
            }
            Ok(Action::Lines(vec!["removed 1 package in 0.4s".to_string()]))
        }
        _ => Ok(Action::Lines(vec![USAGE.to_string()])),
    }
}

pub(crate) fn pip(args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    const USAGE: &str = "Usage: pip [install|uninstall|list] <package>";
    let args = operands(args);
    match args.as_slice() {
        [] => Ok(Action::Lines(vec![USAGE.to_string()])),
        ["list", ..] => {
            let packages = ctx.session.installed_with_prefix("pip:");
            if packages.is_empty() {
                return Ok(Action::Lines(vec!["(empty)".to_string()]));
            }
            let mut lines = vec![
                "Package    Version".to_string(),
                "---------- -------".to_string(),
            ];
            for p in packages {
                lines.push(format!(
                    "{:<10} {:.1}.0",
                    &p["pip:".len()..],
                    ctx.rng.float(0.0, 10.0)
                ));
            }
            Ok(Action::Lines(lines))
        }
        ["install", package, ..] => {
            if ctx.session.is_installed(&format!("pip:{package}")) {
                return Err(ShellError::AlreadySatisfied(format!(
                    "Requirement already satisfied: {package}"
                )));
            }
            let version = format!(
                "{}.{}.{}",
                ctx.rng.below(10),
                ctx.rng.below(10),
                ctx.rng.below(10)
            );
            let size = ctx.rng.below(500);
            let preamble = vec![
                format!("Collecting {package}"),
                format!("  Downloading {package}-{version}-py3-none-any.whl ({size} kB)"),
                format!("     |████████████████████████████████| {size} kB 1.2 MB/s"),
            ];
            Ok(Action::Spawn {
                preamble,
                task: Task::new(TaskKind::PipInstall {
                    package: package.to_string(),
                    version,
                }),
            })
        }
        ["uninstall", package, ..] => {
            if !ctx.session.uninstall(&format!("pip:{package}")) {
                return Err(ShellError::NotInstalled(format!(
                    "WARNING: Skipping {package} as it is not installed."
                )));
            }
            Ok(Action::Lines(vec![format!(
                "Successfully uninstalled {package}"
            )]))
        }
        _ => Ok(Action::Lines(vec![USAGE.to_string()])),
    }
}

pub(crate) fn winget(args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    let args = operands(args);
    let Some((sub, rest)) = args.split_first() else {
        return Err(ShellError::MissingOperand(
            "winget: missing command".to_string(),
        ));
    };
    if *sub != "install" {
        return Ok(Action::Lines(vec!["winget: unknown command".to_string()]));
    }

    // `--id NAME` wins over a positional package name.
    let package = match rest.iter().position(|a| *a == "--id") {
        Some(pos) => rest.get(pos + 1).copied(),
        None => rest.first().copied(),
    };
    let Some(package) = package else {
        return Err(ShellError::MissingOperand(
            "winget: missing package name".to_string(),
        ));
    };
    if ctx.session.is_installed(&format!("winget:{package}")) {
        return Err(ShellError::AlreadySatisfied(format!(
            "{package} is already installed."
        )));
    }
    let preamble = vec![
        format!("Found {package} [{package}]"),
        "This application is licensed to you by its owner.".to_string(),
        "Microsoft is not responsible for, nor does it grant any licenses to, \
         third-party packages."
            .to_string(),
        format!("Downloading {package}..."),
    ];
    Ok(Action::Spawn {
        preamble,
        task: Task::new(TaskKind::WingetInstall {
            package: package.to_string(),
        }),
    })
}

#[cfg(test)]
mod tests {
    use crate::shell::Shell;
    use vsh_types::LineKind;

    fn output_after(shell: &mut Shell, line: &str) -> Vec<String> {
        let before = shell.transcript().len();
        shell.submit_line(line);
        shell.transcript()[before..]
            .iter()
            .filter(|l| l.kind == LineKind::Output)
            .map(|l| l.text.clone())
            .collect()
    }

    fn drain(shell: &mut Shell) {
        while !shell.tasks_idle() {
            shell.tick();
        }
    }

    #[test]
    fn apt_install_registers_after_completion_only() {
        let mut shell = Shell::new();
        shell.submit_line("apt install vim");
        assert!(!shell.session().is_installed("vim"));
        drain(&mut shell);
        assert!(shell.session().is_installed("vim"));
        let out = output_after(&mut shell, "apt install vim");
        assert_eq!(out, vec!["vim is already the newest version"]);
    }

    #[test]
    fn apt_list_and_remove() {
        let mut shell = Shell::new();
        let out = output_after(&mut shell, "apt list");
        assert_eq!(out, vec!["Installed packages:", "  base-system"]);
        shell.submit_line("apt install vim");
        drain(&mut shell);
        let out = output_after(&mut shell, "apt remove vim");
        assert_eq!(out, vec!["Removing vim...", "Done."]);
        let out = output_after(&mut shell, "apt remove vim");
        assert_eq!(out, vec!["Package 'vim' is not installed"]);
    }

    #[test]
    fn apt_usage_lines() {
        let mut shell = Shell::new();
        let usage = "Usage: apt [install|remove|list|update] <package>";
        assert_eq!(output_after(&mut shell, "apt"), vec![usage]);
        assert_eq!(output_after(&mut shell, "apt install"), vec![usage]);
        assert_eq!(output_after(&mut shell, "apt frobnicate"), vec![usage]);
    }

    #[test]
    fn apt_update_finishes_in_one_tick() {
        let mut shell = Shell::new();
        let pre = output_after(&mut shell, "apt update");
        assert_eq!(pre.len(), 2);
        drain(&mut shell);
        let text: Vec<String> = shell.transcript().iter().map(|l| l.text.clone()).collect();
        assert!(text.contains(&"All packages are up to date.".to_string()));
    }

    #[test]
    fn npm_init_writes_package_json_in_cwd() {
        let mut shell = Shell::new();
        shell.submit_line("cd documents");
        shell.submit_line("npm init");
        drain(&mut shell);
        let content = shell.fs().read("~/documents/package.json").unwrap();
        assert!(content.contains("\"name\": \"my-project\""));
    }

    #[test]
    fn npm_list_uses_namespace() {
        let mut shell = Shell::new();
        assert_eq!(output_after(&mut shell, "npm list"), vec!["(empty)"]);
        shell.submit_line("npm install express");
        drain(&mut shell);
        assert_eq!(
            output_after(&mut shell, "npm list"),
            vec!["├── express@latest"]
        );
        // The apt view is unaffected.
        let out = output_after(&mut shell, "apt list");
        assert!(!out.iter().any(|l| l.contains("express")));
    }

    #[test]
    fn npm_uninstall_paths() {
        let mut shell = Shell::new();
        let out = output_after(&mut shell, "npm uninstall express");
        assert_eq!(out, vec!["npm ERR! Cannot find module 'express'"]);
        shell.submit_line("npm install express");
        drain(&mut shell);
        let out = output_after(&mut shell, "npm uninstall express");
        assert_eq!(out, vec!["removed 1 package in 0.4s"]);
    }

    #[test]
    fn pip_install_and_reinstall() {
        let mut shell = Shell::new();
        let pre = output_after(&mut shell, "pip install requests");
        assert_eq!(pre[0], "Collecting requests");
        drain(&mut shell);
        assert!(shell.session().is_installed("pip:requests"));
        let out = output_after(&mut shell, "pip install requests");
        assert_eq!(out, vec!["Requirement already satisfied: requests"]);
    }

    #[test]
    fn pip_uninstall_warns_when_missing() {
        let mut shell = Shell::new();
        let out = output_after(&mut shell, "pip uninstall requests");
        assert_eq!(
            out,
            vec!["WARNING: Skipping requests as it is not installed."]
        );
    }

    #[test]
    fn pip_list_header() {
        let mut shell = Shell::new();
        assert_eq!(output_after(&mut shell, "pip list"), vec!["(empty)"]);
        shell.submit_line("pip install requests");
        drain(&mut shell);
        let out = output_after(&mut shell, "pip list");
        assert_eq!(out[0], "Package    Version");
        assert!(out[2].starts_with("requests"));
    }

    #[test]
    fn winget_install_flow() {
        let mut shell = Shell::new();
        let pre = output_after(&mut shell, "winget install --id Git.Git");
        assert_eq!(pre[0], "Found Git.Git [Git.Git]");
        drain(&mut shell);
        assert!(shell.session().is_installed("winget:Git.Git"));
        let out = output_after(&mut shell, "winget install Git.Git");
        assert_eq!(out, vec!["Git.Git is already installed."]);
    }

    #[test]
    fn winget_argument_errors() {
        let mut shell = Shell::new();
        assert_eq!(
            output_after(&mut shell, "winget"),
            vec!["winget: missing command"]
        );
        assert_eq!(
            output_after(&mut shell, "winget install"),
            vec!["winget: missing package name"]
        );
        assert_eq!(
            output_after(&mut shell, "winget upgrade"),
            vec!["winget: unknown command"]
        );
    }
}
