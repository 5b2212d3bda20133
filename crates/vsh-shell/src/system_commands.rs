//! Session and system-report commands: help, clear, echo, date, whoami,
//! uname, env, export, ps, kill, top, df, free, weather, history.
//!
//! The system reports (top, df, free, weather) are fixed snapshots; only
//! `ps` reflects live state, by listing the scheduler's running tasks.

use vsh_types::{Result, ShellError};

use crate::shell::{Action, Ctx};

pub(crate) fn help(_args: &[&str], _ctx: &mut Ctx<'_>) -> Result<Action> {
    Ok(Action::Lines(vec![
        "Available commands:".to_string(),
        "  Basic: help, clear, echo, date, whoami, uname, env".to_string(),
        "  Files: ls, cd, pwd, cat, touch, mkdir, rm, cp, mv, chmod".to_string(),
        "  Network: wget, curl, ping".to_string(),
        "  Packages: apt, npm, pip, winget".to_string(),
        "  System: ps, kill, top, df, du, free".to_string(),
        "  Text: grep, find, head, tail, wc, nano".to_string(),
        "  Other: calc, weather, history, export".to_string(),
        String::new(),
        "Use <command> --help for detailed usage".to_string(),
    ]))
}

pub(crate) fn clear(_args: &[&str], _ctx: &mut Ctx<'_>) -> Result<Action> {
    Ok(Action::Clear)
}

/// Join the arguments and substitute `$NAME` references from the session
/// environment. Unknown names expand to the empty string.
pub(crate) fn echo(args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    let joined = args.join(" ");
    let mut out = String::with_capacity(joined.len());
    let mut chars = joined.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let mut name = String::new();
        while let Some(&next) = chars.peek() {
            if next.is_ascii_alphanumeric() || next == '_' {
                name.push(next);
                chars.next();
            } else {
                break;
            }
        }
        if name.is_empty() {
            out.push('$');
        } else if let Some(value) = ctx.session.env_get(&name) {
            out.push_str(value);
        }
    }
    Ok(Action::Lines(vec![out]))
}

pub(crate) fn date(_args: &[&str], _ctx: &mut Ctx<'_>) -> Result<Action> {
    Ok(Action::Lines(vec![chrono::Local::now()
        .format("%a %b %e %T %Y")
        .to_string()]))
}

pub(crate) fn whoami(_args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    Ok(Action::Lines(vec![ctx
        .session
        .env_get("USER")
        .unwrap_or_default()
        .to_string()]))
}

pub(crate) fn uname(args: &[&str], _ctx: &mut Ctx<'_>) -> Result<Action> {
    let line = if args.contains(&"-a") {
        "vsh 0.1.0 Web x86_64 GNU/Linux"
    } else {
        "vsh"
    };
    Ok(Action::Lines(vec![line.to_string()]))
}

pub(crate) fn env(_args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    Ok(Action::Lines(
        ctx.session
            .env_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect(),
    ))
}

pub(crate) fn export(args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    let Some(first) = args.iter().copied().find(|a| !a.is_empty()) else {
        return env(args, ctx);
    };
    let Some((name, value)) = split_assignment(first) else {
        return Err(ShellError::InvalidSyntax(
            "export: invalid syntax".to_string(),
        ));
    };
    ctx.session.env_set(name, value);
    Ok(Action::Lines(Vec::new()))
}

/// `NAME=value` where NAME is one or more word characters. The value may
/// be empty and may itself contain `=`.
fn split_assignment(arg: &str) -> Option<(&str, &str)> {
    let eq = arg.find('=')?;
    let name = &arg[..eq];
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some((name, &arg[eq + 1..]))
}

pub(crate) fn ps(_args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    let mut lines = vec![
        "PID TTY          TIME CMD".to_string(),
        "  1 pts/0    00:00:00 bash".to_string(),
        "  2 pts/0    00:00:01 vsh".to_string(),
    ];
    for (id, task) in ctx.tasks.running() {
        lines.push(format!(
            "{:>3} pts/0    00:00:00 {}",
            id.value(),
            task.command()
        ));
    }
    lines.push(" 42 pts/0    00:00:00 ps".to_string());
    Ok(Action::Lines(lines))
}

pub(crate) fn kill(args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    let Some(arg) = args.iter().copied().find(|a| !a.is_empty()) else {
        return Err(ShellError::MissingOperand(
            "kill: missing operand".to_string(),
        ));
    };
    let pid: u64 = arg.parse().map_err(|_| {
        ShellError::InvalidSyntax(format!(
            "kill: {arg}: arguments must be process or job IDs"
        ))
    })?;
    match ctx.tasks.find(pid).and_then(|id| ctx.tasks.cancel(id)) {
        Some(command) => {
            log::debug!("killed task {pid} ({command})");
            Ok(Action::Lines(Vec::new()))
        }
        None => Err(ShellError::NotFound(format!(
            "kill: ({pid}) - No such process"
        ))),
    }
}

pub(crate) fn top(_args: &[&str], _ctx: &mut Ctx<'_>) -> Result<Action> {
    Ok(Action::Lines(
        [
            "top - 12:34:56 up 1 day, 2:30, 1 user",
            "Tasks: 3 total, 1 running, 2 sleeping",
            "CPU: 5.2% user, 2.1% system",
            "Memory: 512M total, 256M used, 256M free",
            "",
            "PID USER      CPU% MEM%   TIME COMMAND",
            "  1 guest      0.0  0.1   0:00 bash",
            "  2 guest      2.1  1.5   0:01 vsh",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    ))
}

pub(crate) fn df(_args: &[&str], _ctx: &mut Ctx<'_>) -> Result<Action> {
    Ok(Action::Lines(
        [
            "Filesystem     1K-blocks    Used Available Use% Mounted on",
            "/dev/sda1       10485760 5242880   5242880  50% /",
            "tmpfs             524288   52428    471860  10% /tmp",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    ))
}

pub(crate) fn free(_args: &[&str], _ctx: &mut Ctx<'_>) -> Result<Action> {
    Ok(Action::Lines(
        [
            "              total        used        free      shared",
            "Mem:         524288      262144      262144        1024",
            "Swap:        524288           0      524288",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    ))
}

pub(crate) fn weather(_args: &[&str], _ctx: &mut Ctx<'_>) -> Result<Action> {
    Ok(Action::Lines(
        [
            "🌤️  Weather in Tokyo:",
            "   Temperature: 12°C",
            "   Conditions: Partly Cloudy",
            "   Humidity: 65%",
            "   Wind: 10 km/h NE",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    ))
}

pub(crate) fn history(_args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    Ok(Action::Lines(
        ctx.session
            .history()
            .iter()
            .enumerate()
            .map(|(i, line)| format!("  {}  {line}", i + 1))
            .collect(),
    ))
}
