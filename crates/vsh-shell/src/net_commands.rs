//! Simulated network commands: wget, curl, ping.
//!
//! Each one validates its arguments synchronously, emits any preamble
//! lines, and hands the rest of the work to the task scheduler as a
//! deferred [`Task`].

use vsh_types::{Result, ShellError};
use vsh_vfs::resolve;

use crate::shell::{Action, Ctx};
use crate::task::{Task, TaskKind};

pub(crate) fn wget(args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    let Some(url) = args.iter().copied().find(|a| !a.is_empty()) else {
        return Err(ShellError::MissingOperand("wget: missing URL".to_string()));
    };
    let url = url.to_string();

    // Output name: -O override, else the last path segment of the URL.
    let mut dest = url.rsplit('/').next().unwrap_or_default().to_string();
    if let Some(pos) = args.iter().position(|a| *a == "-O") {
        if let Some(name) = args.get(pos + 1).filter(|a| !a.is_empty()) {
            dest = name.to_string();
        }
    }
    if dest.is_empty() {
        dest = "file".to_string();
    }

    let preamble = vec![
        format!(
            "--{}--  {url}",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ")
        ),
        "Resolving github.com... 140.82.121.4".to_string(),
        "Connecting to github.com|140.82.121.4|:443... connected.".to_string(),
        "HTTP request sent, awaiting response... 200 OK".to_string(),
        format!(
            "Length: {} ({:.1}M) [application/octet-stream]",
            ctx.rng.below(10_000_000),
            ctx.rng.float(0.0, 10.0)
        ),
        format!("Saving to: '{dest}'"),
        String::new(),
    ];
    let dest_path = resolve(&dest, ctx.session.cwd());
    Ok(Action::Spawn {
        preamble,
        task: Task::new(TaskKind::Wget {
            url,
            dest_raw: dest,
            dest_path,
        }),
    })
}

pub(crate) fn curl(args: &[&str], _ctx: &mut Ctx<'_>) -> Result<Action> {
    let url = args
        .iter()
        .copied()
        .find(|a| !a.is_empty() && !a.starts_with('-'))
        .or_else(|| args.iter().copied().find(|a| !a.is_empty()));
    let Some(url) = url else {
        return Err(ShellError::MissingOperand(
            "curl: no URL specified".to_string(),
        ));
    };
    Ok(Action::Spawn {
        preamble: Vec::new(),
        task: Task::new(TaskKind::Curl {
            url: url.to_string(),
        }),
    })
}

pub(crate) fn ping(args: &[&str], _ctx: &mut Ctx<'_>) -> Result<Action> {
    let Some(host) = args.iter().copied().find(|a| !a.is_empty()) else {
        return Err(ShellError::MissingOperand("ping: missing host".to_string()));
    };
    Ok(Action::Spawn {
        preamble: vec![format!("PING {host} (93.184.216.34): 56 data bytes")],
        task: Task::new(TaskKind::Ping {
            host: host.to_string(),
        }),
    })
}
