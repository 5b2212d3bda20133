//! Filesystem commands: ls, cd, pwd, cat, touch, mkdir, rm, cp, mv, chmod,
//! find, du.
//!
//! Every handler is total: bad input comes back as a `ShellError` whose
//! message is the line the transcript shows.

use vsh_types::{FsError, Result, ShellError};
use vsh_vfs::{resolve, NodeKind};

use crate::shell::{first_operand, has_flag, Action, Ctx};

pub(crate) fn ls(args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    let show_all = has_flag(args, "-a") || has_flag(args, "-la");
    let long = has_flag(args, "-l") || has_flag(args, "-la");
    let target = first_operand(args).unwrap_or(ctx.session.cwd());
    let path = resolve(target, ctx.session.cwd());

    let Some(id) = ctx.fs.get(&path) else {
        return Err(ShellError::NotFound(format!(
            "ls: cannot access '{target}': No such file or directory"
        )));
    };
    if ctx.fs.kind(id) == NodeKind::File {
        return Ok(Action::Lines(vec![target.to_string()]));
    }

    let entries = ctx
        .fs
        .children(id)
        .into_iter()
        .filter(|e| show_all || !e.name.starts_with('.'));

    let lines = if long {
        entries
            .map(|e| {
                format!(
                    "{} 1 guest guest {:>8} Dec 14 12:00 {}",
                    e.permissions, e.size, e.name
                )
            })
            .collect()
    } else {
        entries.map(|e| e.name).collect()
    };
    Ok(Action::Lines(lines))
}

pub(crate) fn cd(args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    let Some(target) = first_operand(args) else {
        ctx.session.set_cwd("~".to_string());
        return Ok(Action::Lines(Vec::new()));
    };
    if target == "~" {
        ctx.session.set_cwd("~".to_string());
        return Ok(Action::Lines(Vec::new()));
    }
    let path = resolve(target, ctx.session.cwd());
    let Some(id) = ctx.fs.get(&path) else {
        return Err(ShellError::NotFound(format!(
            "cd: {target}: No such file or directory"
        )));
    };
    if ctx.fs.kind(id) != NodeKind::Dir {
        return Err(ShellError::NotADirectory(format!(
            "cd: {target}: Not a directory"
        )));
    }
    ctx.session.set_cwd(path);
    Ok(Action::Lines(Vec::new()))
}

pub(crate) fn pwd(_args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    Ok(Action::Lines(vec![ctx.session.cwd().to_string()]))
}

pub(crate) fn cat(args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    let Some(target) = first_operand(args) else {
        return Err(ShellError::MissingOperand(
            "cat: missing file operand".to_string(),
        ));
    };
    let path = resolve(target, ctx.session.cwd());
    match ctx.fs.read(&path) {
        Ok(content) => Ok(Action::Lines(
            content.split('\n').map(str::to_string).collect(),
        )),
        Err(FsError::IsADirectory) => Err(ShellError::IsADirectory(format!(
            "cat: {target}: Is a directory"
        ))),
        Err(_) => Err(ShellError::NotFound(format!(
            "cat: {target}: No such file or directory"
        ))),
    }
}

pub(crate) fn touch(args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    let Some(target) = first_operand(args) else {
        return Err(ShellError::MissingOperand(
            "touch: missing file operand".to_string(),
        ));
    };
    let path = resolve(target, ctx.session.cwd());
    if ctx.fs.touch(&path).is_err() {
        return Err(ShellError::NotADirectory(format!(
            "touch: {target}: Not a directory"
        )));
    }
    Ok(Action::Lines(Vec::new()))
}

pub(crate) fn mkdir(args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    let Some(target) = first_operand(args) else {
        return Err(ShellError::MissingOperand(
            "mkdir: missing operand".to_string(),
        ));
    };
    let path = resolve(target, ctx.session.cwd());
    if ctx.fs.set_dir(&path).is_err() {
        return Err(ShellError::NotADirectory(format!(
            "mkdir: {target}: Not a directory"
        )));
    }
    Ok(Action::Lines(Vec::new()))
}

pub(crate) fn rm(args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    let recursive = has_flag(args, "-r") || has_flag(args, "-rf");
    let force = has_flag(args, "-f") || has_flag(args, "-rf");
    let Some(target) = first_operand(args) else {
        return Err(ShellError::MissingOperand(
            "rm: missing operand".to_string(),
        ));
    };
    let path = resolve(target, ctx.session.cwd());
    let Some(id) = ctx.fs.get(&path) else {
        if force {
            return Ok(Action::Lines(Vec::new()));
        }
        return Err(ShellError::NotFound(format!(
            "rm: cannot remove '{target}': No such file or directory"
        )));
    };
    if ctx.fs.kind(id) == NodeKind::Dir && !recursive {
        return Err(ShellError::IsADirectory(format!(
            "rm: cannot remove '{target}': Is a directory"
        )));
    }
    // The node exists, so removal cannot fail.
    let _ = ctx.fs.remove(&path);
    Ok(Action::Lines(Vec::new()))
}

pub(crate) fn cp(args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    let (src, dst) = two_operands(args, "cp")?;
    copy_node(ctx, src, dst, "cp")?;
    Ok(Action::Lines(Vec::new()))
}

pub(crate) fn mv(args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    let (src, dst) = two_operands(args, "mv")?;
    let src_path = copy_node(ctx, src, dst, "mv")?;
    let _ = ctx.fs.remove(&src_path);
    Ok(Action::Lines(Vec::new()))
}

fn two_operands<'a>(args: &[&'a str], cmd: &str) -> Result<(&'a str, &'a str)> {
    let mut operands = args
        .iter()
        .copied()
        .filter(|a| !a.is_empty() && !a.starts_with('-'));
    match (operands.next(), operands.next()) {
        (Some(src), Some(dst)) => Ok((src, dst)),
        _ => Err(ShellError::MissingOperand(format!(
            "{cmd}: missing file operand"
        ))),
    }
}

/// Deep-copy `src` to `dst`; returns the resolved source path.
fn copy_node(ctx: &mut Ctx<'_>, src: &str, dst: &str, cmd: &str) -> Result<String> {
    let src_path = resolve(src, ctx.session.cwd());
    let dst_path = resolve(dst, ctx.session.cwd());
    match ctx.fs.copy(&src_path, &dst_path) {
        Ok(()) => Ok(src_path),
        Err(FsError::NotFound) => Err(ShellError::NotFound(format!(
            "{cmd}: cannot stat '{src}': No such file or directory"
        ))),
        Err(_) => Err(ShellError::NotADirectory(format!(
            "{cmd}: {dst}: Not a directory"
        ))),
    }
}

pub(crate) fn chmod(args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    let mut operands = args.iter().copied().filter(|a| !a.is_empty());
    let (Some(perms), Some(target)) = (operands.next(), operands.next()) else {
        return Err(ShellError::MissingOperand(
            "chmod: missing operand".to_string(),
        ));
    };
    let path = resolve(target, ctx.session.cwd());
    if ctx.fs.set_permissions(&path, perms).is_err() {
        return Err(ShellError::NotFound(format!(
            "chmod: cannot access '{target}': No such file or directory"
        )));
    }
    Ok(Action::Lines(Vec::new()))
}

pub(crate) fn find(args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    let target = first_operand(args).unwrap_or(".");
    let path = if target == "." {
        ctx.session.cwd().to_string()
    } else {
        resolve(target, ctx.session.cwd())
    };
    let Some(id) = ctx.fs.get(&path) else {
        return Err(ShellError::NotFound(format!(
            "find: '{target}': No such file or directory"
        )));
    };
    let mut lines = Vec::new();
    visit_preorder(ctx, id, target, &mut lines);
    Ok(Action::Lines(lines))
}

/// Pre-order walk emitting each visited path, rooted at the argument as
/// the user typed it.
fn visit_preorder(ctx: &Ctx<'_>, id: vsh_vfs::NodeId, display: &str, lines: &mut Vec<String>) {
    lines.push(display.to_string());
    if ctx.fs.kind(id) == NodeKind::Dir {
        for entry in ctx.fs.children(id) {
            let child = format!("{display}/{}", entry.name);
            visit_preorder(ctx, entry.id, &child, lines);
        }
    }
}

pub(crate) fn du(args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    let target = first_operand(args).unwrap_or(ctx.session.cwd());
    let path = resolve(target, ctx.session.cwd());
    let Some(id) = ctx.fs.get(&path) else {
        return Err(ShellError::NotFound(format!(
            "du: cannot access '{target}': No such file or directory"
        )));
    };
    if ctx.fs.kind(id) == NodeKind::File {
        return Ok(Action::Lines(vec![format!(
            "{:>8}  {target}",
            format_size(ctx.fs.size(id))
        )]));
    }
    let mut lines = Vec::new();
    let total = du_walk(ctx, id, target, &mut lines);
    lines.push(format!("{:>8}  {target} (total)", format_size(total)));
    Ok(Action::Lines(lines))
}

fn du_walk(ctx: &Ctx<'_>, id: vsh_vfs::NodeId, display: &str, lines: &mut Vec<String>) -> u64 {
    let mut total = 0;
    for entry in ctx.fs.children(id) {
        if entry.kind == NodeKind::Dir {
            let child = format!("{display}/{}", entry.name);
            total += du_walk(ctx, entry.id, &child, lines);
        } else {
            total += entry.size;
        }
    }
    lines.push(format!("{:>8}  {display}", format_size(total)));
    total
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes}B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1}K", bytes as f64 / 1024.0)
    } else {
        format!("{:.1}M", bytes as f64 / (1024.0 * 1024.0))
    }
}
