//! Text utilities: grep, head, tail, wc, nano, calc.

use vsh_types::{Result, ShellError};
use vsh_vfs::resolve;

use crate::calc;
use crate::shell::{Action, Ctx};

/// Read a file operand as text, with the terse `{cmd}: {file}: No such
/// file` error these commands share. Directories get the same message.
fn read_text<'a>(ctx: &'a Ctx<'_>, cmd: &str, file: &str) -> Result<&'a str> {
    let path = resolve(file, ctx.session.cwd());
    ctx.fs
        .read(&path)
        .map_err(|_| ShellError::NotFound(format!("{cmd}: {file}: No such file")))
}

pub(crate) fn grep(args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    let mut operands = args.iter().copied().filter(|a| !a.is_empty());
    let (Some(pattern), Some(file)) = (operands.next(), operands.next()) else {
        return Err(ShellError::MissingOperand(
            "grep: missing pattern or file".to_string(),
        ));
    };
    let content = read_text(ctx, "grep", file)?;
    Ok(Action::Lines(
        content
            .split('\n')
            .filter(|line| line.contains(pattern))
            .map(str::to_string)
            .collect(),
    ))
}

/// Parse `-n COUNT` off the argument list; remaining first operand is the
/// file. Defaults to 10 lines.
fn count_and_file<'a>(args: &[&'a str], cmd: &str) -> Result<(usize, &'a str)> {
    let mut count = 10usize;
    let mut file = None;
    let mut iter = args.iter().copied().filter(|a| !a.is_empty());
    while let Some(arg) = iter.next() {
        if arg == "-n" {
            let value = iter.next().ok_or_else(|| {
                ShellError::InvalidSyntax(format!("{cmd}: option requires an argument -- 'n'"))
            })?;
            count = value.parse().map_err(|_| {
                ShellError::InvalidSyntax(format!("{cmd}: invalid number of lines: '{value}'"))
            })?;
        } else if !arg.starts_with('-') && file.is_none() {
            file = Some(arg);
        }
    }
    let file = file.ok_or_else(|| {
        ShellError::MissingOperand(format!("{cmd}: missing file operand"))
    })?;
    Ok((count, file))
}

pub(crate) fn head(args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    let (count, file) = count_and_file(args, "head")?;
    let content = read_text(ctx, "head", file)?;
    Ok(Action::Lines(
        content.split('\n').take(count).map(str::to_string).collect(),
    ))
}

pub(crate) fn tail(args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    let (count, file) = count_and_file(args, "tail")?;
    let content = read_text(ctx, "tail", file)?;
    let lines: Vec<&str> = content.split('\n').collect();
    let start = lines.len().saturating_sub(count);
    Ok(Action::Lines(lines[start..].iter().map(|s| s.to_string()).collect()))
}

pub(crate) fn wc(args: &[&str], ctx: &mut Ctx<'_>) -> Result<Action> {
    let mut operands = args.iter().copied().filter(|a| !a.is_empty());
    let Some(file) = operands.next() else {
        return Err(ShellError::MissingOperand(
            "wc: missing file operand".to_string(),
        ));
    };
    let content = read_text(ctx, "wc", file)?;
    let lines = content.split('\n').count();
    let words = content.split_whitespace().count();
    let chars = content.chars().count();
    Ok(Action::Lines(vec![format!("  {lines}  {words}  {chars} {file}")]))
}

pub(crate) fn nano(args: &[&str], _ctx: &mut Ctx<'_>) -> Result<Action> {
    let mut operands = args.iter().copied().filter(|a| !a.is_empty());
    let Some(file) = operands.next() else {
        return Err(ShellError::MissingOperand(
            "nano: missing file name".to_string(),
        ));
    };
    Ok(Action::Lines(vec![format!(
        "GNU nano 4.8 - Editing is not available in this shell. \
         Use 'echo \"content\" > {file}' instead."
    )]))
}

pub(crate) fn calc(args: &[&str], _ctx: &mut Ctx<'_>) -> Result<Action> {
    let joined = args.join(" ");
    if joined.trim().is_empty() {
        return Err(ShellError::MissingOperand(
            "calc: missing expression".to_string(),
        ));
    }
    let Some(value) = calc::eval(&calc::strip(&joined)) else {
        return Err(ShellError::InvalidSyntax(
            "calc: invalid expression".to_string(),
        ));
    };
    Ok(Action::Lines(vec![calc::format_value(value)]))
}
