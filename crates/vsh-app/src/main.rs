//! vsh terminal entry point.
//!
//! Reads command lines from stdin, feeds them to the shell engine, and
//! prints the transcript increments. Deferred tasks (downloads, installs,
//! pings) are drained between prompts with a short sleep per tick so
//! their progress lines appear over time, like the real commands.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::Result;

use vsh_shell::Shell;
use vsh_types::LineKind;

/// Delay between task ticks while draining deferred commands.
const TICK_INTERVAL: Duration = Duration::from_millis(200);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut shell = Shell::new();
    log::info!("vsh session started");

    let mut stdout = io::stdout();
    for line in shell.transcript() {
        writeln!(stdout, "{}", line.text)?;
    }
    prompt(&mut stdout, shell.cwd())?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let before = shell.transcript().len();
        shell.submit_line(&line);
        print_increment(&mut stdout, &shell, before)?;

        while !shell.tasks_idle() {
            std::thread::sleep(TICK_INTERVAL);
            let before = shell.transcript().len();
            shell.tick();
            print_increment(&mut stdout, &shell, before)?;
        }
        prompt(&mut stdout, shell.cwd())?;
    }

    log::info!("vsh session ended");
    Ok(())
}

fn prompt(stdout: &mut io::Stdout, cwd: &str) -> Result<()> {
    write!(stdout, "{cwd} $ ")?;
    stdout.flush()?;
    Ok(())
}

/// Print transcript lines added since `before`. Echoed input lines are
/// skipped; the user just typed them. A `clear` leaves the transcript
/// shorter than `before`, which prints nothing.
fn print_increment(stdout: &mut io::Stdout, shell: &Shell, before: usize) -> Result<()> {
    for line in shell.transcript().iter().skip(before) {
        if line.kind == LineKind::Output {
            writeln!(stdout, "{}", line.text)?;
        }
    }
    Ok(())
}
