//! Command execution primitives with consistent error handling.

use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Output, Stdio};

use crate::error::{Error, Result};

/// Exit status and captured streams of a finished process.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            success: output.status.success(),
            // Killed by a signal: no code.
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    /// Last `lines` lines of stderr, or of stdout when stderr is empty.
    pub fn tail(&self, lines: usize) -> String {
        let text = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };
        tail_lines(text, lines)
    }
}

/// Run a command to completion, optionally in `dir`, capturing its output.
///
/// A non-zero exit is not an error here; callers inspect `success`.
/// Returns an error only when the process could not be started.
pub fn execute(program: &str, args: &[&str], dir: Option<&Path>, context: &str) -> Result<CommandOutput> {
    let output = command(program, args, dir)
        .output()
        .map_err(|e| spawn_error(context, e))?;

    Ok(CommandOutput::from_output(&output))
}

/// Run a command with stdout passed through to the console.
///
/// Stderr is echoed line by line as it arrives and also captured, so a
/// failure can still be reported with its tail. `stdout` of the result is
/// always empty.
pub fn execute_streaming(
    program: &str,
    args: &[&str],
    dir: Option<&Path>,
    context: &str,
) -> Result<CommandOutput> {
    let mut child = command(program, args, dir)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| spawn_error(context, e))?;

    let mut stderr = String::new();
    if let Some(pipe) = child.stderr.take() {
        for line in BufReader::new(pipe).split(b'\n') {
            let Ok(line) = line else { break };
            let line = String::from_utf8_lossy(&line);
            eprintln!("{}", line);
            stderr.push_str(&line);
            stderr.push('\n');
        }
    }

    let status = child
        .wait()
        .map_err(|e| Error::internal_io(e.to_string(), Some(context.to_string())))?;

    Ok(CommandOutput {
        success: status.success(),
        // Killed by a signal: no code.
        exit_code: status.code().unwrap_or(-1),
        stdout: String::new(),
        stderr,
    })
}

fn command(program: &str, args: &[&str], dir: Option<&Path>) -> Command {
    let mut command = Command::new(program);
    command.args(args);
    if let Some(dir) = dir {
        command.current_dir(dir);
    }
    command
}

fn spawn_error(context: &str, e: std::io::Error) -> Error {
    Error::internal_io(
        format!("Failed to run {}: {}", context, e),
        Some(context.to_string()),
    )
}

/// Render a program and its arguments as a single display string.
pub fn display(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

fn tail_lines(text: &str, lines: usize) -> String {
    let tail: Vec<&str> = text.trim_end().lines().rev().take(lines).collect();
    tail.into_iter().rev().collect::<Vec<_>>().join("\n")
}
