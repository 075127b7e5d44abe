//! Container engine invocation.

use std::path::{Path, PathBuf};

use crate::error::{EngineCommandDetails, Error, Result};
use crate::utils::command::{self, CommandOutput};

/// Lines of engine output kept in a failure report.
const OUTPUT_TAIL_LINES: usize = 15;

/// The two engine operations a build job needs.
pub trait ImageEngine: Send + Sync {
    /// Build `dockerfile` and tag the result as `tag`.
    fn build(&self, dockerfile: &Path, tag: &str) -> Result<()>;

    /// Push a previously built `tag` to its registry.
    fn push(&self, tag: &str) -> Result<()>;
}

/// Engine driven through a docker-compatible command line.
#[derive(Debug, Clone)]
pub struct CliEngine {
    program: String,
    context_dir: PathBuf,
}

impl CliEngine {
    pub fn new(program: impl Into<String>, context_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            context_dir: context_dir.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, args: &[&str]) -> std::result::Result<(), EngineFailure> {
        let display = command::display(&self.program, args);

        match command::execute_streaming(&self.program, args, Some(&self.context_dir), &display) {
            Ok(output) if output.success => Ok(()),
            Ok(output) => Err(EngineFailure::from_output(display, &output)),
            Err(err) => Err(EngineFailure::spawn(display, &err)),
        }
    }
}

impl ImageEngine for CliEngine {
    fn build(&self, dockerfile: &Path, tag: &str) -> Result<()> {
        let dockerfile = dockerfile.to_string_lossy();
        self.run(&["build", "-t", tag, "-f", &*dockerfile, "."])
            .map_err(|failure| Error::image_build_failed(failure.into_details(tag)))
    }

    fn push(&self, tag: &str) -> Result<()> {
        self.run(&["push", tag])
            .map_err(|failure| Error::image_push_failed(failure.into_details(tag)))
    }
}

struct EngineFailure {
    command: String,
    exit_code: i32,
    output_tail: String,
}

impl EngineFailure {
    fn from_output(command: String, output: &CommandOutput) -> Self {
        Self {
            command,
            exit_code: output.exit_code,
            output_tail: output.tail(OUTPUT_TAIL_LINES),
        }
    }

    /// The program could not be started at all; reported like a shell would.
    fn spawn(command: String, err: &Error) -> Self {
        let reason = err
            .details
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or(&err.message)
            .to_string();
        Self {
            command,
            exit_code: 127,
            output_tail: reason,
        }
    }

    fn into_details(self, tag: &str) -> EngineCommandDetails {
        EngineCommandDetails {
            tag: tag.to_string(),
            command: self.command,
            exit_code: self.exit_code,
            output_tail: self.output_tail,
        }
    }
}
