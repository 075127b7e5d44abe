use clap::Args;
use std::path::PathBuf;
use torchdock::config::DEFAULT_CONFIG_FILE;
use torchdock::matrix::{self, MatrixResult};

use crate::commands::CmdResult;

#[derive(Args)]
pub struct BuildArgs {
    /// Print what would be done without actually doing it
    #[arg(long)]
    pub dry_run: bool,

    /// Path to the build matrix configuration
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
}

/// Failed jobs are reported in the summary and do not change the exit code.
pub fn run(args: BuildArgs) -> CmdResult<MatrixResult> {
    let result = matrix::run(&args.config, args.dry_run)?;
    Ok((result, 0))
}
