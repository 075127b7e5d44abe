use clap::Parser;
use std::path::PathBuf;

use torchdock::logging::{self, LogOptions};

mod commands;
mod output;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "torchdock")]
#[command(version = VERSION)]
#[command(about = "Build and push a matrix of Python/PyTorch container images")]
struct Cli {
    #[command(flatten)]
    build: commands::build::BuildArgs,

    /// Directory for the rotating log file
    #[arg(long, value_name = "DIR", default_value = ".")]
    log_dir: PathBuf,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let log_guard = match logging::init(&LogOptions {
        directory: cli.log_dir.clone(),
    }) {
        Ok(guard) => guard,
        Err(err) => {
            let _ = output::print_json_result(Err(err));
            return std::process::ExitCode::from(1);
        }
    };

    let (json_result, exit_code) = commands::run_json(cli.build);
    let _ = output::print_json_result(json_result);

    // Flush the log file before exiting.
    drop(log_guard);

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
