pub type CmdResult<T> = torchdock::Result<(T, i32)>;

pub mod build;

/// Run the build command and map its result to JSON.
pub(crate) fn run_json(args: build::BuildArgs) -> (torchdock::Result<serde_json::Value>, i32) {
    crate::output::map_cmd_result_to_json(build::run(args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_config_exits_with_code_2() {
        let dir = tempfile::tempdir().unwrap();
        let args = build::BuildArgs {
            dry_run: true,
            config: dir.path().join("absent.toml"),
        };

        let (result, exit_code) = run_json(args);

        assert_eq!(exit_code, 2);
        assert_eq!(result.unwrap_err().code, torchdock::ErrorCode::ConfigNotFound);
    }

    #[test]
    fn build_args_parse_dry_run_and_config() {
        use clap::Parser;

        #[derive(Parser)]
        struct Cli {
            #[command(flatten)]
            build: build::BuildArgs,
        }

        let cli = Cli::parse_from(["torchdock", "--dry-run", "--config", "matrix.toml"]);
        assert!(cli.build.dry_run);
        assert_eq!(cli.build.config, PathBuf::from("matrix.toml"));

        let cli = Cli::parse_from(["torchdock"]);
        assert!(!cli.build.dry_run);
        assert_eq!(
            cli.build.config,
            PathBuf::from(torchdock::config::DEFAULT_CONFIG_FILE)
        );
    }
}
