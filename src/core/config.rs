use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::utils::io;

/// Default configuration file, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "build_config.toml";

/// Release listing for the `torch` package on PyPI.
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org/pypi/torch/json";

/// Root structure of build_config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Registry namespace the images are pushed under.
    pub dockername: String,

    pub image_name: String,

    pub python_versions: Vec<String>,

    /// PyTorch lines. Only entries ending in `.x` take part in the matrix.
    pub pytorch_versions: Vec<String>,

    #[serde(default = "default_index_url")]
    pub index_url: String,

    /// Container engine program (anything that speaks `build` and `push` like docker).
    #[serde(default = "default_engine")]
    pub engine: String,

    #[serde(default = "default_build_context")]
    pub build_context: PathBuf,
}

fn default_index_url() -> String {
    DEFAULT_INDEX_URL.to_string()
}

fn default_engine() -> String {
    "docker".to_string()
}

fn default_build_context() -> PathBuf {
    PathBuf::from(".")
}

impl BuildConfig {
    pub fn from_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::config_invalid_toml(path.display().to_string(), e))
    }
}

/// Load the build configuration from disk. Called once per run.
pub fn load(path: &Path) -> Result<BuildConfig> {
    if !path.exists() {
        return Err(Error::config_not_found(path.display().to_string()));
    }

    let content = io::read_file(path, "read build config")?;
    BuildConfig::from_toml(&content, path)
}
