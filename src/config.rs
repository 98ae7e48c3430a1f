//! Configuration: where the task store lives.

use eyre::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default store file name, relative to the current directory.
pub const DEFAULT_STORE_FILE: &str = "tasks.json";

/// Optional user config file, under the platform config dir.
const CONFIG_FILE: &str = "config.yaml";

/// Application directory name used for config and logs.
pub const APP_DIR: &str = "task-cli";

/// Resolved configuration passed to [`crate::Repository::open`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path of the JSON store file
    pub file: PathBuf,
}

/// On-disk shape of `config.yaml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    file: Option<PathBuf>,
}

impl Config {
    /// Create config pointing at an explicit store file.
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    /// Resolve the store location.
    ///
    /// Precedence: explicit `file` (CLI flag or `TASK_CLI_FILE`), then the
    /// `file:` key of the user config file, then `tasks.json` in the current
    /// directory.
    pub fn resolve(file: Option<PathBuf>) -> Result<Self> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::resolve_with(file, default_config_path().as_deref(), &cwd)
    }

    /// [`Config::resolve`] with the config file and working directory given.
    pub fn resolve_with(file: Option<PathBuf>, config_path: Option<&Path>, cwd: &Path) -> Result<Self> {
        if let Some(file) = file {
            return Ok(Self::new(file));
        }

        if let Some(path) = config_path.filter(|p| p.exists()) {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let parsed: ConfigFile = if contents.trim().is_empty() {
                ConfigFile::default()
            } else {
                serde_yaml::from_str(&contents)
                    .with_context(|| format!("Failed to parse config file {}", path.display()))?
            };

            if let Some(file) = parsed.file {
                log::debug!("Store location from {}", path.display());
                return Ok(Self::new(cwd.join(file)));
            }
        }

        Ok(Self::new(cwd.join(DEFAULT_STORE_FILE)))
    }
}

/// `<config dir>/task-cli/config.yaml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}
