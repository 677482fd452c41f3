use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Environment variable that takes precedence over the stored token.
pub const TOKEN_ENV_VAR: &str = "AQITOKEN";

/// Environment variable overriding the platform config directory.
pub const CONFIG_DIR_ENV_VAR: &str = "AQI_CONFIG_DIR";

pub const TOKEN_HELP_MSG: &str = "Get your token here: https://aqicn.org/data-platform/token/#/";

const CONFIG_FILE_NAME: &str = "config.toml";
const STATIONS_FILE_NAME: &str = "stations";

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Example TOML:
    /// api_token = "..."
    pub api_token: Option<String>,
}

impl Config {
    /// Replace the stored token. Surrounding whitespace is dropped.
    pub fn set_api_token(&mut self, token: &str) {
        self.api_token = Some(token.trim().to_string());
    }

    /// Token to use for requests: `AQITOKEN` first, then the config file.
    pub fn resolve_token(&self, env_token: Option<String>) -> Result<String> {
        env_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .or_else(|| self.api_token.clone().filter(|t| !t.is_empty()))
            .ok_or_else(|| {
                anyhow!(
                    "No API token found.\n\
                     Hint: run `air init` and enter your token. {TOKEN_HELP_MSG}"
                )
            })
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file yet");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        debug!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Directory holding both the config and the saved stations.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = env::var_os(CONFIG_DIR_ENV_VAR).filter(|d| !d.is_empty()) {
            return Ok(PathBuf::from(dir));
        }

        let dirs = ProjectDirs::from("dev", "air-quality", "air-quality-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().to_path_buf())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Path to the saved stations file.
    pub fn stations_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(STATIONS_FILE_NAME))
    }
}

/// Reads `AQITOKEN`, if set.
pub fn token_from_env() -> Option<String> {
    env::var(TOKEN_ENV_VAR).ok()
}
