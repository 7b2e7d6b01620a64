//! Configuration loading and saving.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::schema::Config;
use crate::error::BellError;
use crate::utils::helpers::ensure_dir;

/// Data directory, `~/.market-bell`.
pub fn get_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".market-bell")
}

/// Default config file location.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.json")
}

/// Load configuration from `path` (or the default location).
///
/// A missing file yields the defaults. An unreadable or invalid file is
/// logged and also yields the defaults.
pub fn load_config(path: Option<&Path>) -> Config {
    let path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);
    if !path.exists() {
        return Config::default();
    }
    match read_config(&path) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load config from {}: {}", path.display(), e);
            Config::default()
        }
    }
}

fn read_config(path: &Path) -> Result<Config, BellError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write configuration as pretty JSON, creating the parent directory.
pub fn save_config(config: &Config, path: Option<&Path>) -> Result<PathBuf, BellError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(&path, json)?;
    Ok(path)
}
