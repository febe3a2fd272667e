use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Delay between samples when emitting more than one record.
    pub interval_ms: u64,
    /// Records to emit before exiting; 0 means run until interrupted.
    pub count: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            interval_ms: 2000,
            count: 1,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub pretty: bool,
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("procsnap").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}
