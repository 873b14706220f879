use std::path::{Path, PathBuf};

use compact_str::CompactString;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::{
    client::config::{DEFAULT_API_URL, DEFAULT_HTML_URL},
    result::{PulseError, Result},
};

/// Settings persisted between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    pub username: CompactString,
    pub api_url: CompactString,
    pub html_url: CompactString,
    pub poll_interval_secs: u64,
    pub timeout_secs: u64,
    pub proxy: Option<CompactString>,
    pub no_proxy: bool,
    /// "Off" disables the log file
    pub log_level: Option<String>,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            username: CompactString::default(),
            api_url: DEFAULT_API_URL.into(),
            html_url: DEFAULT_HTML_URL.into(),
            poll_interval_secs: 60,
            timeout_secs: 30,
            proxy: None,
            no_proxy: false,
            log_level: None,
        }
    }
}

pub fn default_config_path() -> PathBuf {
    if let Some(dirs) = BaseDirs::new() {
        dirs.config_dir().join("repo-pulse.toml")
    } else {
        PathBuf::from("repo-pulse.toml")
    }
}

pub fn load_config(config_file: &Path) -> Result<PulseConfig> {
    if !config_file.exists() {
        return Err(PulseError::ConfigFileNotFound { path: config_file.to_path_buf() });
    }

    confy::load_path(config_file)
        .map_err(|e| PulseError::config_load(config_file, e))
}

/// Load the config, writing the defaults first if the file does not exist yet
pub fn load_or_create_config(config_file: &Path) -> Result<PulseConfig> {
    match load_config(config_file) {
        Err(PulseError::ConfigFileNotFound { .. }) => {
            let config = PulseConfig::default();
            save_config(config_file, config.clone())?;
            Ok(config)
        },
        other => other,
    }
}

pub fn save_config(config_file: &Path, config: PulseConfig) -> Result<()> {
    confy::store_path(config_file, &config)
        .map_err(|e| PulseError::config_save(config_file, e))?;

    Ok(())
}
