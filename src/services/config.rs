use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

const APP_QUALIFIER: &str = "org";
const APP_ORG: &str = "projectcalico";
const APP_NAME: &str = "whisker_flows";

/// Overrides `api_url` from the saved config.
pub const API_URL_ENV: &str = "WHISKER_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the whisker backend, without the `/flows` suffix.
    pub api_url: String,
    /// Upper bound on buffered flow logs, newest kept.
    pub max_flow_logs: usize,
    pub reconnect_delay_ms: u64,
    /// Start streaming as soon as the page opens.
    pub auto_stream: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8081/whisker-backend".to_string(),
            max_flow_logs: 1000,
            reconnect_delay_ms: 2000,
            auto_stream: true,
        }
    }
}

impl AppConfig {
    fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_url = url.trim().to_string();
            }
        }
        self
    }
}

/// Config file path, e.g. ~/.local/share/whisker_flows/config.json on Linux.
fn get_config_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME) {
        let config_dir = proj_dirs.data_local_dir();
        if !config_dir.exists() {
            if let Err(e) = fs::create_dir_all(config_dir) {
                tracing::warn!("could not create config dir {}: {e}", config_dir.display());
            }
        }
        return config_dir.join("config.json");
    }
    PathBuf::from("config.json")
}

fn parse_config(content: &str) -> Result<AppConfig> {
    Ok(serde_json::from_str::<AppConfig>(content)?)
}

/// Load the config, falling back to defaults when the file is missing or broken.
pub fn load_config() -> AppConfig {
    let path = get_config_path();
    let config = match fs::read_to_string(&path) {
        Ok(content) => match parse_config(&content) {
            Ok(config) => {
                tracing::info!("loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("invalid config {}: {e}, using defaults", path.display());
                AppConfig::default()
            }
        },
        Err(_) => {
            let config = AppConfig::default();
            if let Err(e) = save_config(&config) {
                tracing::warn!("could not write default config: {e}");
            }
            config
        }
    };
    config.with_env_overrides()
}

pub fn save_config(config: &AppConfig) -> Result<()> {
    let path = get_config_path();
    let json = serde_json::to_string_pretty(config)?;
    fs::write(&path, json)?;
    tracing::info!("saved config to {}", path.display());
    Ok(())
}
