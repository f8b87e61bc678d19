use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/client.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root of the REST collaborator, e.g. `http://localhost:8000`.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Root of the realtime collaborator, e.g. `ws://localhost:8000`.
    #[serde(default = "default_ws_base")]
    pub ws_base: String,
}

fn default_api_base() -> String {
    "http://localhost:8000".to_string()
}

fn default_ws_base() -> String {
    "ws://localhost:8000".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            ws_base: default_ws_base(),
        }
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}
