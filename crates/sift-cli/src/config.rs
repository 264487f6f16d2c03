//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Configuration for sift
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL
    pub base_url: Option<String>,
    /// Maximum poll attempts before a reply times out
    pub poll_max_attempts: Option<u32>,
    /// Wait between poll attempts, in milliseconds
    pub poll_interval_ms: Option<u64>,
    /// Questions offered on the empty conversation screen
    pub example_questions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            poll_max_attempts: None,
            poll_interval_ms: None,
            example_questions: default_examples(),
        }
    }
}

fn default_examples() -> Vec<String> {
    vec![
        "What were total sales last month?".to_string(),
        "Which products grew fastest quarter over quarter?".to_string(),
        "Top 10 stores by revenue this year".to_string(),
    ]
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sift")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        // Check for SIFT_CONFIG_PATH env var first
        if let Ok(path) = std::env::var("SIFT_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from file
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to file
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            base_url: Some("http://localhost:8000".to_string()),
            ..Config::default()
        };
        default_config.save()?;
        Ok(path)
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# sift configuration file
# Place at ~/.config/sift/config.toml (Linux/Mac) or %APPDATA%\sift\config.toml (Windows)

# Backend base URL
base_url = "http://localhost:8000"

# Reply polling budget (30 attempts x 1000 ms by default)
# poll_max_attempts = 30
# poll_interval_ms = 1000

# Questions offered on the empty conversation screen
example_questions = [
    "What were total sales last month?",
    "Which products grew fastest quarter over quarter?",
    "Top 10 stores by revenue this year",
]
"#
}
