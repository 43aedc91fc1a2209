use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use mathpad_session::HistoryConfig;

/// CLI configuration, read from `mathpad.toml` in the working directory
/// when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PadConfig {
    /// Max retained history records.
    pub history_capacity: usize,
    /// Override for the history file location.
    pub history_path: Option<PathBuf>,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            history_capacity: 20,
            history_path: None,
        }
    }
}

impl PadConfig {
    pub fn load() -> Self {
        let path = Path::new("mathpad.toml");
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => println!("Error parsing config file: {}. Using defaults.", e),
                },
                Err(e) => println!("Error reading config file: {}. Using defaults.", e),
            }
        }
        Self::default()
    }

    pub fn history_config(&self) -> HistoryConfig {
        HistoryConfig {
            capacity: self.history_capacity,
        }
    }

    /// Explicit path from the config, or the default location under the
    /// user cache directory.
    pub fn history_path(&self) -> PathBuf {
        if let Some(path) = &self.history_path {
            return path.clone();
        }
        dirs::cache_dir()
            .map(|p| p.join("mathpad/history.json"))
            .unwrap_or_else(|| PathBuf::from("mathpad-history.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PadConfig::default();
        assert_eq!(config.history_capacity, 20);
        assert!(config.history_path.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: PadConfig = toml::from_str("history_capacity = 5").unwrap();
        assert_eq!(config.history_capacity, 5);
        assert!(config.history_path.is_none());
    }

    #[test]
    fn test_explicit_path_wins() {
        let config: PadConfig =
            toml::from_str(r#"history_path = "/tmp/somewhere.json""#).unwrap();
        assert_eq!(config.history_path(), PathBuf::from("/tmp/somewhere.json"));
    }
}
