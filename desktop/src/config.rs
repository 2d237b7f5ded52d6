//! Configuration management for Murmur Desktop

use murmur_core::ClientConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub ui: UiConfig,
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub use_tls: bool,
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Used until a user profile with its own preference exists.
    pub theme: String, // "dark" or "light"
    pub long_press_ms: u64,
    pub double_click_ms: u64,
    pub search_debounce_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub preview: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            ui: UiConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 443,
            use_tls: true,
            access_token: None,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            long_press_ms: 500,
            double_click_ms: 400,
            search_debounce_ms: 300,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            preview: true,
        }
    }
}

impl AppConfig {
    pub fn load(data_dir: &Path) -> anyhow::Result<Self> {
        let config_path = data_dir.join("config.json");

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Self = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, data_dir: &Path) -> anyhow::Result<()> {
        let config_path = data_dir.join("config.json");
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn has_server(&self) -> bool {
        !self.server.host.trim().is_empty()
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.server.host.trim(), self.server.port, self.server.use_tls)
            .with_token(self.server.access_token.clone())
    }

    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.ui.long_press_ms)
    }

    pub fn double_click(&self) -> Duration {
        Duration::from_millis(self.ui.double_click_ms)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.ui.search_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path()).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(!config.has_server());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.server.host = "social.example.org".into();
        config.ui.search_debounce_ms = 250;
        config.save(dir.path()).unwrap();

        let loaded = AppConfig::load(dir.path()).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.search_debounce(), Duration::from_millis(250));
        assert_eq!(loaded.client_config().http_url(), "https://social.example.org:443");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{"server":{"host":"localhost","port":3000,"use_tls":false}}"#,
        )
        .unwrap();

        let config = AppConfig::load(dir.path()).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.ui.long_press_ms, 500);
        assert!(config.notifications.enabled);
    }
}
