use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::types::{Page, VirtualPage};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct GeneralConfig {
    /// Signed-in user. Favorite and new-topic actions need one.
    pub username: Option<String>,
    /// Page key to open at startup, e.g. `node:python`, `tab:all`, `favorites`
    pub default_page: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct BackendConfig {
    /// JSON fixture file serving pages offline
    pub fixture: Option<PathBuf>,
    /// Artificial delay for every backend call
    #[serde(default)]
    pub latency_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("topiclist").join("config.toml"))
}

impl Config {
    pub fn load() -> Self {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Config::default(),
        }
    }

    /// Missing or invalid files fall back to defaults.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Config::default();
        };

        match toml::from_str::<Config>(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                Config::default()
            }
        }
    }

    pub fn logged_in(&self) -> bool {
        self.general
            .username
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty())
    }

    /// Page to open when none is given on the command line
    pub fn default_page(&self) -> Page {
        self.general
            .default_page
            .as_deref()
            .and_then(|key| match key.parse::<Page>() {
                Ok(page) => Some(page),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring default_page");
                    None
                }
            })
            .unwrap_or(Page::Virtual(VirtualPage::AllTopics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_config() {
        let toml_str = r#"
[general]
username = "alice"
default_page = "node:python"

[backend]
fixture = "/tmp/pages.json"
latency_ms = 250
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.logged_in());
        assert_eq!(config.default_page(), Page::node("python"));
        assert_eq!(
            config.backend.fixture.as_deref(),
            Some(Path::new("/tmp/pages.json"))
        );
        assert_eq!(config.backend.latency_ms, 250);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(!config.logged_in());
        assert_eq!(config.default_page(), Page::Virtual(VirtualPage::AllTopics));
        assert!(config.backend.fixture.is_none());
    }

    #[test]
    fn blank_username_is_logged_out() {
        let config: Config = toml::from_str("[general]\nusername = \"  \"\n").unwrap();
        assert!(!config.logged_in());
    }

    #[test]
    fn bad_default_page_falls_back() {
        let config: Config = toml::from_str("[general]\ndefault_page = \"inbox\"\n").unwrap();
        assert_eq!(config.default_page(), Page::Virtual(VirtualPage::AllTopics));
    }

    #[test]
    fn load_from_invalid_file_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general\nusername=").unwrap();
        let config = Config::load_from(&path);
        assert!(!config.logged_in());
    }

    #[test]
    fn load_from_missing_file_uses_default() {
        let config = Config::load_from(Path::new("/nonexistent/topiclist/config.toml"));
        assert!(config.general.username.is_none());
    }
}
