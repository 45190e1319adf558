use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// Environment variable holding the OpenWeather credential.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// cache_ttl_secs = 600
/// history_path = "/var/lib/weather/history.jsonl"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeather API key. Absence is reported per request, not at startup.
    pub api_key: Option<String>,

    /// Provider base URL, without the trailing `/weather`.
    pub base_url: String,

    /// Per-call network timeout for provider requests.
    pub timeout_secs: u64,

    /// Lifetime of a cached lookup.
    pub cache_ttl_secs: u64,

    /// Number of entries returned by the history endpoint.
    pub history_limit: usize,

    /// JSON-lines file backing the search history. In-memory when unset.
    pub history_path: Option<PathBuf>,

    /// Address the HTTP server binds to.
    pub bind: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            cache_ttl_secs: 600,
            history_limit: 10,
            history_path: None,
            bind: "127.0.0.1:8000".to_string(),
        }
    }
}

impl Config {
    /// Load config from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
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

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-server")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay values from the process environment.
    pub fn with_env(self) -> Self {
        self.with_api_key_override(std::env::var(API_KEY_ENV).ok())
    }

    /// Replace the API key when `key` is non-empty.
    pub fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    /// Returns the API key, if one is configured and non-empty.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_contract() {
        let cfg = Config::default();
        assert_eq!(cfg.cache_ttl(), Duration::from_secs(600));
        assert_eq!(cfg.timeout(), Duration::from_secs(10));
        assert_eq!(cfg.history_limit, 10);
        assert!(cfg.api_key().is_none());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from(&dir.path().join("nope.toml")).expect("load");
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = \"FILE_KEY\"\ncache_ttl_secs = 30\n").expect("write");

        let cfg = Config::load_from(&path).expect("load");
        assert_eq!(cfg.api_key(), Some("FILE_KEY"));
        assert_eq!(cfg.cache_ttl_secs, 30);
        assert_eq!(cfg.timeout_secs, 10);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config {
            history_path: Some(dir.path().join("history.json")),
            bind: "0.0.0.0:9000".into(),
            ..Config::default()
        };
        cfg.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded.bind, "0.0.0.0:9000");
        assert_eq!(loaded.history_path, cfg.history_path);
    }

    #[test]
    fn invalid_file_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "cache_ttl_secs = \"soon\"").expect("write");

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn env_override_ignores_empty_values() {
        let cfg = Config {
            api_key: Some("FILE_KEY".into()),
            ..Config::default()
        };

        let cfg = cfg.with_api_key_override(Some("   ".into()));
        assert_eq!(cfg.api_key(), Some("FILE_KEY"));

        let cfg = cfg.with_api_key_override(Some("ENV_KEY".into()));
        assert_eq!(cfg.api_key(), Some("ENV_KEY"));
    }

    #[test]
    fn blank_key_counts_as_absent() {
        let cfg = Config {
            api_key: Some(String::new()),
            ..Config::default()
        };
        assert!(cfg.api_key().is_none());
    }
}
