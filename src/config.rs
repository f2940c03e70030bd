use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct MythiqConfig {
    pub server: ServerConfig,
    pub memory: MemoryConfig,
    pub personalization: PersonalizationConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: String,
    pub log_level: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MemoryConfig {
    /// Result count for `semantic_search` when the caller gives none.
    pub default_top_k: usize,
    /// Number of trailing entries rendered by context overlays.
    pub history_window: usize,
    /// Oldest-inserted sessions are evicted past this count. `None` keeps everything.
    pub max_sessions: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PersonalizationConfig {
    pub seed_history_limit: usize,
    pub seed_retry_limit: usize,
    pub max_preferred_genres: usize,
    pub new_user_sessions: u32,
    pub returning_user_sessions: u32,
    pub power_user_playtime_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".into(),
            log_level: "info".into(),
            host: "127.0.0.1".into(),
            port: 8787,
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            default_top_k: 5,
            history_window: 5,
            max_sessions: None,
        }
    }
}

impl Default for PersonalizationConfig {
    fn default() -> Self {
        Self {
            seed_history_limit: 50,
            seed_retry_limit: 10,
            max_preferred_genres: 5,
            new_user_sessions: 3,
            returning_user_sessions: 10,
            power_user_playtime_secs: 3600,
        }
    }
}

/// Returns `~/.mythiq/`
pub fn default_mythiq_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mythiq")
}

/// Returns the default config file path: `~/.mythiq/config.toml`
pub fn default_config_path() -> PathBuf {
    default_mythiq_dir().join("config.toml")
}

impl MythiqConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            MythiqConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (MYTHIQ_LOG_LEVEL, MYTHIQ_TRANSPORT, MYTHIQ_PORT).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MYTHIQ_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("MYTHIQ_TRANSPORT") {
            self.server.transport = val;
        }
        if let Ok(val) = std::env::var("MYTHIQ_PORT") {
            match val.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %val, "ignoring invalid MYTHIQ_PORT"),
            }
        }
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = MythiqConfig::default();
        assert_eq!(config.server.transport, "stdio");
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.memory.default_top_k, 5);
        assert!(config.memory.max_sessions.is_none());
        assert_eq!(config.personalization.seed_history_limit, 50);
        assert_eq!(config.personalization.seed_retry_limit, 10);
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"
transport = "http"

[memory]
default_top_k = 10
max_sessions = 200

[personalization]
seed_history_limit = 20
"#;
        let config: MythiqConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.server.transport, "http");
        assert_eq!(config.memory.default_top_k, 10);
        assert_eq!(config.memory.max_sessions, Some(200));
        assert_eq!(config.personalization.seed_history_limit, 20);
        // defaults still apply for unset fields
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.personalization.max_preferred_genres, 5);
    }

    #[test]
    fn load_from_file_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[memory]\nhistory_window = 3\n").unwrap();

        let config = MythiqConfig::load_from(&path).unwrap();
        assert_eq!(config.memory.history_window, 3);

        let missing = MythiqConfig::load_from(dir.path().join("nope.toml")).unwrap();
        assert_eq!(missing.memory.history_window, 5);
    }

    #[test]
    fn expand_tilde_resolves_home() {
        assert_eq!(expand_tilde("/etc/mythiq.toml"), PathBuf::from("/etc/mythiq.toml"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/m/config.toml"), home.join("m/config.toml"));
        }
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = MythiqConfig::default();
        std::env::set_var("MYTHIQ_LOG_LEVEL", "trace");
        std::env::set_var("MYTHIQ_TRANSPORT", "http");
        std::env::set_var("MYTHIQ_PORT", "9000");

        config.apply_env_overrides();

        assert_eq!(config.server.log_level, "trace");
        assert_eq!(config.server.transport, "http");
        assert_eq!(config.server.port, 9000);

        // Clean up
        std::env::remove_var("MYTHIQ_LOG_LEVEL");
        std::env::remove_var("MYTHIQ_TRANSPORT");
        std::env::remove_var("MYTHIQ_PORT");
    }
}
