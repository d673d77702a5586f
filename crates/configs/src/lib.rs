use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 5000 }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StoreConfig {
    /// File backing the store; `None` means in-memory only.
    #[serde(default)]
    pub backing_file: Option<PathBuf>,
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load the config file if it exists, otherwise start from defaults;
    /// environment fallbacks apply either way. A file that exists but
    /// fails to parse or validate is an error, not a silent default.
    pub fn load_and_validate() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        let mut cfg = if std::path::Path::new(&path).exists() {
            load_from_file(&path)?
        } else {
            AppConfig::default()
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.store.normalize_from_env();
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in the range 1..=65535"));
        }
        Ok(())
    }
}

impl StoreConfig {
    /// Fill the backing file from `STORE_FILE` if the TOML left it unset.
    pub fn normalize_from_env(&mut self) {
        if self.backing_file.is_none() {
            if let Ok(file) = std::env::var("STORE_FILE") {
                if !file.trim().is_empty() {
                    self.backing_file = Some(PathBuf::from(file));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_sections_missing() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 5000);
        assert!(cfg.store.backing_file.is_none());
    }

    #[test]
    fn parses_full_config() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [store]
            backing_file = "data/store.json"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.store.backing_file, Some(PathBuf::from("data/store.json")));
    }

    #[test]
    fn rejects_zero_port() {
        let mut cfg: AppConfig = toml::from_str("[server]\nhost = \"x\"\nport = 0\n").unwrap();
        assert!(cfg.normalize_and_validate().is_err());
    }

    // single test for the CONFIG_PATH/STORE_FILE paths so the env
    // mutations cannot race between parallel test threads
    #[test]
    fn load_and_validate_respects_env_without_config_file() {
        let dir = std::env::temp_dir().join(format!("configs_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        // no config file at all: defaults plus the STORE_FILE fallback
        std::env::set_var("CONFIG_PATH", dir.join("missing.toml"));
        std::env::set_var("STORE_FILE", "/tmp/env-store.json");
        let cfg = AppConfig::load_and_validate().unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.store.backing_file, Some(PathBuf::from("/tmp/env-store.json")));

        // a config file that exists but is invalid must propagate
        let bad = dir.join("bad.toml");
        std::fs::write(&bad, "[server]\nhost = \"x\"\nport = 0\n").unwrap();
        std::env::set_var("CONFIG_PATH", &bad);
        assert!(AppConfig::load_and_validate().is_err());

        std::env::remove_var("CONFIG_PATH");
        std::env::remove_var("STORE_FILE");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
