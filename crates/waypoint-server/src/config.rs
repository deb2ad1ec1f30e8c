//! Server configuration loaded from a TOML file, with CLI overrides.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:9090";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self, anyhow::Error> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waypoint.toml");
        std::fs::write(&path, "bind_addr = \"0.0.0.0:7000\"\n").unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:7000");
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waypoint.toml");
        std::fs::write(&path, "").unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    }
}
