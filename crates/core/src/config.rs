//! Loads `config.toml`, writing sensible defaults on first run.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ProxyError;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen: ListenConfig,
    pub remote: RemoteConfig,
    pub motd: MotdConfig,
    pub advertiser: AdvertiserConfig,
    /// Raises the default tracing filter from `info` to `debug`. Overridden by
    /// `RUST_LOG` when that variable is set.
    pub debug_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    pub address: SocketAddr,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0:19150".parse().unwrap(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub address: SocketAddr,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:19132".parse().unwrap(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotdConfig {
    pub motd: String,
    pub sub_motd: String,
    pub version_name: String,
    pub max_players: u32,
    pub game_type: String,
}

impl Default for MotdConfig {
    fn default() -> Self {
        Self {
            motd: "A Bedrock Proxy".to_string(),
            sub_motd: "bedrock-proxy".to_string(),
            version_name: "1.21.90".to_string(),
            max_players: 20,
            game_type: "Survival".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvertiserConfig {
    pub enabled: bool,
    pub interval_ms: u64,
}

impl Default for AdvertiserConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 1500,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: ListenConfig::default(),
            remote: RemoteConfig::default(),
            motd: MotdConfig::default(),
            advertiser: AdvertiserConfig::default(),
            debug_logging: false,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ProxyError> {
        if self.motd.max_players == 0 {
            return Err(ProxyError::ConfigInvalid(
                "motd.max_players must be greater than 0".to_string(),
            ));
        }
        if !matches!(self.motd.game_type.as_str(), "Survival" | "Creative") {
            return Err(ProxyError::ConfigInvalid(format!(
                "motd.game_type must be \"Survival\" or \"Creative\", got {:?}",
                self.motd.game_type
            )));
        }
        Ok(())
    }

    /// Loads `path`, creating it with defaults if it does not exist yet.
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self, ProxyError> {
        let path = path.as_ref();
        if path.exists() {
            let contents = fs::read_to_string(path).map_err(|source| ProxyError::ConfigRead {
                path: path.display().to_string(),
                source,
            })?;
            let config: Config = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            let serialized = toml::to_string_pretty(&config)?;
            fs::write(path, serialized).map_err(|source| ProxyError::ConfigRead {
                path: path.display().to_string(),
                source,
            })?;
            tracing::info!(path = %path.display(), "wrote default configuration");
            Ok(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_default_config_when_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.motd.max_players, 20);
    }

    #[test]
    fn loads_existing_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[motd]\nmax_players = 5\n").unwrap();

        let config = Config::load_or_create(&path).unwrap();
        assert_eq!(config.motd.max_players, 5);
        assert_eq!(config.motd.motd, "A Bedrock Proxy");
    }

    #[test]
    fn rejects_invalid_game_type() {
        let mut config = Config::default();
        config.motd.game_type = "Creative Mode".to_string();
        assert!(config.validate().is_err());
    }
}
