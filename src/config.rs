use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    /// Interval between driver ticks, in milliseconds
    pub tick_interval_ms: u64,
    /// Optional file every request and reply envelope is appended to
    pub api_log_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    pub backlog: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            tick_interval_ms: 25,
            api_log_path: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8765,
            backlog: 5,
        }
    }
}

impl Config {
    /// Loads configuration.
    ///
    /// Reads the YAML file named by `HOSTLINK_CONFIG` when set,
    /// otherwise starts from defaults. `HOSTLINK_BIND` overrides the
    /// bind address either way.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var("HOSTLINK_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };

        if let Ok(addr) = std::env::var("HOSTLINK_BIND") {
            cfg.server.bind_addr = addr;
        }

        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}
