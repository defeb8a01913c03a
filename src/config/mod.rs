use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::infrastructure::runtime::DEFAULT_POLL_INTERVAL;
use crate::infrastructure::transport::DEFAULT_RPC_URL;

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    pub name: Option<String>,
    pub rpc: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Node URL used when nothing else is given
    pub rpc: Option<String>,

    pub poll_interval_ms: Option<u64>,

    /// HTTP request timeout
    pub timeout_ms: Option<u64>,

    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
}

impl Config {
    /// `$ETHWIRE_RPC_URL`, then the file's `rpc`, then the local default
    pub fn rpc_url(&self) -> String {
        std::env::var("ETHWIRE_RPC_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.rpc.clone())
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string())
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Resolve a named endpoint
    pub fn endpoint(&self, name: &str) -> Option<&EndpointConfig> {
        self.endpoints
            .iter()
            .find(|endpoint| endpoint.name.as_deref() == Some(name))
    }
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    parse(&content)
}

/// Unparseable content yields the defaults
pub fn parse(content: &str) -> Config {
    match toml::from_str::<Config>(content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(%err, "ignoring invalid config file");
            Config::default()
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("ETHWIRE_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("ethwire").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("ethwire").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "ethwire", "ethwire")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
