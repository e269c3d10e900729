use std::{env, fs, path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_CHECK_INTERVAL_SECONDS: u64 = 60;
pub const DEFAULT_PROBE_TIMEOUT_SECONDS: u64 = 5;
pub const DEFAULT_MAX_CONCURRENT_PROBES: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(std::io::Error),
    #[error("failed to write default config file: {0}")]
    Write(std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize default config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("no config directory available")]
    ConfigPathUnavailable,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: Server,
    pub database: Database,
    pub monitor: Monitor,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Database {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Monitor {
    pub check_interval_seconds: u64,
    pub probe_timeout_seconds: u64,
    pub max_concurrent_probes: usize,
}

impl Default for Server {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

impl Default for Database {
    fn default() -> Self {
        Self { path: "beacon.db".into() }
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Self {
            check_interval_seconds: DEFAULT_CHECK_INTERVAL_SECONDS,
            probe_timeout_seconds: DEFAULT_PROBE_TIMEOUT_SECONDS,
            max_concurrent_probes: DEFAULT_MAX_CONCURRENT_PROBES,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self { server: Server::default(), database: Database::default(), monitor: Monitor::default() }
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Default config path ($XDG_CONFIG_HOME/beacon/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, ConfigError> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(ConfigError::ConfigPathUnavailable);
    };

    Ok(path.join("beacon/config.toml"))
}

impl Config {
    /// Load the config from the given path, or the default path when none is
    /// given. A missing file is created with the defaults so the knobs are
    /// discoverable. Environment overrides and fallback rules apply on top.
    pub fn load(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        let mut config: Self = if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path).map_err(ConfigError::Read)?;
            toml::from_str(raw_string.as_str())?
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            config
        };

        config.apply_overrides(|name| env::var(name).ok());
        config.sanitize();

        Ok(config)
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), ConfigError> {
        let config_str: String = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::Write)?;
        }

        fs::write(path, config_str).map_err(ConfigError::Write)
    }

    /// Deploy-time knobs override the file without editing it. Unparsable
    /// values are ignored with a warning rather than failing startup.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup("PORT") {
            match raw.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("ignoring unparsable PORT override: {raw:?}"),
            }
        }

        if let Some(db_path) = lookup("DATABASE_PATH") {
            self.database.path = db_path;
        }

        if let Some(raw) = lookup("CHECK_INTERVAL") {
            match raw.parse() {
                Ok(seconds) => self.monitor.check_interval_seconds = seconds,
                Err(_) => warn!("ignoring unparsable CHECK_INTERVAL override: {raw:?}"),
            }
        }
    }

    /// Values that would stall the checker fall back to the defaults.
    fn sanitize(&mut self) {
        if self.monitor.check_interval_seconds == 0 {
            warn!(
                "check interval must be positive, falling back to {DEFAULT_CHECK_INTERVAL_SECONDS}s"
            );
            self.monitor.check_interval_seconds = DEFAULT_CHECK_INTERVAL_SECONDS;
        }

        if self.monitor.probe_timeout_seconds == 0 {
            self.monitor.probe_timeout_seconds = DEFAULT_PROBE_TIMEOUT_SECONDS;
        }

        if self.monitor.max_concurrent_probes == 0 {
            self.monitor.max_concurrent_probes = DEFAULT_MAX_CONCURRENT_PROBES;
        }
    }
}
