use std::time::Duration;
use std::{fmt, fs, path};

use isitdown_wire::{DEFAULT_PORT, SessionConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ConfigError, default_settings_path};

/// Runtime settings for a probe run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bound on opening a connection to a metrics node
    pub connect_timeout_secs: u64,

    /// Bound on each line exchanged with a metrics node
    pub read_timeout_secs: u64,

    /// Bound on a whole fetch response from a metrics node
    pub fetch_timeout_secs: u64,

    /// Bound on a whole reachability request
    pub http_timeout_secs: u64,

    /// Upper limit on probes in flight; unset means one task per target
    /// with no cap
    pub max_concurrency: Option<usize>,

    /// Port used for metric targets that do not name one
    pub default_port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            read_timeout_secs: 10,
            fetch_timeout_secs: 30,
            http_timeout_secs: 10,
            max_concurrency: None,
            default_port: DEFAULT_PORT,
        }
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);

        writeln!(f, "Current Probe Settings:")?;
        write_title_1(f, "Timeouts (seconds)")?;
        write_1(f, "Connect", &self.connect_timeout_secs)?;
        write_1(f, "Read", &self.read_timeout_secs)?;
        write_1(f, "Fetch", &self.fetch_timeout_secs)?;
        write_1(f, "HTTP", &self.http_timeout_secs)?;
        write_title_1(f, "Dispatch")?;
        match self.max_concurrency {
            Some(limit) => write_1(f, "Max Concurrency", &limit)?,
            None => write_1(f, "Max Concurrency", &"unbounded")?,
        }
        write_1(f, "Default Metrics Port", &self.default_port)?;

        Ok(())
    }
}

impl Settings {
    /// Load settings from a TOML file.
    ///
    /// With no path, the default location is tried and a missing file
    /// yields defaults. An explicit path must exist.
    pub fn from_config(optional_path: Option<&path::Path>) -> Result<Self, ConfigError> {
        let (config_path, required) = match optional_path {
            Some(path) => (path.to_path_buf(), true),
            None => (default_settings_path()?, false),
        };

        if !required && !config_path.exists() {
            debug!("No settings at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }

        let raw_string = fs::read_to_string(&config_path)
            .map_err(|source| ConfigError::Read { path: config_path.clone(), source })?;

        Self::from_toml(&raw_string, &config_path)
    }

    fn from_toml(raw: &str, origin: &path::Path) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(raw)
            .map_err(|source| ConfigError::Parse { path: origin.to_path_buf(), source })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would make a run hang or never start
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timeouts = [
            self.connect_timeout_secs,
            self.read_timeout_secs,
            self.fetch_timeout_secs,
            self.http_timeout_secs,
        ];
        if timeouts.contains(&0) {
            return Err(ConfigError::Invalid("timeouts must be at least one second".to_string()));
        }

        if self.max_concurrency == Some(0) {
            return Err(ConfigError::Invalid("max_concurrency must be at least 1".to_string()));
        }

        if self.default_port == 0 {
            return Err(ConfigError::Invalid("default_port must not be 0".to_string()));
        }

        Ok(())
    }

    /// Use the same bound for every timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self.read_timeout_secs = secs;
        self.fetch_timeout_secs = secs;
        self.http_timeout_secs = secs;
        self
    }

    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit);
        self
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            read_timeout: Duration::from_secs(self.read_timeout_secs),
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
