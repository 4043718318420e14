//! Configuration: the targets file and the runtime settings file.

mod settings;
mod targets;

use std::{env, io, path};

use thiserror::Error;

pub use settings::Settings;
pub use targets::read_targets_file;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("neither XDG_CONFIG_HOME nor a home directory is available")]
    PathUnavailable,

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: path::PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read config source: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: path::PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("target {name:?} has an unusable locator {locator:?}: {reason}")]
    InvalidLocator { name: String, locator: String, reason: String },

    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Base configuration directory ($XDG_CONFIG_HOME or $HOME/.config)
fn config_dir() -> Result<path::PathBuf, ConfigError> {
    if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        if !config_home.is_empty() {
            return Ok(path::PathBuf::from(config_home));
        }
    }

    env::home_dir().map(|home| home.join(".config")).ok_or(ConfigError::PathUnavailable)
}

/// Default targets file ($XDG_CONFIG_HOME/is_it_down)
pub fn default_targets_path() -> Result<path::PathBuf, ConfigError> {
    Ok(config_dir()?.join("is_it_down"))
}

/// Default settings file ($XDG_CONFIG_HOME/is_it_down.toml)
pub fn default_settings_path() -> Result<path::PathBuf, ConfigError> {
    Ok(config_dir()?.join("is_it_down.toml"))
}
