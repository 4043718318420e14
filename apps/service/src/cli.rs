use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use tracing::level_filters::LevelFilter;

use crate::config::Settings;

/// How results are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One human readable line per target
    Text,
    /// One JSON object per target
    Json,
}

/// Check whether the things you care about are up
#[derive(Debug, Parser)]
#[command(name = "is-it-down", version)]
pub struct Cli {
    /// Targets file with one `name = locator` per line
    /// [default: $XDG_CONFIG_HOME/is_it_down]
    #[arg(short, long, value_name = "PATH")]
    pub targets: Option<PathBuf>,

    /// Settings file in TOML [default: $XDG_CONFIG_HOME/is_it_down.toml]
    #[arg(short, long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Override every network timeout
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Cap on probes running at the same time
    #[arg(long, value_name = "N")]
    pub max_concurrency: Option<usize>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Print the effective settings and exit
    #[arg(long)]
    pub print_settings: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    /// Layer command line overrides on top of file settings
    pub fn apply_overrides(&self, mut settings: Settings) -> Settings {
        if let Some(secs) = self.timeout {
            settings = settings.with_timeout(secs);
        }
        if let Some(limit) = self.max_concurrency {
            settings = settings.with_max_concurrency(limit);
        }
        settings
    }
}
