use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ConfigError;

/// How a target is probed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// One HTTP round trip, up or down
    Reachability,
    /// A metrics session: list then fetch every identifier
    Metric,
    /// The locator could not be classified; probing it yields an error
    Unusable(String),
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Reachability => write!(f, "reachability"),
            TargetKind::Metric => write!(f, "metric"),
            TargetKind::Unusable(_) => write!(f, "unusable"),
        }
    }
}

/// A named thing to probe, fixed for the duration of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,

    /// Full URL for reachability targets, `host:port` for metric targets
    pub locator: String,

    pub kind: TargetKind,
}

impl Target {
    /// Classify a configured locator.
    ///
    /// `http://` and `https://` URLs are reachability targets.
    /// `munin://host[:port]` and bare `host[:port]` are metric targets,
    /// with `default_port` filled in when no port is given.
    pub fn from_entry(name: &str, locator: &str, default_port: u16) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidLocator {
            name: name.to_string(),
            locator: locator.to_string(),
            reason,
        };

        if locator.is_empty() {
            return Err(invalid("locator is empty".to_string()));
        }

        let url = if locator.contains("://") {
            Url::parse(locator)
        } else {
            Url::parse(&format!("munin://{locator}"))
        }
        .map_err(|e| invalid(e.to_string()))?;

        match url.scheme() {
            "http" | "https" => Ok(Self {
                name: name.to_string(),
                locator: url.to_string(),
                kind: TargetKind::Reachability,
            }),
            "munin" => {
                let host = url
                    .host_str()
                    .filter(|host| !host.is_empty())
                    .ok_or_else(|| invalid("missing host".to_string()))?;
                if !matches!(url.path(), "" | "/") {
                    return Err(invalid(format!("unexpected path {:?}", url.path())));
                }
                let port = url.port().unwrap_or(default_port);

                Ok(Self {
                    name: name.to_string(),
                    locator: format!("{host}:{port}"),
                    kind: TargetKind::Metric,
                })
            }
            other => Err(invalid(format!("unsupported scheme {other:?}"))),
        }
    }

    /// Classify every loaded entry.
    ///
    /// A locator that cannot be classified still becomes a target, of kind
    /// [`TargetKind::Unusable`], so it gets its own error result and the
    /// rest of the run goes ahead.
    pub fn from_entries(entries: BTreeMap<String, String>, default_port: u16) -> Vec<Self> {
        entries
            .into_iter()
            .map(|(name, locator)| {
                Self::from_entry(&name, &locator, default_port).unwrap_or_else(|error| {
                    let reason = match error {
                        ConfigError::InvalidLocator { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    Self { name, locator, kind: TargetKind::Unusable(reason) }
                })
            })
            .collect()
    }
}

/// Terminal outcome of one probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    Up,
    Down,
    /// Every fetched value keyed `<identifier>.<key>`
    MetricSet(BTreeMap<String, String>),
    Error(String),
}

/// Result of probing a single target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    pub target_name: String,

    #[serde(flatten)]
    pub outcome: Outcome,

    /// Wall time spent on the probe in milliseconds
    pub elapsed_ms: u64,
}

impl ProbeResult {
    pub fn new(target_name: impl Into<String>, outcome: Outcome) -> Self {
        Self { target_name: target_name.into(), outcome, elapsed_ms: 0 }
    }

    pub fn with_elapsed(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = &self.target_name;
        match &self.outcome {
            Outcome::Up => write!(f, "{name} is all ok :D"),
            Outcome::Down => write!(f, "{name} is Down :("),
            Outcome::MetricSet(metrics) if metrics.is_empty() => {
                write!(f, "{name} metrics: (none)")
            }
            Outcome::MetricSet(metrics) => {
                write!(f, "{name} metrics: ")?;
                for (i, (key, value)) in metrics.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}={value}")?;
                }
                Ok(())
            }
            Outcome::Error(reason) => write!(f, "{name} error: {reason}"),
        }
    }
}
