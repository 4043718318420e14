use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Result;
use isitdown_wire::{Session, SessionConfig, SessionError};
use tracing::debug;

use super::types::{Outcome, Target};

/// Status codes at or above this count as a failed reachability check
pub const HTTP_ERROR_THRESHOLD: u16 = 400;

/// One way of checking a target.
///
/// Implementations never fail: every problem is folded into the returned
/// [`Outcome`] so the caller always gets exactly one terminal answer.
#[async_trait::async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, target: &Target) -> Outcome;
}

/// Reachability probe: a single GET, no retries
pub struct ReachabilityProbe {
    client: reqwest::Client,
}

impl ReachabilityProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("is-it-down/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(client))
    }

    /// Use a preconfigured client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Probe for ReachabilityProbe {
    async fn probe(&self, target: &Target) -> Outcome {
        match self.client.get(&target.locator).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                debug!("{} answered with status {}", target.name, status);

                if status < HTTP_ERROR_THRESHOLD { Outcome::Up } else { Outcome::Down }
            }
            Err(e) => {
                debug!("{} is unreachable: {}", target.name, e);
                Outcome::Down
            }
        }
    }
}

/// Metric probe: list every identifier on a node and fetch each one
pub struct MetricProbe {
    config: SessionConfig,
}

impl MetricProbe {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Drive one session to completion, stopping at the first error
    async fn collect(&self, address: &str) -> Result<BTreeMap<String, String>, SessionError> {
        let mut session = Session::connect(address, &self.config).await?;
        let identifiers = session.list().await?;
        debug!("{} serves {} metrics", address, identifiers.len());

        let mut metrics = BTreeMap::new();
        for identifier in &identifiers {
            let record = session.fetch(identifier).await?;
            for (key, value) in record {
                metrics.insert(format!("{identifier}.{key}"), value);
            }
        }

        session.quit().await;
        Ok(metrics)
    }
}

#[async_trait::async_trait]
impl Probe for MetricProbe {
    async fn probe(&self, target: &Target) -> Outcome {
        match self.collect(&target.locator).await {
            Ok(metrics) => Outcome::MetricSet(metrics),
            Err(e) => Outcome::Error(e.to_string()),
        }
    }
}
