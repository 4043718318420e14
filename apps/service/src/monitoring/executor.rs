use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::{debug, warn};

use super::checker::{MetricProbe, Probe, ReachabilityProbe};
use super::types::{Outcome, ProbeResult, Target, TargetKind};
use crate::config::Settings;

/// Probe executor - runs the right probe for a target and times it
pub struct ProbeExecutor {
    reachability: Arc<dyn Probe>,
    metric: Arc<dyn Probe>,
}

impl ProbeExecutor {
    /// Create an executor from runtime settings
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self::with_probes(
            Arc::new(ReachabilityProbe::new(settings.http_timeout())?),
            Arc::new(MetricProbe::new(settings.session_config())),
        ))
    }

    /// Create an executor with explicit probe implementations
    pub fn with_probes(reachability: Arc<dyn Probe>, metric: Arc<dyn Probe>) -> Self {
        Self { reachability, metric }
    }

    /// Execute a probe against `target`
    pub async fn execute(&self, target: &Target) -> ProbeResult {
        let probe: &dyn Probe = match &target.kind {
            TargetKind::Reachability => self.reachability.as_ref(),
            TargetKind::Metric => self.metric.as_ref(),
            TargetKind::Unusable(reason) => {
                warn!("{} has an unusable locator {:?}: {}", target.name, target.locator, reason);
                let outcome = Outcome::Error(format!("unusable locator: {reason}"));
                return ProbeResult::new(target.name.clone(), outcome);
            }
        };

        debug!("Probing {} ({}) at {}", target.name, target.kind, target.locator);
        let start = Instant::now();
        let outcome = probe.probe(target).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &outcome {
            Outcome::Down => warn!("{} is down", target.name),
            Outcome::Error(reason) => warn!("{} failed: {}", target.name, reason),
            _ => debug!("{} finished in {} ms", target.name, elapsed_ms),
        }

        ProbeResult::new(target.name.clone(), outcome).with_elapsed(elapsed_ms)
    }
}
