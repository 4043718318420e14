use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{Semaphore, mpsc};
use tracing::{error, info};

use super::executor::ProbeExecutor;
use super::types::{Outcome, ProbeResult, Target};

/// Probe dispatcher - fans targets out to tasks and counts results back in.
///
/// Every target gets its own task. Without a concurrency limit they all
/// start at once, so a large target list opens as many connections as it
/// has entries; `max_concurrency` caps that with a semaphore.
pub struct ProbeDispatcher {
    executor: Arc<ProbeExecutor>,
    limit: Option<Arc<Semaphore>>,
}

impl ProbeDispatcher {
    /// Create a new probe dispatcher
    pub fn new(executor: Arc<ProbeExecutor>, max_concurrency: Option<usize>) -> Self {
        Self { executor, limit: max_concurrency.map(|n| Arc::new(Semaphore::new(n.max(1)))) }
    }

    /// Probe every target and return once each has produced one result.
    ///
    /// `on_result` sees results in arrival order, which is unrelated to the
    /// order of `targets`.
    pub async fn run<F>(&self, targets: Vec<Target>, mut on_result: F) -> Vec<ProbeResult>
    where
        F: FnMut(&ProbeResult),
    {
        let expected = targets.len();
        info!("Dispatching {} probes", expected);

        let mut pending: HashMap<String, usize> = HashMap::new();
        for target in &targets {
            *pending.entry(target.name.clone()).or_default() += 1;
        }

        let (result_tx, mut result_rx) = mpsc::unbounded_channel();
        for target in targets {
            self.spawn_probe(target, result_tx.clone());
        }
        // Only the tasks hold senders now, so the channel closes once they are all gone
        drop(result_tx);

        let mut results = Vec::with_capacity(expected);
        while results.len() < expected {
            let Some(result) = result_rx.recv().await else { break };

            if let Some(count) = pending.get_mut(&result.target_name) {
                *count -= 1;
                if *count == 0 {
                    pending.remove(&result.target_name);
                }
            }

            on_result(&result);
            results.push(result);
        }

        // A task that vanished without reporting still owes its target an answer
        for (name, count) in pending {
            for _ in 0..count {
                error!("Probe task for {} ended without a result", name);
                let result = ProbeResult::new(name.clone(), Outcome::Error("probe task vanished".to_string()));
                on_result(&result);
                results.push(result);
            }
        }

        info!("All {} probes finished", results.len());
        results
    }

    fn spawn_probe(&self, target: Target, result_tx: mpsc::UnboundedSender<ProbeResult>) {
        let executor = self.executor.clone();
        let limit = self.limit.clone();

        tokio::spawn(async move {
            let _permit = match limit {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };

            let result = AssertUnwindSafe(executor.execute(&target))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| {
                    let reason = format!("probe panicked: {}", panic_message(panic.as_ref()));
                    error!("{}: {}", target.name, reason);
                    ProbeResult::new(target.name.clone(), Outcome::Error(reason))
                });

            if result_tx.send(result).is_err() {
                error!("Result receiver dropped before {} reported", target.name);
            }
        });
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
