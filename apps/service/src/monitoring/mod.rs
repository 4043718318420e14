/// Probe engine - runs one probe per target and gathers the results
///
/// This module is responsible for:
/// - Classifying targets and describing results
/// - Executing reachability and metric probes
/// - Dispatching probes concurrently and counting results back in
pub mod checker;
pub mod dispatcher;
pub mod executor;
pub mod types;

pub use dispatcher::ProbeDispatcher;
pub use executor::ProbeExecutor;
pub use types::{Outcome, ProbeResult, Target};
