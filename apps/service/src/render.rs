use tracing::error;

use crate::cli::OutputFormat;
use crate::monitoring::ProbeResult;

/// Render a single result as one output line
pub fn render(result: &ProbeResult, format: OutputFormat) -> Option<String> {
    match format {
        OutputFormat::Text => Some(result.to_string()),
        OutputFormat::Json => match serde_json::to_string(result) {
            Ok(line) => Some(line),
            Err(e) => {
                error!("Failed to serialize result for {}: {}", result.target_name, e);
                None
            }
        },
    }
}

/// Print a result to stdout as it arrives
pub fn print(result: &ProbeResult, format: OutputFormat) {
    if let Some(line) = render(result, format) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::Outcome;
    use std::collections::BTreeMap;

    #[test]
    fn test_render_text() {
        let result = ProbeResult::new("web", Outcome::Up);
        assert_eq!(render(&result, OutputFormat::Text).unwrap(), "web is all ok :D");
    }

    #[test]
    fn test_render_json_metrics() {
        let metrics = BTreeMap::from([("load.load".to_string(), "0.42".to_string())]);
        let result = ProbeResult::new("node", Outcome::MetricSet(metrics)).with_elapsed(7);

        let line = render(&result, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();

        assert_eq!(value["status"], "metric_set");
        assert_eq!(value["detail"]["load.load"], "0.42");
        assert_eq!(value["elapsed_ms"], 7);
    }
}
