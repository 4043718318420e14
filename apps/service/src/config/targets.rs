//! Loader for the targets file.
//!
//! Each probe sits on its own line as `name = locator`. Whitespace around
//! the name and the locator is ignored, so all of these are equal:
//!
//! ```text
//! Example = https://www.example.com
//!  Example = https://www.example.com
//! Example=https://www.example.com
//! ```
//!
//! Lines starting with `#` are comments. Lines without an `=` are skipped
//! silently. Only the first `=` splits, so a locator may carry its own
//! (`Search = https://example.com/?q=up`). When a name repeats, the last
//! line wins.

use std::collections::BTreeMap;
use std::fs;
use std::io::BufRead;
use std::path::Path;

use tracing::{debug, trace};

use super::ConfigError;

/// Parse `name = locator` lines from any buffered source
pub fn parse_targets(source: impl BufRead) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut targets = BTreeMap::new();

    for line in source.lines() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((name, locator)) = line.split_once('=') else {
            trace!("Skipping line without '=': {:?}", line);
            continue;
        };

        let name = name.trim();
        if name.is_empty() {
            trace!("Skipping line without a name: {:?}", line);
            continue;
        }

        if let Some(previous) = targets.insert(name.to_string(), locator.trim().to_string()) {
            debug!("Target {} redefined, dropping {}", name, previous);
        }
    }

    Ok(targets)
}

/// Open and parse a targets file
pub fn read_targets_file(path: &Path) -> Result<BTreeMap<String, String>, ConfigError> {
    let file = fs::File::open(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

    parse_targets(std::io::BufReader::new(file))
}
