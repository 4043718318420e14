//! Line codec for the metrics protocol.
//!
//! Framing is purely terminator based: every message is one line ending in
//! `\n` (a preceding `\r` is tolerated on input). Multi-line `fetch`
//! responses end with a line holding only [`SENTINEL`].

use crate::error::SessionError;
use crate::Result;

/// Line that terminates a `fetch` response
pub const SENTINEL: &str = ".";

/// Commands a client may send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    List,
    Fetch(&'a str),
    Quit,
}

impl Command<'_> {
    /// Render the command as a newline-terminated wire line
    pub fn encode(&self) -> Result<String> {
        match self {
            Command::List => Ok("list\n".to_string()),
            Command::Fetch(id) => {
                validate_identifier(id)?;
                Ok(format!("fetch {id}\n"))
            }
            Command::Quit => Ok("quit\n".to_string()),
        }
    }

    /// Short name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Command::List => "list",
            Command::Fetch(_) => "fetch",
            Command::Quit => "quit",
        }
    }
}

/// One decoded line of a `fetch` response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchLine {
    Entry(String, String),
    End,
}

/// Remove the trailing `\n` or `\r\n`, nothing else
pub fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Decode the single-line answer to `list`.
///
/// Runs of spaces never produce empty identifiers, so a blank answer
/// decodes to an empty list.
pub fn decode_list(line: &str) -> Vec<String> {
    line.trim().split(' ').filter(|id| !id.is_empty()).map(str::to_string).collect()
}

/// Decode one line of a `fetch` answer.
///
/// The key ends at the first space and the value is everything after it.
/// A line with no space at all is rejected.
pub fn decode_fetch_line(line: &str) -> Result<FetchLine> {
    if line == SENTINEL {
        return Ok(FetchLine::End);
    }

    match line.split_once(' ') {
        Some((key, value)) if !key.is_empty() => {
            Ok(FetchLine::Entry(key.to_string(), value.to_string()))
        }
        _ => Err(SessionError::Decode { line: line.to_string() }),
    }
}

fn validate_identifier(id: &str) -> Result<()> {
    if id.is_empty() || id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(SessionError::InvalidIdentifier(id.to_string()));
    }
    Ok(())
}
