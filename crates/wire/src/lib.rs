//! isitdown-wire - client side of the line-oriented metrics protocol
//!
//! The protocol is the one spoken by munin-style nodes: the server greets
//! with one banner line, `list` answers with a single line of identifiers
//! and `fetch <id>` answers with `key value` lines closed by a lone `.`.
//! A [`Session`] owns one connection and enforces one command in flight.

pub mod codec;
pub mod error;
pub mod session;
pub mod types;

// Re-export main types
pub use codec::{Command, FetchLine, SENTINEL};
pub use error::SessionError;
pub use session::{Session, SessionConfig, SessionState};
pub use types::MetricRecord;

/// Result type used throughout the wire crate
pub type Result<T> = std::result::Result<T, SessionError>;

/// Well-known port of a metrics node
pub const DEFAULT_PORT: u16 = 4949;
