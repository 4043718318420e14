//! Error types for protocol sessions.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::session::SessionState;

/// Everything that can go wrong while talking to a metrics node
#[derive(Debug, Error)]
pub enum SessionError {
    /// Dialing the node failed
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Reading or writing on an established connection failed
    #[error("i/o error while handling {op}: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// The node did not answer within the configured bound
    #[error("{op} timed out after {after:?}")]
    Timeout { op: &'static str, after: Duration },

    /// The node hung up in the middle of an exchange
    #[error("connection closed while waiting for {expected}")]
    UnexpectedEof { expected: &'static str },

    /// A fetch line did not have the `key value` shape
    #[error("malformed response line {line:?}: expected `key value`")]
    Decode { line: String },

    /// Identifier that cannot be framed on the wire
    #[error("invalid metric identifier {0:?}")]
    InvalidIdentifier(String),

    /// A command was issued while the session could not accept one
    #[error("session is not ready for a command (state: {0:?})")]
    NotReady(SessionState),
}

impl SessionError {
    /// Whether the error came from the transport rather than the payload
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. } | Self::Io { .. } | Self::Timeout { .. } | Self::UnexpectedEof { .. }
        )
    }

    /// Whether the node sent a line that violates the response grammar
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}
