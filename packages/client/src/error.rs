//! Error types for the chat client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The server refused the join (missing-identity, bad-credential, identity-taken)
    #[error("Join rejected by the server: {0}")]
    Rejected(String),

    /// Could not establish the WebSocket connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The server went away mid-session
    #[error("Connection lost")]
    ConnectionLost,
}
