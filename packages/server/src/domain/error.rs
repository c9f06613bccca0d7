//! Domain error types.

use thiserror::Error;

/// Value object construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("identity must not be empty")]
    EmptyIdentity,

    #[error("message payload must not be empty")]
    EmptyPayload,

    #[error("reaction symbol must not be empty")]
    EmptyReactionSymbol,

    #[error("reaction symbol must be at most {0} characters")]
    ReactionSymbolTooLong(usize),

    #[error("unsupported message kind: {0}")]
    UnsupportedKind(String),

    #[error("invalid message id: {0}")]
    InvalidMessageId(String),
}

/// Room aggregate errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("connection '{0}' is unknown")]
    UnknownConnection(String),

    #[error("connection '{0}' is already open")]
    ConnectionAlreadyOpen(String),

    #[error("connection '{0}' is not in the expected state")]
    InvalidConnectionState(String),

    #[error("identity '{0}' is already present")]
    IdentityTaken(String),

    #[error("connection '{0}' has no identity bound")]
    NotJoined(String),
}

/// Repository errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Room(#[from] RoomError),
}

/// Failure of an admission transaction on the room
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmitError {
    #[error("join rejected: {0}")]
    Rejected(#[from] super::admission::AdmissionRejection),

    #[error(transparent)]
    Room(#[from] RoomError),
}
