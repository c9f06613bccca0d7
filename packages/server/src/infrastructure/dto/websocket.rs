//! WebSocket frame DTOs.
//!
//! Every frame is a JSON object tagged by `type`.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Frame sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientFrame {
    /// A missing or `null` field reads as empty so that admission can reject it.
    Join {
        #[serde(default, deserialize_with = "null_as_empty")]
        nickname: String,
        #[serde(default, deserialize_with = "null_as_empty")]
        password: String,
    },
    Message {
        kind: String,
        payload: String,
    },
    Reaction {
        message_id: String,
        symbol: String,
    },
    Leave,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Frame sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerFrame {
    History {
        messages: Vec<MessageDto>,
    },
    Presence {
        identities: Vec<String>,
    },
    Message {
        message: MessageDto,
    },
    ReactionUpdate {
        message_id: String,
        symbol: String,
        count: u32,
    },
    Error {
        /// `missing-identity`, `bad-credential` or `identity-taken`
        reason: String,
        /// Human-readable description of `reason`
        detail: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginDto {
    Participant,
    System,
    Relay,
}

/// A chat message as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: String,
    pub sender: String,
    pub origin: OriginDto,
    pub kind: String,
    pub payload: String,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    #[serde(default)]
    pub reactions: BTreeMap<String, u32>,
}
