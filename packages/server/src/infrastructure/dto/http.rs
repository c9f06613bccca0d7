//! HTTP API response DTOs.

use serde::Serialize;

use super::websocket::MessageDto;

/// Summary of the shared room
#[derive(Debug, Clone, Serialize)]
pub struct RoomSummaryDto {
    pub participants: Vec<String>,
    pub history_len: usize,
    pub history_capacity: usize,
    /// RFC 3339 in JST
    pub created_at: String,
}

/// Current history snapshot
#[derive(Debug, Clone, Serialize)]
pub struct HistoryDto {
    pub messages: Vec<MessageDto>,
}
