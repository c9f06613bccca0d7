//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    domain::Room,
    infrastructure::dto::{
        http::{HistoryDto, RoomSummaryDto},
        websocket::MessageDto,
    },
    ui::state::AppState,
};

/// Debug endpoint returning the whole Room aggregate
pub async fn debug_room_state(State(state): State<Arc<AppState>>) -> Json<Room> {
    Json(state.get_room_state_usecase.execute().await)
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Participants and history usage of the shared room
pub async fn get_room(State(state): State<Arc<AppState>>) -> Json<RoomSummaryDto> {
    let room = state.get_room_state_usecase.execute().await;
    // Domain Model から DTO への変換
    Json(RoomSummaryDto::from(&room))
}

/// Current history snapshot
pub async fn get_room_messages(State(state): State<Arc<AppState>>) -> Json<HistoryDto> {
    let messages = state.get_room_state_usecase.history().await;
    Json(HistoryDto {
        messages: messages.iter().map(MessageDto::from).collect(),
    })
}
