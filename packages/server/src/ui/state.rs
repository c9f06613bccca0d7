//! Shared application state.

use std::sync::Arc;

use crate::usecase::{ChatCoordinator, GetRoomStateUseCase};

pub struct AppState {
    /// Serializes every room event
    pub coordinator: Arc<ChatCoordinator>,
    /// Read-only room view for the HTTP API
    pub get_room_state_usecase: Arc<GetRoomStateUseCase>,
}
