//! HTTP and WebSocket handlers.

mod http;
mod websocket;

pub use http::{debug_room_state, get_room, get_room_messages, health_check};
pub use websocket::websocket_handler;
