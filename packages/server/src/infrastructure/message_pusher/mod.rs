//! `MessagePusher` implementations.
//!
//! - `websocket`: one outbound channel per WebSocket connection

pub mod websocket;

pub use websocket::WebSocketMessagePusher;
