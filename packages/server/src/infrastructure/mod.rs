//! Infrastructure layer: wire formats and concrete port implementations.

pub mod bridge;
pub mod dto;
pub mod message_pusher;
pub mod repository;
