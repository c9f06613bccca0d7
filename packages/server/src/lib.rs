//! Hiroba chat relay server.
//!
//! One shared room over WebSocket: nickname admission with a shared secret,
//! a live presence list, a bounded catch-up history, reactions, and an
//! optional Telegram bridge that mirrors the room.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod app;
pub mod config;
