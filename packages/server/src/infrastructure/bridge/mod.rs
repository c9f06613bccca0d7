//! Bridge adapters and the tasks that drive them.
//!
//! - `telegram`: Telegram Bot API adapter (long polling + sendMessage)
//! - `disabled`: adapter used when no bot token is configured
//! - `worker`: outbound queue drain and inbound polling loop

pub mod disabled;
pub mod telegram;
pub mod worker;

pub use disabled::DisabledBridge;
pub use telegram::{TelegramBridge, TelegramConfig};
pub use worker::{spawn_inbound_listener, spawn_outbound_worker};
