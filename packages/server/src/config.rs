//! Server configuration (command-line flags with environment fallbacks).

use std::time::Duration;

use clap::Parser;

use crate::domain::DEFAULT_HISTORY_CAPACITY;

#[derive(Parser, Debug, Clone)]
#[command(name = "hiroba-server")]
#[command(about = "Chat relay server: one shared room over WebSocket, mirrored to Telegram", long_about = None)]
pub struct ServerConfig {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Shared secret every participant must supply to join
    #[arg(long, env = "CHAT_PASSWORD", default_value = "chat_password", hide_env_values = true)]
    pub password: String,

    /// Number of messages kept for catch-up (at least 1)
    #[arg(long, env = "HISTORY_CAPACITY", default_value_t = DEFAULT_HISTORY_CAPACITY, value_parser = parse_capacity)]
    pub history_capacity: usize,

    /// Telegram bot token; the bridge is disabled without it
    #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
    pub telegram_token: Option<String>,

    /// Telegram chat that receives room notices
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub telegram_chat_id: Option<String>,

    /// Long-poll timeout for Telegram getUpdates, in seconds
    #[arg(long, env = "TELEGRAM_POLL_TIMEOUT", default_value_t = 30)]
    pub telegram_poll_timeout: u64,
}

impl ServerConfig {
    pub fn telegram_poll_timeout(&self) -> Duration {
        Duration::from_secs(self.telegram_poll_timeout)
    }
}

fn parse_capacity(raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err("history capacity must be at least 1".to_string()),
        Ok(capacity) => Ok(capacity),
        Err(e) => Err(format!("invalid history capacity '{}': {}", raw, e)),
    }
}
