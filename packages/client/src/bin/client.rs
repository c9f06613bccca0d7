//! Hiroba terminal chat client.
//!
//! Joins the shared room with a nickname and the chat password, renders
//! history, presence, messages and reactions, and sends what you type.
//! Reconnects on a lost connection (max 5 attempts, 5 seconds apart); a
//! rejected join exits immediately.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-client -- --nickname alice --password chat_password
//! cargo run --bin hiroba-client -- -n bob -u ws://127.0.0.1:3000/ws
//! ```

use clap::Parser;

use hiroba_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hiroba-client")]
#[command(about = "Terminal client for the Hiroba chat relay", long_about = None)]
struct Args {
    /// Nickname shown to the other participants (must be unique in the room)
    #[arg(short = 'n', long)]
    nickname: String,

    /// Shared chat password
    #[arg(short = 'p', long, env = "CHAT_PASSWORD", default_value = "chat_password", hide_env_values = true)]
    password: String,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:3000/ws")]
    url: String,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = hiroba_client::run_client(args.url, args.nickname, args.password).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
