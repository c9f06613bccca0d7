//! Hiroba chat relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000 --password secret
//! ```

use clap::Parser;
use hiroba_server::{app, config::ServerConfig};
use hiroba_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    // .env があれば環境変数として読み込む
    let _ = dotenvy::dotenv();

    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let config = ServerConfig::parse();

    if let Err(e) = app::run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
