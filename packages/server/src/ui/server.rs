//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::usecase::ChatCoordinator;

use super::{
    handler::{debug_room_state, get_room, get_room_messages, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket chat relay server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(coordinator);
/// server.run("127.0.0.1", 3000).await?;
/// ```
pub struct Server {
    coordinator: Arc<ChatCoordinator>,
}

impl Server {
    pub fn new(coordinator: Arc<ChatCoordinator>) -> Self {
        Self { coordinator }
    }

    /// Build the router with every endpoint.
    pub fn router(&self) -> Router {
        let app_state = Arc::new(AppState {
            get_room_state_usecase: Arc::new(self.coordinator.room_state()),
            coordinator: self.coordinator.clone(),
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/room", get(get_room))
            .route("/api/room/messages", get(get_room_messages))
            .route("/debug/room", get(debug_room_state))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Bind to `host:port` and serve until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or serving fails.
    pub async fn run(self, host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Chat relay server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
    }
}
