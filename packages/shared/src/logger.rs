//! Logging setup for the Hiroba binaries.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose events are enabled at the default level.
const WORKSPACE_TARGETS: [&str; 3] = ["hiroba_shared", "hiroba_server", "hiroba_client"];

/// Build the default filter directive used when `RUST_LOG` is not set.
///
/// Every workspace crate and the binary itself get `default_log_level`;
/// HTTP request traces from `tower_http` stay at `info`.
pub fn default_directive(binary_name: &str, default_log_level: &str) -> String {
    let mut directives: Vec<String> = WORKSPACE_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, default_log_level))
        .collect();

    let binary_target = binary_name.replace('-', "_");
    if !WORKSPACE_TARGETS.contains(&binary_target.as_str()) {
        directives.push(format!("{}={}", binary_target, default_log_level));
    }
    directives.push("tower_http=info".to_string());

    directives.join(",")
}

/// Initialize the tracing subscriber.
///
/// The level can be overridden with the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "hiroba-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info")
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
