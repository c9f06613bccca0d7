//! Adapter used when the bridge is not configured.

use async_trait::async_trait;

use crate::domain::{BridgeAdapter, BridgeError, RelayChatId, RelayInbound};

/// Drops every outbound notice and never yields inbound messages.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledBridge;

#[async_trait]
impl BridgeAdapter for DisabledBridge {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn send_outbound(&self, text: &str) -> Result<(), BridgeError> {
        tracing::debug!("Bridge disabled, dropping notice: {}", text);
        Ok(())
    }

    async fn reply(&self, chat: &RelayChatId, text: &str) -> Result<(), BridgeError> {
        tracing::debug!("Bridge disabled, dropping reply to '{}': {}", chat, text);
        Ok(())
    }

    async fn poll_inbound(&self) -> Result<Vec<RelayInbound>, BridgeError> {
        Ok(Vec::new())
    }
}
