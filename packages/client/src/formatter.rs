//! Message formatting utilities for client display.

use hiroba_server::infrastructure::dto::websocket::{MessageDto, OriginDto};
use hiroba_shared::time::timestamp_to_jst_clock;

/// Number of id characters shown next to a message; enough for `/react`.
const SHORT_ID_LEN: usize = 8;

const RULE: &str = "============================================================";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    pub fn short_id(id: &str) -> &str {
        id.get(..SHORT_ID_LEN).unwrap_or(id)
    }

    /// Format the catch-up history received right after joining
    pub fn format_history(messages: &[MessageDto]) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n\n{}\n", RULE));
        if messages.is_empty() {
            output.push_str("(No messages yet)\n");
        } else {
            output.push_str(&format!("Last {} message(s):\n", messages.len()));
            for message in messages {
                output.push_str(&Self::format_message_line(message));
                output.push('\n');
            }
        }
        output.push_str(&format!("{}\n", RULE));
        output
    }

    /// Format the presence list, marking the current user
    pub fn format_presence(identities: &[String], me: &str) -> String {
        let names: Vec<String> = identities
            .iter()
            .map(|name| {
                if name == me {
                    format!("{} (me)", name)
                } else {
                    name.clone()
                }
            })
            .collect();
        format!("\nOnline ({}): {}\n", identities.len(), names.join(", "))
    }

    /// Format a broadcast message
    pub fn format_message(message: &MessageDto) -> String {
        format!("\n{}\n", Self::format_message_line(message))
    }

    fn format_message_line(message: &MessageDto) -> String {
        let clock = timestamp_to_jst_clock(message.timestamp);
        let body = match message.origin {
            OriginDto::System => format!("* {}", message.payload),
            OriginDto::Participant | OriginDto::Relay if message.kind == "text" => {
                format!("@{}: {}", message.sender, message.payload)
            }
            OriginDto::Participant | OriginDto::Relay => {
                format!("@{} [{}]: {}", message.sender, message.kind, message.payload)
            }
        };

        let mut line = format!("[{}] {} ({})", clock, body, Self::short_id(&message.id));
        if !message.reactions.is_empty() {
            let tally: Vec<String> = message
                .reactions
                .iter()
                .map(|(symbol, count)| format!("{} {}", symbol, count))
                .collect();
            line.push_str(&format!("  {}", tally.join("  ")));
        }
        line
    }

    /// Format a reaction tally update
    pub fn format_reaction(message_id: &str, symbol: &str, count: u32) -> String {
        format!(
            "\n{} x{} on ({})\n",
            symbol,
            count,
            Self::short_id(message_id)
        )
    }

    /// Format an admission rejection
    pub fn format_rejection(reason: &str) -> String {
        let hint = match reason {
            "missing-identity" => "a nickname is required",
            "bad-credential" => "the password is wrong",
            "identity-taken" => "that nickname is already in the room",
            _ => "unknown reason",
        };
        format!("\n! Join rejected ({}): {}\n", reason, hint)
    }

    /// Format local feedback that was never sent to the server
    pub fn format_notice(text: &str) -> String {
        format!("\n{}\n", text)
    }
}
