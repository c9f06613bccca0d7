//! Conversion logic between DTOs and domain types.

use hiroba_shared::time::timestamp_to_jst_rfc3339;

use crate::domain::{
    ChatMessage, InboundEvent, MessageId, MessageKind, Room, RoomEvent, Sender,
    ValueObjectError,
};
use crate::infrastructure::dto::{
    http::RoomSummaryDto,
    websocket::{ClientFrame, MessageDto, OriginDto, ServerFrame},
};

// ========================================
// DTO → Domain
// ========================================

impl TryFrom<ClientFrame> for InboundEvent {
    type Error = ValueObjectError;

    fn try_from(frame: ClientFrame) -> Result<Self, Self::Error> {
        Ok(match frame {
            ClientFrame::Join { nickname, password } => InboundEvent::Join { nickname, password },
            ClientFrame::Message { kind, payload } => InboundEvent::Message {
                kind: MessageKind::try_from(kind.as_str())?,
                payload,
            },
            ClientFrame::Reaction { message_id, symbol } => InboundEvent::Reaction {
                message_id: MessageId::try_from(message_id.as_str())?,
                symbol,
            },
            ClientFrame::Leave => InboundEvent::Leave,
        })
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<&ChatMessage> for MessageDto {
    fn from(message: &ChatMessage) -> Self {
        let origin = match message.sender {
            Sender::Participant(_) => OriginDto::Participant,
            Sender::System => OriginDto::System,
            Sender::Relay => OriginDto::Relay,
        };
        Self {
            id: message.id.to_string(),
            sender: message.sender.display_name().to_string(),
            origin,
            kind: message.content.kind().as_str().to_string(),
            payload: message.content.payload().to_string(),
            timestamp: message.timestamp.value(),
            reactions: message
                .reactions
                .iter()
                .map(|(symbol, count)| (symbol.as_str().to_string(), *count))
                .collect(),
        }
    }
}

impl From<&RoomEvent> for ServerFrame {
    fn from(event: &RoomEvent) -> Self {
        match event {
            RoomEvent::History(messages) => ServerFrame::History {
                messages: messages.iter().map(MessageDto::from).collect(),
            },
            RoomEvent::Presence(identities) => ServerFrame::Presence {
                identities: identities.iter().map(|i| i.as_str().to_string()).collect(),
            },
            RoomEvent::Message(message) => ServerFrame::Message {
                message: message.into(),
            },
            RoomEvent::ReactionUpdate {
                message_id,
                symbol,
                count,
            } => ServerFrame::ReactionUpdate {
                message_id: message_id.to_string(),
                symbol: symbol.as_str().to_string(),
                count: *count,
            },
            RoomEvent::Error(rejection) => ServerFrame::Error {
                reason: rejection.code().to_string(),
                detail: rejection.to_string(),
            },
        }
    }
}

impl From<&Room> for RoomSummaryDto {
    fn from(room: &Room) -> Self {
        Self {
            participants: room
                .presence_snapshot()
                .into_iter()
                .map(|identity| identity.into_string())
                .collect(),
            history_len: room.history_len(),
            history_capacity: room.history_capacity(),
            created_at: timestamp_to_jst_rfc3339(room.created_at.value()),
        }
    }
}
