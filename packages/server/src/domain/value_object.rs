//! Value objects of the chat room.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use super::error::ValueObjectError;

/// Opaque identifier of a transport session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name bound to a connection after admission.
///
/// Always stored trimmed; never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ValueObjectError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyIdentity);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Identity {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an accepted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl TryFrom<&str> for MessageId {
    type Error = ValueObjectError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| ValueObjectError::InvalidMessageId(value.to_string()))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Payload discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    Text,
    Image,
    Video,
    Audio,
    AnimatedImage,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Image => "image",
            MessageKind::Video => "video",
            MessageKind::Audio => "audio",
            MessageKind::AnimatedImage => "animated-image",
        }
    }

    pub fn is_media(&self) -> bool {
        !matches!(self, MessageKind::Text)
    }
}

impl TryFrom<&str> for MessageKind {
    type Error = ValueObjectError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "text" => Ok(MessageKind::Text),
            "image" => Ok(MessageKind::Image),
            "video" => Ok(MessageKind::Video),
            "audio" => Ok(MessageKind::Audio),
            "animated-image" => Ok(MessageKind::AnimatedImage),
            other => Err(ValueObjectError::UnsupportedKind(other.to_string())),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-tagged message body.
///
/// Whitespace-only payloads are rejected for every kind. Text keeps its
/// original spacing; media payloads (URLs or data URIs) are trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageContent {
    kind: MessageKind,
    payload: String,
}

impl MessageContent {
    pub fn new(kind: MessageKind, payload: impl Into<String>) -> Result<Self, ValueObjectError> {
        let payload = payload.into();
        if payload.trim().is_empty() {
            return Err(ValueObjectError::EmptyPayload);
        }
        let payload = if kind.is_media() {
            payload.trim().to_string()
        } else {
            payload
        };
        Ok(Self { kind, payload })
    }

    pub fn text(payload: impl Into<String>) -> Result<Self, ValueObjectError> {
        Self::new(MessageKind::Text, payload)
    }

    /// System text announcing that `identity` joined.
    pub fn joined(identity: &Identity) -> Self {
        Self {
            kind: MessageKind::Text,
            payload: format!("{} has joined the chat.", identity),
        }
    }

    /// System text announcing that `identity` left.
    pub fn left(identity: &Identity) -> Self {
        Self {
            kind: MessageKind::Text,
            payload: format!("{} has left the chat.", identity),
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }
}

/// Longest accepted reaction symbol, in characters.
///
/// Leaves room for multi-codepoint emoji such as ZWJ sequences and flags.
pub const MAX_REACTION_SYMBOL_CHARS: usize = 16;

/// Reaction symbol such as an emoji; trimmed, never empty, at most
/// [`MAX_REACTION_SYMBOL_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ReactionSymbol(String);

impl ReactionSymbol {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ValueObjectError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyReactionSymbol);
        }
        if trimmed.chars().count() > MAX_REACTION_SYMBOL_CHARS {
            return Err(ValueObjectError::ReactionSymbolTooLong(
                MAX_REACTION_SYMBOL_CHARS,
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReactionSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unix timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// The configured shared secret every join must present.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret(String);

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Exact, byte-for-byte comparison.
    pub fn matches(&self, supplied: &str) -> bool {
        self.0 == supplied
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_trimmed() {
        // テスト項目: Identity は前後の空白を除去して保持する
        // given (前提条件):
        let raw = "  alice \t";

        // when (操作):
        let identity = Identity::new(raw).unwrap();

        // then (期待する結果):
        assert_eq!(identity.as_str(), "alice");
    }

    #[test]
    fn test_identity_rejects_whitespace_only() {
        // テスト項目: 空白のみの Identity はエラーになる
        // given (前提条件):
        let raw = "   ";

        // when (操作):
        let result = Identity::new(raw);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::EmptyIdentity));
    }

    #[test]
    fn test_text_content_keeps_inner_spacing() {
        // テスト項目: テキストは元の空白を保ったまま保持される
        // given (前提条件):
        let payload = "  hello  world ";

        // when (操作):
        let content = MessageContent::text(payload).unwrap();

        // then (期待する結果):
        assert_eq!(content.payload(), "  hello  world ");
        assert_eq!(content.kind(), MessageKind::Text);
    }

    #[test]
    fn test_whitespace_only_content_is_rejected() {
        // テスト項目: 空白のみのペイロードはどの種別でもエラーになる
        // given (前提条件):
        let kinds = [MessageKind::Text, MessageKind::Image, MessageKind::AnimatedImage];

        // when (操作) / then (期待する結果):
        for kind in kinds {
            assert_eq!(
                MessageContent::new(kind, " \n "),
                Err(ValueObjectError::EmptyPayload)
            );
        }
    }

    #[test]
    fn test_media_payload_is_trimmed() {
        // テスト項目: メディアの URL は前後の空白が除去される
        // given (前提条件):
        let payload = " https://example.com/cat.png\n";

        // when (操作):
        let content = MessageContent::new(MessageKind::Image, payload).unwrap();

        // then (期待する結果):
        assert_eq!(content.payload(), "https://example.com/cat.png");
    }

    #[test]
    fn test_message_kind_parsing() {
        // テスト項目: 種別文字列がパースされ、未知の種別はエラーになる
        // given (前提条件) / when (操作) / then (期待する結果):
        assert_eq!(
            MessageKind::try_from("animated-image"),
            Ok(MessageKind::AnimatedImage)
        );
        assert_eq!(MessageKind::try_from("video"), Ok(MessageKind::Video));
        assert_eq!(
            MessageKind::try_from("sticker"),
            Err(ValueObjectError::UnsupportedKind("sticker".to_string()))
        );
    }

    #[test]
    fn test_message_id_parsing() {
        // テスト項目: MessageId は UUID 文字列からのみ生成できる
        // given (前提条件):
        let id = MessageId::generate();

        // when (操作):
        let parsed = MessageId::try_from(id.to_string().as_str());
        let invalid = MessageId::try_from("not-a-uuid");

        // then (期待する結果):
        assert_eq!(parsed, Ok(id));
        assert!(matches!(invalid, Err(ValueObjectError::InvalidMessageId(_))));
    }

    #[test]
    fn test_reaction_symbol_length_is_capped() {
        // テスト項目: リアクションシンボルは上限文字数まで受け付け、超えるとエラーになる
        // given (前提条件):
        let at_limit = "a".repeat(MAX_REACTION_SYMBOL_CHARS);
        let over_limit = "a".repeat(MAX_REACTION_SYMBOL_CHARS + 1);
        let family = "👨\u{200d}👩\u{200d}👧\u{200d}👦";

        // when (操作) / then (期待する結果):
        assert!(ReactionSymbol::new(&at_limit).is_ok());
        assert!(ReactionSymbol::new(family).is_ok());
        assert_eq!(
            ReactionSymbol::new(&over_limit),
            Err(ValueObjectError::ReactionSymbolTooLong(
                MAX_REACTION_SYMBOL_CHARS
            ))
        );
        assert_eq!(
            ReactionSymbol::new("  "),
            Err(ValueObjectError::EmptyReactionSymbol)
        );
    }

    #[test]
    fn test_shared_secret_requires_exact_match() {
        // テスト項目: 共有シークレットは完全一致のみ受け付ける
        // given (前提条件):
        let secret = SharedSecret::new("secret");

        // when (操作) / then (期待する結果):
        assert!(secret.matches("secret"));
        assert!(!secret.matches("secret "));
        assert!(!secret.matches("Secret"));
        assert!(!secret.matches(""));
        assert_eq!(format!("{:?}", secret), "SharedSecret(***)");
    }
}
