//! Domain logic for client-side operations.
//!
//! Pure functions with no I/O: input parsing, message id resolution and the
//! reconnect policy.

use hiroba_server::domain::MessageKind;

use crate::error::ClientError;

pub const REACT_USAGE: &str = "Usage: /react <message-id-prefix> <symbol>";

/// What a line typed by the user asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Send { kind: MessageKind, payload: String },
    React { id_prefix: String, symbol: String },
    Quit,
    /// Local-only feedback; nothing is sent
    Invalid(String),
}

/// Parse one line of input.
///
/// Plain text is a text message. `/image`, `/video`, `/audio` and `/gif`
/// take a URL. Lines are expected to be trimmed already.
pub fn parse_input(line: &str) -> UserCommand {
    let Some(command) = line.strip_prefix('/') else {
        return UserCommand::Send {
            kind: MessageKind::Text,
            payload: line.to_string(),
        };
    };

    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map(|(name, rest)| (name, rest.trim()))
        .unwrap_or((command, ""));

    let media_kind = match name {
        "quit" => return UserCommand::Quit,
        "react" => return parse_react(rest),
        "image" => MessageKind::Image,
        "video" => MessageKind::Video,
        "audio" => MessageKind::Audio,
        "gif" => MessageKind::AnimatedImage,
        _ => return UserCommand::Invalid(format!("Unknown command: /{}", name)),
    };

    if rest.is_empty() {
        return UserCommand::Invalid(format!("Usage: /{} <url>", name));
    }
    UserCommand::Send {
        kind: media_kind,
        payload: rest.to_string(),
    }
}

fn parse_react(rest: &str) -> UserCommand {
    match rest.split_once(char::is_whitespace) {
        Some((id_prefix, symbol)) if !symbol.trim().is_empty() => UserCommand::React {
            id_prefix: id_prefix.to_string(),
            symbol: symbol.trim().to_string(),
        },
        _ => UserCommand::Invalid(REACT_USAGE.to_string()),
    }
}

/// Find the one known message id starting with `prefix`.
///
/// Returns `None` when nothing or more than one id matches.
pub fn resolve_message_id<'a>(prefix: &str, known_ids: &'a [String]) -> Option<&'a str> {
    let mut matches = known_ids.iter().filter(|id| id.starts_with(prefix));
    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(first.as_str())
}

/// Check if the client should exit immediately based on the error type.
pub fn should_exit_immediately(error: &ClientError) -> bool {
    matches!(error, ClientError::Rejected(_))
}

/// Check if the client should attempt to reconnect.
pub fn should_attempt_reconnect(
    error: &ClientError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    if should_exit_immediately(error) {
        return false;
    }
    current_attempt < max_attempts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text() {
        // テスト項目: スラッシュで始まらない入力はテキストメッセージになる
        // given (前提条件):
        let line = "hello, world";

        // when (操作):
        let command = parse_input(line);

        // then (期待する結果):
        assert_eq!(
            command,
            UserCommand::Send {
                kind: MessageKind::Text,
                payload: "hello, world".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_media_commands() {
        // テスト項目: メディアコマンドが対応する種類に変換される
        // given (前提条件):
        let inputs = [
            ("/image https://example.com/a.png", MessageKind::Image),
            ("/video https://example.com/a.mp4", MessageKind::Video),
            ("/audio https://example.com/a.mp3", MessageKind::Audio),
            ("/gif https://example.com/a.gif", MessageKind::AnimatedImage),
        ];

        for (line, expected_kind) in inputs {
            // when (操作):
            let command = parse_input(line);

            // then (期待する結果):
            match command {
                UserCommand::Send { kind, payload } => {
                    assert_eq!(kind, expected_kind);
                    assert!(payload.starts_with("https://example.com/"));
                }
                other => panic!("unexpected command: {:?}", other),
            }
        }
    }

    #[test]
    fn test_parse_media_without_url() {
        // テスト項目: URL のないメディアコマンドは使い方の表示になる
        // given (前提条件):
        let line = "/image";

        // when (操作):
        let command = parse_input(line);

        // then (期待する結果):
        assert_eq!(
            command,
            UserCommand::Invalid("Usage: /image <url>".to_string())
        );
    }

    #[test]
    fn test_parse_react() {
        // テスト項目: /react はメッセージ ID の接頭辞とシンボルに分解される
        // given (前提条件):
        let line = "/react 3f2a 👍";

        // when (操作):
        let command = parse_input(line);

        // then (期待する結果):
        assert_eq!(
            command,
            UserCommand::React {
                id_prefix: "3f2a".to_string(),
                symbol: "👍".to_string(),
            }
        );
        assert_eq!(
            parse_input("/react 3f2a"),
            UserCommand::Invalid(REACT_USAGE.to_string())
        );
    }

    #[test]
    fn test_parse_quit_and_unknown() {
        // テスト項目: /quit は終了、未知のコマンドはローカルのエラー表示になる
        // given (前提条件):
        let quit = "/quit";
        let unknown = "/dance now";

        // when (操作):
        let quit_command = parse_input(quit);
        let unknown_command = parse_input(unknown);

        // then (期待する結果):
        assert_eq!(quit_command, UserCommand::Quit);
        assert_eq!(
            unknown_command,
            UserCommand::Invalid("Unknown command: /dance".to_string())
        );
    }

    #[test]
    fn test_resolve_message_id() {
        // テスト項目: 接頭辞が一意に一致する場合のみメッセージ ID が決まる
        // given (前提条件):
        let known = vec![
            "3f2a0000-0000-4000-8000-000000000001".to_string(),
            "3f2b0000-0000-4000-8000-000000000002".to_string(),
            "9c1d0000-0000-4000-8000-000000000003".to_string(),
        ];

        // when (操作):
        let unique = resolve_message_id("3f2a", &known);
        let ambiguous = resolve_message_id("3f2", &known);
        let missing = resolve_message_id("ffff", &known);

        // then (期待する結果):
        assert_eq!(unique, Some("3f2a0000-0000-4000-8000-000000000001"));
        assert_eq!(ambiguous, None);
        assert_eq!(missing, None);
    }

    #[test]
    fn test_should_exit_immediately_with_rejection() {
        // テスト項目: 入室拒否の場合、即座に終了すべきと判定される
        // given (前提条件):
        let error = ClientError::Rejected("identity-taken".to_string());

        // when (操作):
        let result = should_exit_immediately(&error);

        // then (期待する結果):
        assert!(result);
        assert!(!should_attempt_reconnect(&error, 0, 5));
    }

    #[test]
    fn test_should_attempt_reconnect_within_limit() {
        // テスト項目: 接続断は上限未満なら再接続し、上限に達したら再接続しない
        // given (前提条件):
        let error = ClientError::ConnectionLost;

        // when (操作):
        let within = should_attempt_reconnect(&error, 4, 5);
        let at_limit = should_attempt_reconnect(&error, 5, 5);

        // then (期待する結果):
        assert!(within);
        assert!(!at_limit);
    }
}
