//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{AdmissionRejection, RepositoryError, RoomError, ValueObjectError};

/// 入室処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    /// Admission Gate による拒否（接続へ通知済み）
    #[error("join rejected: {0}")]
    Rejected(AdmissionRejection),

    /// 接続が入室を受け付けられる状態にない
    #[error("connection cannot join: {0}")]
    InvalidState(#[from] RoomError),
}

/// メッセージ送信処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("sender has not joined: {0}")]
    NotJoined(#[from] RepositoryError),

    #[error("invalid content: {0}")]
    InvalidContent(#[from] ValueObjectError),
}

/// リアクション処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactMessageError {
    #[error("reactor has not joined: {0}")]
    NotJoined(#[from] RepositoryError),

    #[error("invalid reaction: {0}")]
    InvalidSymbol(#[from] ValueObjectError),

    /// 対象メッセージが履歴にない（追い出し済みなど）か、シンボルの種類数が上限に達している
    #[error("reaction to message '{0}' was not applied")]
    NotApplied(String),
}

/// ブリッジからの受信処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// `/send <text>` 形式ではない（使い方を返信済み）
    #[error("relay text is not a send command")]
    NotASendCommand,

    #[error("invalid relay content: {0}")]
    InvalidContent(#[from] ValueObjectError),
}
