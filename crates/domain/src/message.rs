use serde::{Deserialize, Serialize};

use crate::value_objects::{MessageBody, MessageId, ParticipantName, Timestamp, WallClock};

/// 消息分类。
///
/// 用户只能提交 `Message` 和 `PrivateMessage`；`Status` 由系统在
/// 加入/离开时生成，始终广播。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Message,
    PrivateMessage,
    Status,
}

impl MessageKind {
    /// 解析用户可提交的消息类型。
    pub fn parse_postable(value: &str) -> Option<Self> {
        match value {
            "message" => Some(Self::Message),
            "private_message" => Some(Self::PrivateMessage),
            _ => None,
        }
    }

    /// 解析存储中的任意消息类型。
    pub fn parse_any(value: &str) -> Option<Self> {
        match value {
            "status" => Some(Self::Status),
            other => Self::parse_postable(other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::PrivateMessage => "private_message",
            Self::Status => "status",
        }
    }
}

/// 已持久化的聊天消息。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub from: ParticipantName,
    pub to: ParticipantName,
    pub text: MessageBody,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub time: WallClock,
}

impl ChatMessage {
    /// 针对查看者的可见性判断。
    ///
    /// 公开消息全局可见；其余只有广播目标、收件人或发送者可见。
    pub fn visible_to(&self, viewer: &ParticipantName) -> bool {
        self.kind == MessageKind::Message
            || self.to.is_broadcast()
            || &self.to == viewer
            || &self.from == viewer
    }

    /// 作者编辑：就地替换收件人、正文和类型，不保留历史。
    /// `from` 和 `time` 保持不变。
    pub fn apply_edit(&mut self, to: ParticipantName, text: MessageBody, kind: MessageKind) {
        self.to = to;
        self.text = text;
        self.kind = kind;
    }
}

/// 尚未持久化的消息；`id` 由存储在插入时分配。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub from: ParticipantName,
    pub to: ParticipantName,
    pub text: MessageBody,
    pub kind: MessageKind,
    pub time: WallClock,
}

impl MessageDraft {
    /// 系统状态通告（加入/离开），始终广播。
    pub fn status_notice(from: ParticipantName, text: impl Into<String>, now: Timestamp) -> Self {
        Self {
            from,
            to: ParticipantName::broadcast(),
            text: MessageBody::new(text),
            kind: MessageKind::Status,
            time: WallClock::from_timestamp(now),
        }
    }
}
