//! 消息生命周期：发送、按查看者过滤的列表、编辑、删除。

use std::sync::Arc;

use serde::Deserialize;
use validator::{Validate, ValidationError};

use domain::{
    sanitize, ChatMessage, DomainError, MessageBody, MessageDraft, MessageId, MessageKind,
    ParticipantName, WallClock,
};

use crate::{
    clock::Clock,
    error::ApplicationError,
    repository::{MessageRepository, ParticipantRepository},
    validation,
};

/// 回收器广播的离场通告正文。
pub const DEPARTURE_NOTICE: &str = "sai da sala...";

/// 发送和编辑共用的消息载荷。
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PostMessageRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "to must not be empty"))]
    pub to: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: String,
    #[serde(default, rename = "type")]
    #[validate(custom(function = postable_kind))]
    pub kind: String,
}

const MESSAGE_FIELDS: &[&str] = &["to", "text", "kind"];

fn postable_kind(value: &str) -> Result<(), ValidationError> {
    if MessageKind::parse_postable(value).is_some() {
        return Ok(());
    }
    let mut error = ValidationError::new("kind");
    error.message = Some("type must be one of message, private_message".into());
    Err(error)
}

pub struct MessageServiceDependencies {
    pub message_repository: Arc<dyn MessageRepository>,
    pub participant_repository: Arc<dyn ParticipantRepository>,
    pub clock: Arc<dyn Clock>,
}

pub struct MessageService {
    deps: MessageServiceDependencies,
}

impl MessageService {
    pub fn new(deps: MessageServiceDependencies) -> Self {
        Self { deps }
    }

    /// 发送：校验 → 发送者必须在场 → 净化 → 入库。
    ///
    /// 发送者的在场检查只在发送时刻执行，之后过期不回溯作废消息。
    pub async fn post(
        &self,
        raw_from: &str,
        request: PostMessageRequest,
    ) -> Result<ChatMessage, ApplicationError> {
        validation::check(&request, MESSAGE_FIELDS)?;
        let from = self.active_sender(raw_from).await?;

        let to = ParticipantName::parse(sanitize(&request.to))?;
        let kind = MessageKind::parse_postable(&request.kind).ok_or_else(|| {
            DomainError::invalid_field("type must be one of message, private_message")
        })?;

        let now = self.deps.clock.now();
        let draft = MessageDraft {
            from,
            to,
            text: MessageBody::new(sanitize(&request.text)),
            kind,
            time: WallClock::from_timestamp(now),
        };
        Ok(self.deps.message_repository.insert(draft).await?)
    }

    /// 查看者视角的消息列表，插入顺序（最旧在前）。
    ///
    /// `limit` 给定时必须是正整数，只保留最近的 `limit` 条。
    pub async fn list_for(
        &self,
        raw_viewer: &str,
        limit: Option<String>,
    ) -> Result<Vec<ChatMessage>, ApplicationError> {
        let limit = match limit {
            None => None,
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => Some(n),
                _ => return Err(DomainError::invalid_limit(raw).into()),
            },
        };

        // 匿名查看者等价于广播目标：只看到公开和广播消息
        let viewer = ParticipantName::parse(sanitize(raw_viewer))
            .unwrap_or_else(|_| ParticipantName::broadcast());

        let mut messages = self.deps.message_repository.list_visible_to(&viewer).await?;
        if let Some(n) = limit {
            if messages.len() > n {
                messages.drain(..messages.len() - n);
            }
        }
        Ok(messages)
    }

    /// 作者编辑：就地替换收件人、正文、类型；`from`/`time` 不变。
    pub async fn edit(
        &self,
        id: MessageId,
        raw_caller: &str,
        request: PostMessageRequest,
    ) -> Result<ChatMessage, ApplicationError> {
        validation::check(&request, MESSAGE_FIELDS)?;
        let caller = self.active_sender(raw_caller).await?;

        let mut message = self
            .deps
            .message_repository
            .find_by_id(id)
            .await?
            .ok_or(DomainError::MessageNotFound)?;
        if message.from != caller {
            return Err(DomainError::Forbidden.into());
        }

        let to = ParticipantName::parse(sanitize(&request.to))?;
        let kind = MessageKind::parse_postable(&request.kind).ok_or_else(|| {
            DomainError::invalid_field("type must be one of message, private_message")
        })?;
        message.apply_edit(to, MessageBody::new(sanitize(&request.text)), kind);

        let matched = self.deps.message_repository.update(&message).await?;
        if !matched {
            return Err(DomainError::MessageNotFound.into());
        }
        Ok(message)
    }

    /// 作者删除。
    pub async fn delete(&self, id: MessageId, raw_caller: &str) -> Result<(), ApplicationError> {
        let message = self
            .deps
            .message_repository
            .find_by_id(id)
            .await?
            .ok_or(DomainError::MessageNotFound)?;

        let cleaned = sanitize(raw_caller);
        match ParticipantName::parse(&cleaned) {
            Ok(caller) if caller == message.from => {}
            _ => return Err(DomainError::Forbidden.into()),
        }

        let matched = self.deps.message_repository.delete(id).await?;
        if !matched {
            return Err(DomainError::MessageNotFound.into());
        }
        Ok(())
    }

    /// 回收器专用：参与者已被删除，跳过在场检查直接广播离场通告。
    pub async fn post_departure_notice(
        &self,
        name: &ParticipantName,
    ) -> Result<ChatMessage, ApplicationError> {
        let draft =
            MessageDraft::status_notice(name.clone(), DEPARTURE_NOTICE, self.deps.clock.now());
        Ok(self.deps.message_repository.insert(draft).await?)
    }

    /// 净化调用者身份并确认其当前在场。
    async fn active_sender(&self, raw: &str) -> Result<ParticipantName, ApplicationError> {
        let cleaned = sanitize(raw);
        let name = ParticipantName::parse(&cleaned)
            .map_err(|_| DomainError::unknown_sender(cleaned.clone()))?;
        let active = self
            .deps
            .participant_repository
            .find_by_name(&name)
            .await?;
        if active.is_none() {
            return Err(DomainError::unknown_sender(name.as_str()).into());
        }
        Ok(name)
    }
}
