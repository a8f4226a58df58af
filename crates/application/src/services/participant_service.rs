//! 参与者在场生命周期：加入、列表、心跳、过期清扫。

use std::sync::Arc;

use chrono::Duration;
use serde::Deserialize;
use validator::Validate;

use domain::{
    sanitize, ChatMessage, DomainError, MessageDraft, Participant, ParticipantName,
    RepositoryError,
};

use crate::{
    clock::Clock,
    error::ApplicationError,
    repository::{MessageRepository, ParticipantRepository},
    validation,
};

/// 加入时广播的系统通告正文。
pub const ENTER_NOTICE: &str = "entra na sala...";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct JoinRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
}

/// 加入结果：新建的参与者和随之广播的状态消息。
#[derive(Debug, Clone, serde::Serialize)]
pub struct JoinedParticipant {
    pub participant: Participant,
    pub message: ChatMessage,
}

pub struct ParticipantServiceDependencies {
    pub participant_repository: Arc<dyn ParticipantRepository>,
    pub message_repository: Arc<dyn MessageRepository>,
    pub clock: Arc<dyn Clock>,
}

pub struct ParticipantService {
    deps: ParticipantServiceDependencies,
}

impl ParticipantService {
    pub fn new(deps: ParticipantServiceDependencies) -> Self {
        Self { deps }
    }

    /// 加入：净化 → 校验 → 唯一插入 → 广播进场通告。
    ///
    /// 唯一性由存储的原子插入保证；两个并发的同名加入只有一个成功。
    pub async fn join(&self, request: JoinRequest) -> Result<JoinedParticipant, ApplicationError> {
        let request = JoinRequest {
            name: sanitize(&request.name),
        };
        validation::check(&request, &["name"])?;
        let name = ParticipantName::parse(request.name)?;

        let now = self.deps.clock.now();
        let participant = match self
            .deps
            .participant_repository
            .insert(Participant::join(name.clone(), now))
            .await
        {
            Ok(stored) => stored,
            Err(RepositoryError::Conflict) => {
                return Err(DomainError::duplicate_name(name.as_str()).into())
            }
            Err(err) => return Err(err.into()),
        };

        let draft = MessageDraft::status_notice(name, ENTER_NOTICE, now);
        let message = self.deps.message_repository.insert(draft).await?;

        Ok(JoinedParticipant {
            participant,
            message,
        })
    }

    pub async fn list(&self) -> Result<Vec<Participant>, ApplicationError> {
        Ok(self.deps.participant_repository.list().await?)
    }

    /// 心跳：刷新 `last_status`，无响应体。
    pub async fn heartbeat(&self, raw_name: &str) -> Result<(), ApplicationError> {
        let cleaned = sanitize(raw_name);
        let name = ParticipantName::parse(&cleaned)
            .map_err(|_| DomainError::participant_not_found(cleaned.clone()))?;

        let now = self.deps.clock.now();
        let matched = self.deps.participant_repository.touch(&name, now).await?;
        if !matched {
            return Err(DomainError::participant_not_found(name.as_str()).into());
        }
        Ok(())
    }

    /// 清扫：删除所有超过 `threshold` 未活动的参与者并返回它们。
    pub async fn sweep_expired(
        &self,
        threshold: Duration,
    ) -> Result<Vec<Participant>, ApplicationError> {
        let cutoff = self.deps.clock.now() - threshold;
        Ok(self
            .deps
            .participant_repository
            .remove_inactive_since(cutoff)
            .await?)
    }
}
