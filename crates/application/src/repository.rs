//! 存储抽象。
//!
//! 两个集合各对应一个仓库 trait；核心不变量依赖这里的两个原子
//! 单文档操作：加入时的唯一插入、清扫时的删除并返回命中集。

use async_trait::async_trait;
use domain::{
    ChatMessage, MessageDraft, MessageId, Participant, ParticipantName, RepositoryError, Timestamp,
};

#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    /// 原子唯一插入；名称已存在时返回 [`RepositoryError::Conflict`]。
    async fn insert(&self, participant: Participant) -> Result<Participant, RepositoryError>;

    async fn find_by_name(
        &self,
        name: &ParticipantName,
    ) -> Result<Option<Participant>, RepositoryError>;

    /// 所有当前参与者，顺序不保证。
    async fn list(&self) -> Result<Vec<Participant>, RepositoryError>;

    /// 刷新存活时间戳；返回是否命中记录。
    async fn touch(&self, name: &ParticipantName, at: Timestamp) -> Result<bool, RepositoryError>;

    /// 原子删除所有 `last_status` 早于 `cutoff` 的记录并返回它们。
    /// 删除与读取是同一步操作，并发清扫不会重复上报同一参与者。
    async fn remove_inactive_since(
        &self,
        cutoff: Timestamp,
    ) -> Result<Vec<Participant>, RepositoryError>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// 插入消息；`id` 由存储在此处分配。
    async fn insert(&self, draft: MessageDraft) -> Result<ChatMessage, RepositoryError>;

    async fn find_by_id(&self, id: MessageId) -> Result<Option<ChatMessage>, RepositoryError>;

    /// 按插入顺序（最旧在前）返回对 `viewer` 可见的消息。
    async fn list_visible_to(
        &self,
        viewer: &ParticipantName,
    ) -> Result<Vec<ChatMessage>, RepositoryError>;

    /// 按 `id` 整体替换；返回是否命中记录。
    async fn update(&self, message: &ChatMessage) -> Result<bool, RepositoryError>;

    /// 按 `id` 删除；返回是否命中记录。
    async fn delete(&self, id: MessageId) -> Result<bool, RepositoryError>;
}

/// 内存实现（用于测试和无数据库运行）。
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::RwLock;
    use uuid::Uuid;

    #[derive(Default)]
    pub struct MemoryParticipantRepository {
        data: RwLock<HashMap<String, Participant>>,
    }

    impl MemoryParticipantRepository {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl ParticipantRepository for MemoryParticipantRepository {
        async fn insert(&self, participant: Participant) -> Result<Participant, RepositoryError> {
            let mut guard = self.data.write().await;
            let key = participant.name.as_str().to_owned();
            if guard.contains_key(&key) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(key, participant.clone());
            Ok(participant)
        }

        async fn find_by_name(
            &self,
            name: &ParticipantName,
        ) -> Result<Option<Participant>, RepositoryError> {
            let guard = self.data.read().await;
            Ok(guard.get(name.as_str()).cloned())
        }

        async fn list(&self) -> Result<Vec<Participant>, RepositoryError> {
            let guard = self.data.read().await;
            Ok(guard.values().cloned().collect())
        }

        async fn touch(
            &self,
            name: &ParticipantName,
            at: Timestamp,
        ) -> Result<bool, RepositoryError> {
            let mut guard = self.data.write().await;
            match guard.get_mut(name.as_str()) {
                Some(participant) => {
                    participant.touch(at);
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn remove_inactive_since(
            &self,
            cutoff: Timestamp,
        ) -> Result<Vec<Participant>, RepositoryError> {
            // 单个写锁内完成筛选和删除，等价于删除并返回命中集
            let mut guard = self.data.write().await;
            let expired: Vec<String> = guard
                .values()
                .filter(|p| p.is_expired(cutoff))
                .map(|p| p.name.as_str().to_owned())
                .collect();
            let mut removed = Vec::with_capacity(expired.len());
            for key in expired {
                if let Some(participant) = guard.remove(&key) {
                    removed.push(participant);
                }
            }
            Ok(removed)
        }
    }

    #[derive(Default)]
    pub struct MemoryMessageRepository {
        data: RwLock<Vec<ChatMessage>>,
    }

    impl MemoryMessageRepository {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl MessageRepository for MemoryMessageRepository {
        async fn insert(&self, draft: MessageDraft) -> Result<ChatMessage, RepositoryError> {
            let message = ChatMessage {
                id: MessageId::from(Uuid::new_v4()),
                from: draft.from,
                to: draft.to,
                text: draft.text,
                kind: draft.kind,
                time: draft.time,
            };
            let mut guard = self.data.write().await;
            guard.push(message.clone());
            Ok(message)
        }

        async fn find_by_id(&self, id: MessageId) -> Result<Option<ChatMessage>, RepositoryError> {
            let guard = self.data.read().await;
            Ok(guard.iter().find(|m| m.id == id).cloned())
        }

        async fn list_visible_to(
            &self,
            viewer: &ParticipantName,
        ) -> Result<Vec<ChatMessage>, RepositoryError> {
            let guard = self.data.read().await;
            Ok(guard
                .iter()
                .filter(|m| m.visible_to(viewer))
                .cloned()
                .collect())
        }

        async fn update(&self, message: &ChatMessage) -> Result<bool, RepositoryError> {
            let mut guard = self.data.write().await;
            match guard.iter_mut().find(|m| m.id == message.id) {
                Some(slot) => {
                    *slot = message.clone();
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn delete(&self, id: MessageId) -> Result<bool, RepositoryError> {
            let mut guard = self.data.write().await;
            match guard.iter().position(|m| m.id == id) {
                Some(index) => {
                    guard.remove(index);
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }
}
