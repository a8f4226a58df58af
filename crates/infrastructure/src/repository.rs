use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use uuid::Uuid;

use application::{MessageRepository, ParticipantRepository};
use domain::{
    ChatMessage, MessageBody, MessageDraft, MessageId, MessageKind, Participant, ParticipantName,
    RepositoryError, Timestamp, WallClock, BROADCAST_TARGET,
};

fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    RepositoryError::storage(err.to_string())
}

fn invalid_data(message: impl Into<String>) -> RepositoryError {
    RepositoryError::storage(message)
}

#[derive(Debug, FromRow)]
struct ParticipantRecord {
    name: String,
    last_status: Timestamp,
}

impl TryFrom<ParticipantRecord> for Participant {
    type Error = RepositoryError;

    fn try_from(value: ParticipantRecord) -> Result<Self, Self::Error> {
        let name = ParticipantName::parse(value.name).map_err(|err| invalid_data(err.to_string()))?;
        Ok(Participant {
            name,
            last_status: value.last_status,
        })
    }
}

#[derive(Debug, FromRow)]
struct MessageRecord {
    id: Uuid,
    from_name: String,
    to_name: String,
    body: String,
    kind: String,
    sent_time: String,
}

impl TryFrom<MessageRecord> for ChatMessage {
    type Error = RepositoryError;

    fn try_from(value: MessageRecord) -> Result<Self, Self::Error> {
        let from =
            ParticipantName::parse(value.from_name).map_err(|err| invalid_data(err.to_string()))?;
        let to =
            ParticipantName::parse(value.to_name).map_err(|err| invalid_data(err.to_string()))?;
        let kind = MessageKind::parse_any(&value.kind)
            .ok_or_else(|| invalid_data(format!("unknown message kind: {}", value.kind)))?;

        Ok(ChatMessage {
            id: MessageId::from(value.id),
            from,
            to,
            text: MessageBody::new(value.body),
            kind,
            time: WallClock::from(value.sent_time),
        })
    }
}

#[derive(Clone)]
pub struct PgParticipantRepository {
    pool: PgPool,
}

impl PgParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParticipantRepository for PgParticipantRepository {
    async fn insert(&self, participant: Participant) -> Result<Participant, RepositoryError> {
        // 唯一性由主键保证；冲突时 RETURNING 无行
        let record = sqlx::query_as::<_, ParticipantRecord>(
            r#"
            INSERT INTO participants (name, last_status)
            VALUES ($1, $2)
            ON CONFLICT (name) DO NOTHING
            RETURNING name, last_status
            "#,
        )
        .bind(participant.name.as_str())
        .bind(participant.last_status)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        match record {
            Some(record) => Participant::try_from(record),
            None => Err(RepositoryError::Conflict),
        }
    }

    async fn find_by_name(
        &self,
        name: &ParticipantName,
    ) -> Result<Option<Participant>, RepositoryError> {
        let record = sqlx::query_as::<_, ParticipantRecord>(
            r#"SELECT name, last_status FROM participants WHERE name = $1"#,
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.map(Participant::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Participant>, RepositoryError> {
        let records = sqlx::query_as::<_, ParticipantRecord>(
            r#"SELECT name, last_status FROM participants"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        records.into_iter().map(Participant::try_from).collect()
    }

    async fn touch(&self, name: &ParticipantName, at: Timestamp) -> Result<bool, RepositoryError> {
        let result = sqlx::query(r#"UPDATE participants SET last_status = $2 WHERE name = $1"#)
            .bind(name.as_str())
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_inactive_since(
        &self,
        cutoff: Timestamp,
    ) -> Result<Vec<Participant>, RepositoryError> {
        // 删除并返回命中行是同一条语句，并发清扫互不重复
        let records = sqlx::query_as::<_, ParticipantRecord>(
            r#"
            DELETE FROM participants
            WHERE last_status < $1
            RETURNING name, last_status
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        records.into_iter().map(Participant::try_from).collect()
    }
}

#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn insert(&self, draft: MessageDraft) -> Result<ChatMessage, RepositoryError> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            INSERT INTO messages (id, from_name, to_name, body, kind, sent_time)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, from_name, to_name, body, kind, sent_time
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(draft.from.as_str())
        .bind(draft.to.as_str())
        .bind(draft.text.as_str())
        .bind(draft.kind.as_str())
        .bind(draft.time.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        ChatMessage::try_from(record)
    }

    async fn find_by_id(&self, id: MessageId) -> Result<Option<ChatMessage>, RepositoryError> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"SELECT id, from_name, to_name, body, kind, sent_time FROM messages WHERE id = $1"#,
        )
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.map(ChatMessage::try_from).transpose()
    }

    async fn list_visible_to(
        &self,
        viewer: &ParticipantName,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let records = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, from_name, to_name, body, kind, sent_time
            FROM messages
            WHERE kind = 'message' OR to_name = $2 OR to_name = $1 OR from_name = $1
            ORDER BY seq
            "#,
        )
        .bind(viewer.as_str())
        .bind(BROADCAST_TARGET)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        records.into_iter().map(ChatMessage::try_from).collect()
    }

    async fn update(&self, message: &ChatMessage) -> Result<bool, RepositoryError> {
        // from/sent_time 不参与编辑
        let result = sqlx::query(
            r#"UPDATE messages SET to_name = $2, body = $3, kind = $4 WHERE id = $1"#,
        )
        .bind(Uuid::from(message.id))
        .bind(message.to.as_str())
        .bind(message.text.as_str())
        .bind(message.kind.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: MessageId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(r#"DELETE FROM messages WHERE id = $1"#)
            .bind(Uuid::from(id))
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        Ok(result.rows_affected() > 0)
    }
}

pub async fn create_pg_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
