//! PostgreSQL 存储实现
//!
//! 每个接口方法对应一条语句，依靠单语句的原子性满足并发约束：
//! 注册用 `ON CONFLICT DO NOTHING`，清理用带 `RETURNING` 的单条 `DELETE`。

use async_trait::async_trait;
use domain::{
    Message, MessageKind, MessageLimit, MessageRepository, Participant, ParticipantName,
    ParticipantRepository, RepositoryError, RepositoryResult, Timestamp, EVERYONE,
};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use time::OffsetDateTime;

fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    tracing::error!(error = %err, "database operation failed");
    RepositoryError::storage(err.to_string())
}

fn invalid_data(message: impl Into<String>) -> RepositoryError {
    RepositoryError::storage(message)
}

#[derive(Debug, FromRow)]
struct ParticipantRecord {
    name: String,
    last_seen: OffsetDateTime,
}

impl TryFrom<ParticipantRecord> for Participant {
    type Error = RepositoryError;

    fn try_from(value: ParticipantRecord) -> Result<Self, Self::Error> {
        let name = ParticipantName::parse(value.name).map_err(|err| invalid_data(err.to_string()))?;
        Ok(Participant {
            name,
            last_seen: value.last_seen,
        })
    }
}

#[derive(Debug, FromRow)]
struct MessageRecord {
    sender: String,
    recipient: String,
    body: String,
    kind: String,
    sent_at: OffsetDateTime,
}

impl TryFrom<MessageRecord> for Message {
    type Error = RepositoryError;

    fn try_from(value: MessageRecord) -> Result<Self, Self::Error> {
        let kind: MessageKind = value
            .kind
            .parse()
            .map_err(|err: domain::DomainError| invalid_data(err.to_string()))?;
        Ok(Message {
            from: value.sender,
            to: value.recipient,
            text: value.body,
            kind,
            time: value.sent_at,
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
    async fn insert(&self, participant: Participant) -> RepositoryResult<Participant> {
        let record = sqlx::query_as::<_, ParticipantRecord>(
            r#"
            INSERT INTO participants (name, last_seen)
            VALUES ($1, $2)
            ON CONFLICT (name) DO NOTHING
            RETURNING name, last_seen
            "#,
        )
        .bind(participant.name.as_str())
        .bind(participant.last_seen)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record
            .ok_or(RepositoryError::Conflict)
            .and_then(Participant::try_from)
    }

    async fn touch(&self, name: &str, seen_at: Timestamp) -> RepositoryResult<Participant> {
        let record = sqlx::query_as::<_, ParticipantRecord>(
            r#"
            UPDATE participants
            SET last_seen = GREATEST(last_seen, $2)
            WHERE name = $1
            RETURNING name, last_seen
            "#,
        )
        .bind(name)
        .bind(seen_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record
            .ok_or(RepositoryError::NotFound)
            .and_then(Participant::try_from)
    }

    async fn remove(&self, name: &str) -> RepositoryResult<bool> {
        let result = sqlx::query(r#"DELETE FROM participants WHERE name = $1"#)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn find(&self, name: &str) -> RepositoryResult<Option<Participant>> {
        let record = sqlx::query_as::<_, ParticipantRecord>(
            r#"SELECT name, last_seen FROM participants WHERE name = $1"#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.map(Participant::try_from).transpose()
    }

    async fn list(&self) -> RepositoryResult<Vec<Participant>> {
        let records = sqlx::query_as::<_, ParticipantRecord>(
            r#"SELECT name, last_seen FROM participants ORDER BY name"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        records.into_iter().map(Participant::try_from).collect()
    }

    async fn remove_inactive(&self, threshold: Timestamp) -> RepositoryResult<Vec<Participant>> {
        let records = sqlx::query_as::<_, ParticipantRecord>(
            r#"
            DELETE FROM participants
            WHERE last_seen < $1
            RETURNING name, last_seen
            "#,
        )
        .bind(threshold)
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
    async fn append(&self, message: Message) -> RepositoryResult<Message> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            INSERT INTO messages (sender, recipient, body, kind, sent_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING sender, recipient, body, kind, sent_at
            "#,
        )
        .bind(&message.from)
        .bind(&message.to)
        .bind(&message.text)
        .bind(message.kind.as_str())
        .bind(message.time)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Message::try_from(record)
    }

    async fn visible_to(
        &self,
        requester: &str,
        limit: Option<MessageLimit>,
    ) -> RepositoryResult<Vec<Message>> {
        // 与 domain::is_visible_to 保持一致；LIMIT NULL 表示不限制
        let limit = limit.map(|l| i64::try_from(l.get()).unwrap_or(i64::MAX));
        let records = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT sender, recipient, body, kind, sent_at FROM (
                SELECT seq, sender, recipient, body, kind, sent_at
                FROM messages
                WHERE kind = 'message' OR recipient = $1 OR sender = $1 OR recipient = $2
                ORDER BY seq DESC
                LIMIT $3
            ) recent
            ORDER BY seq ASC
            "#,
        )
        .bind(requester)
        .bind(EVERYONE)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        records.into_iter().map(Message::try_from).collect()
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
