use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::{classify_insert_error, PgStore};
use crate::error::{AppError, AppResult};
use crate::users::UserProfile;

/// A message as returned by creation: participants as bare usernames.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub from_username: String,
    pub to_username: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// A message with both participants resolved to their public profiles.
#[derive(Debug, Clone, Serialize)]
pub struct MessageDetail {
    pub id: i64,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub from_user: UserProfile,
    pub to_user: UserProfile,
}

/// Result of a read transition.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ReadReceipt {
    pub id: i64,
    pub read_at: DateTime<Utc>,
}

/// Summary of a sent message: the recipient resolved to a profile.
#[derive(Debug, Clone, Serialize)]
pub struct SentMessage {
    pub id: i64,
    pub to_user: UserProfile,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

/// Summary of a received message: the sender resolved to a profile.
#[derive(Debug, Clone, Serialize)]
pub struct ReceivedMessage {
    pub id: i64,
    pub from_user: UserProfile,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

/// Owns message records and the read-state transition.
#[allow(async_fn_in_trait)]
pub trait MessageStore {
    /// Insert a new message with sent timestamp = now and no read timestamp.
    /// An unknown sender or recipient surfaces as a reference error from the
    /// foreign-key constraint; nothing is persisted in that case.
    async fn create(&self, from_username: &str, to_username: &str, body: &str)
        -> AppResult<Message>;

    async fn get(&self, id: i64) -> AppResult<MessageDetail>;

    /// Set the read timestamp to now. Deliberately an unconditional update:
    /// authorization has already happened in the guard, and a repeated call
    /// from the recipient simply refreshes the timestamp. The single
    /// statement relies on the store's native atomicity; no application
    /// locking.
    async fn mark_read(&self, id: i64) -> AppResult<ReadReceipt>;

    /// Messages sent by this user. Empty is an empty-result error.
    async fn sent_by(&self, username: &str) -> AppResult<Vec<SentMessage>>;

    /// Messages received by this user. Empty is an empty-result error.
    async fn received_by(&self, username: &str) -> AppResult<Vec<ReceivedMessage>>;
}

#[derive(sqlx::FromRow)]
struct MessageDetailRow {
    id: i64,
    body: String,
    sent_at: DateTime<Utc>,
    read_at: Option<DateTime<Utc>>,
    from_username: String,
    from_first_name: String,
    from_last_name: String,
    from_phone: String,
    to_username: String,
    to_first_name: String,
    to_last_name: String,
    to_phone: String,
}

impl From<MessageDetailRow> for MessageDetail {
    fn from(row: MessageDetailRow) -> Self {
        MessageDetail {
            id: row.id,
            body: row.body,
            sent_at: row.sent_at,
            read_at: row.read_at,
            from_user: UserProfile {
                username: row.from_username,
                first_name: row.from_first_name,
                last_name: row.from_last_name,
                phone: row.from_phone,
            },
            to_user: UserProfile {
                username: row.to_username,
                first_name: row.to_first_name,
                last_name: row.to_last_name,
                phone: row.to_phone,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct CounterpartyRow {
    id: i64,
    body: String,
    sent_at: DateTime<Utc>,
    read_at: Option<DateTime<Utc>>,
    username: String,
    first_name: String,
    last_name: String,
    phone: String,
}

impl CounterpartyRow {
    fn profile(&self) -> UserProfile {
        UserProfile {
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.phone.clone(),
        }
    }
}

impl MessageStore for PgStore {
    async fn create(
        &self,
        from_username: &str,
        to_username: &str,
        body: &str,
    ) -> AppResult<Message> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (from_username, to_username, body, sent_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, from_username, to_username, body, sent_at
            "#,
        )
        .bind(from_username)
        .bind(to_username)
        .bind(body)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            classify_insert_error(
                e,
                "message id already taken",
                &format!("no such user: {} or {}", from_username, to_username),
            )
        })?;

        tracing::debug!(id = message.id, "message created");
        Ok(message)
    }

    async fn get(&self, id: i64) -> AppResult<MessageDetail> {
        let row = sqlx::query_as::<_, MessageDetailRow>(
            r#"
            SELECT m.id, m.body, m.sent_at, m.read_at,
                   f.username   AS from_username,
                   f.first_name AS from_first_name,
                   f.last_name  AS from_last_name,
                   f.phone      AS from_phone,
                   t.username   AS to_username,
                   t.first_name AS to_first_name,
                   t.last_name  AS to_last_name,
                   t.phone      AS to_phone
            FROM messages m
            JOIN users f ON m.from_username = f.username
            JOIN users t ON m.to_username = t.username
            WHERE m.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(MessageDetail::from)
            .ok_or_else(|| AppError::not_found(format!("no such message: {}", id)))
    }

    async fn mark_read(&self, id: i64) -> AppResult<ReadReceipt> {
        let receipt = sqlx::query_as::<_, ReadReceipt>(
            r#"
            UPDATE messages
            SET read_at = NOW()
            WHERE id = $1
            RETURNING id, read_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        receipt.ok_or_else(|| AppError::not_found(format!("no such message: {}", id)))
    }

    async fn sent_by(&self, username: &str) -> AppResult<Vec<SentMessage>> {
        let rows = sqlx::query_as::<_, CounterpartyRow>(
            r#"
            SELECT m.id, m.body, m.sent_at, m.read_at,
                   t.username, t.first_name, t.last_name, t.phone
            FROM messages m
            JOIN users t ON m.to_username = t.username
            WHERE m.from_username = $1
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Err(AppError::empty(format!("no messages from user: {}", username)));
        }

        Ok(rows
            .into_iter()
            .map(|r| SentMessage {
                id: r.id,
                to_user: r.profile(),
                body: r.body,
                sent_at: r.sent_at,
                read_at: r.read_at,
            })
            .collect())
    }

    async fn received_by(&self, username: &str) -> AppResult<Vec<ReceivedMessage>> {
        let rows = sqlx::query_as::<_, CounterpartyRow>(
            r#"
            SELECT m.id, m.body, m.sent_at, m.read_at,
                   f.username, f.first_name, f.last_name, f.phone
            FROM messages m
            JOIN users f ON m.from_username = f.username
            WHERE m.to_username = $1
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Err(AppError::empty(format!("no messages to user: {}", username)));
        }

        Ok(rows
            .into_iter()
            .map(|r| ReceivedMessage {
                id: r.id,
                from_user: r.profile(),
                body: r.body,
                sent_at: r.sent_at,
                read_at: r.read_at,
            })
            .collect())
    }
}
