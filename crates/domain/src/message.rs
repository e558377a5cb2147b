use sea_query::{Expr, Iden, PostgresQueryBuilder, Query};
use sea_query_binder::SqlxBinder;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::DomainError;

/// Schema definition for the messages table
#[derive(Iden)]
pub enum Messages {
    Table,
    Id,
    ConversationId,
    SenderId,
    Body,
    Media,
    MediaType,
    CreatedAt,
}

/// Raw message row from database
#[derive(Debug, Clone, FromRow)]
struct MessageRow {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub body: String,
    pub media: Option<String>,
    pub media_type: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Message entity
///
/// Messages are immutable once written; the identifier is supplied by the
/// client together with the rest of the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub body: String,
    pub media: Option<String>,
    pub media_type: Option<String>,
    pub created_at: OffsetDateTime,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            conversation_id: row.conversation_id,
            sender_id: row.sender_id,
            body: row.body,
            media: row.media,
            media_type: row.media_type,
            created_at: row.created_at,
        }
    }
}

/// Repository for Message operations
pub struct MessageRepository;

impl MessageRepository {
    /// Persist a new message
    pub async fn create(
        pool: &PgPool,
        id: &str,
        conversation_id: &str,
        sender_id: &str,
        body: &str,
        media: Option<&str>,
        media_type: Option<&str>,
    ) -> Result<Message, DomainError> {
        let now = OffsetDateTime::now_utc();

        let (sql, values) = Query::insert()
            .into_table(Messages::Table)
            .columns([
                Messages::Id,
                Messages::ConversationId,
                Messages::SenderId,
                Messages::Body,
                Messages::Media,
                Messages::MediaType,
                Messages::CreatedAt,
            ])
            .values_panic([
                id.into(),
                conversation_id.into(),
                sender_id.into(),
                body.into(),
                media.map(|s| s.to_string()).into(),
                media_type.map(|s| s.to_string()).into(),
                now.into(),
            ])
            .returning_all()
            .build_sqlx(PostgresQueryBuilder);

        let row = sqlx::query_as_with::<_, MessageRow, _>(&sql, values)
            .fetch_one(pool)
            .await?;

        Ok(row.into())
    }

    /// Find a message by ID
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Message>, DomainError> {
        let (sql, values) = Query::select()
            .columns([
                Messages::Id,
                Messages::ConversationId,
                Messages::SenderId,
                Messages::Body,
                Messages::Media,
                Messages::MediaType,
                Messages::CreatedAt,
            ])
            .from(Messages::Table)
            .and_where(Expr::col(Messages::Id).eq(id))
            .build_sqlx(PostgresQueryBuilder);

        let row = sqlx::query_as_with::<_, MessageRow, _>(&sql, values)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// List a conversation's messages, oldest first
    pub async fn list_by_conversation(
        pool: &PgPool,
        conversation_id: &str,
    ) -> Result<Vec<Message>, DomainError> {
        let (sql, values) = Query::select()
            .columns([
                Messages::Id,
                Messages::ConversationId,
                Messages::SenderId,
                Messages::Body,
                Messages::Media,
                Messages::MediaType,
                Messages::CreatedAt,
            ])
            .from(Messages::Table)
            .and_where(Expr::col(Messages::ConversationId).eq(conversation_id))
            .order_by(Messages::CreatedAt, sea_query::Order::Asc)
            .build_sqlx(PostgresQueryBuilder);

        let rows = sqlx::query_as_with::<_, MessageRow, _>(&sql, values)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
