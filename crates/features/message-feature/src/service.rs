use domain::{DomainError, Message, MessageRepository};
use sqlx::PgPool;

use crate::bus::MessageBus;
use crate::error::MessageFeatureError;

/// Input for sending a message
pub struct SendMessageInput {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub body: String,
    pub media: Option<String>,
    pub media_type: Option<String>,
}

/// Service for message-related operations
pub struct MessageService;

impl MessageService {
    /// Persist a message, then fan it out to the conversation's subscribers.
    ///
    /// Returns `true` on success; the created entity is never returned to
    /// the caller (the wire contract is a boolean flag).
    pub async fn send(
        pool: &PgPool,
        bus: &MessageBus,
        input: SendMessageInput,
    ) -> Result<bool, MessageFeatureError> {
        let message = MessageRepository::create(
            pool,
            &input.id,
            &input.conversation_id,
            &input.sender_id,
            &input.body,
            input.media.as_deref(),
            input.media_type.as_deref(),
        )
        .await
        .map_err(|e| match e {
            DomainError::Database(sqlx::Error::Database(db))
                if db.is_unique_violation() =>
            {
                MessageFeatureError::DuplicateMessage(input.id.clone())
            }
            other => MessageFeatureError::Domain(other),
        })?;

        bus.publish(message);
        Ok(true)
    }

    /// Conversation history, oldest first
    pub async fn list_for_conversation(
        pool: &PgPool,
        conversation_id: &str,
    ) -> Result<Vec<Message>, MessageFeatureError> {
        Ok(MessageRepository::list_by_conversation(pool, conversation_id).await?)
    }
}
