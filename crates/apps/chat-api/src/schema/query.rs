use async_graphql::{Context, Error, Object, Result};
use message_feature::MessageService;
use sqlx::PgPool;

use crate::auth::Session;

use super::types::MessageType;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Conversation history, oldest first
    async fn messages(
        &self,
        ctx: &Context<'_>,
        conversation_id: String,
    ) -> Result<Vec<MessageType>> {
        ctx.data_opt::<Session>()
            .ok_or_else(|| Error::new("Not authorized"))?;

        let pool = ctx.data::<PgPool>()?;
        let messages = MessageService::list_for_conversation(pool, &conversation_id).await?;
        Ok(messages.into_iter().map(Into::into).collect())
    }
}
