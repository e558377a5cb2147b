use async_graphql::{Context, Error, Object, Result};
use message_feature::{MessageBus, MessageService, SendMessageInput};
use sqlx::PgPool;

use crate::auth::Session;

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Persist a message and fan it out to the conversation's subscribers.
    ///
    /// Returns a success flag, not the created message.
    #[allow(clippy::too_many_arguments)]
    async fn send_message(
        &self,
        ctx: &Context<'_>,
        id: String,
        conversation_id: String,
        sender_id: String,
        body: String,
        media: Option<String>,
        media_type: Option<String>,
    ) -> Result<bool> {
        ctx.data_opt::<Session>()
            .ok_or_else(|| Error::new("Not authorized"))?;

        let pool = ctx.data::<PgPool>()?;
        let bus = ctx.data::<MessageBus>()?;

        let sent = MessageService::send(
            pool,
            bus,
            SendMessageInput {
                id,
                conversation_id,
                sender_id,
                body,
                media,
                media_type,
            },
        )
        .await?;

        Ok(sent)
    }
}
