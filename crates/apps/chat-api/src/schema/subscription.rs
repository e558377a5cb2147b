use async_graphql::futures_util::Stream;
use async_graphql::{Context, Error, Result, Subscription};
use message_feature::{BusEvent, MessageBus};
use tokio::sync::broadcast::error::RecvError;

use crate::auth::Session;

use super::types::MessageType;

pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Stream of messages published for one conversation, in publish order.
    ///
    /// The stream ends when the connection closes or the server drains its
    /// subscriptions at shutdown.
    async fn message_sent(
        &self,
        ctx: &Context<'_>,
        conversation_id: String,
    ) -> Result<impl Stream<Item = MessageType>> {
        ctx.data_opt::<Session>()
            .ok_or_else(|| Error::new("Not authorized"))?;

        let bus = ctx.data::<MessageBus>()?;
        let mut rx = bus.subscribe();

        Ok(async_stream::stream! {
            loop {
                match rx.recv().await {
                    Ok(BusEvent::MessageSent(message)) => {
                        if message.conversation_id == conversation_id {
                            yield MessageType::from(message);
                        }
                    }
                    Ok(BusEvent::Shutdown) => break,
                    // A slow consumer skips what it missed rather than dying
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}
