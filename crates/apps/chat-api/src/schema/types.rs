use async_graphql::SimpleObject;
use time::OffsetDateTime;

/// GraphQL reference to a message sender.
///
/// Users are owned by the account service; only the identifier survives
/// in this schema.
#[derive(SimpleObject)]
pub struct UserType {
    pub id: Option<String>,
}

/// GraphQL representation of a Message.
///
/// Every field is nullable to preserve the published wire contract, even
/// though the domain entity guarantees more.
#[derive(SimpleObject)]
pub struct MessageType {
    pub id: Option<String>,
    pub conversation_id: Option<String>,
    pub sender: Option<UserType>,
    pub body: Option<String>,
    pub media: Option<String>,
    pub media_type: Option<String>,
    pub created_at: Option<OffsetDateTime>,
}

impl From<domain::Message> for MessageType {
    fn from(message: domain::Message) -> Self {
        Self {
            id: Some(message.id),
            conversation_id: Some(message.conversation_id),
            sender: Some(UserType {
                id: Some(message.sender_id),
            }),
            body: Some(message.body),
            media: message.media,
            media_type: message.media_type,
            created_at: Some(message.created_at),
        }
    }
}
