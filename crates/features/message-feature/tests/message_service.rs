//! Behavior tests for the message feature
//!
//! These verify the send/list workflows against a real database, including
//! the fan-out side effect on the event bus.

use message_feature::{
    BusEvent, MessageBus, MessageFeatureError, MessageService, SendMessageInput,
};
use sqlx::PgPool;

fn input(id: &str, conversation_id: &str, body: &str) -> SendMessageInput {
    SendMessageInput {
        id: id.to_string(),
        conversation_id: conversation_id.to_string(),
        sender_id: "u1".to_string(),
        body: body.to_string(),
        media: None,
        media_type: None,
    }
}

#[sqlx::test(migrations = "../../../migrations")]
async fn sending_a_message_returns_true_and_persists(
    pool: PgPool,
) -> Result<(), MessageFeatureError> {
    let bus = MessageBus::default();

    let sent = MessageService::send(&pool, &bus, input("m1", "c1", "hi")).await?;
    assert!(sent);

    let history = MessageService::list_for_conversation(&pool, "c1").await?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, "m1");
    assert_eq!(history[0].body, "hi");
    Ok(())
}

#[sqlx::test(migrations = "../../../migrations")]
async fn sending_publishes_to_subscribers(pool: PgPool) -> Result<(), MessageFeatureError> {
    let bus = MessageBus::default();
    let mut rx = bus.subscribe();

    MessageService::send(&pool, &bus, input("m1", "c1", "hi")).await?;

    match rx.recv().await.unwrap() {
        BusEvent::MessageSent(m) => {
            assert_eq!(m.id, "m1");
            assert_eq!(m.conversation_id, "c1");
        }
        other => panic!("unexpected event: {:?}", other),
    }
    Ok(())
}

#[sqlx::test(migrations = "../../../migrations")]
async fn duplicate_message_id_is_rejected(pool: PgPool) -> Result<(), MessageFeatureError> {
    let bus = MessageBus::default();
    let mut rx = bus.subscribe();

    MessageService::send(&pool, &bus, input("m1", "c1", "first")).await?;
    let result = MessageService::send(&pool, &bus, input("m1", "c1", "again")).await;

    assert!(matches!(
        result,
        Err(MessageFeatureError::DuplicateMessage(id)) if id == "m1"
    ));

    // Only the successful send was fanned out
    assert!(matches!(rx.recv().await.unwrap(), BusEvent::MessageSent(_)));
    assert!(rx.try_recv().is_err());
    Ok(())
}

#[sqlx::test(migrations = "../../../migrations")]
async fn media_fields_stay_absent_when_omitted(pool: PgPool) -> Result<(), MessageFeatureError> {
    let bus = MessageBus::default();

    MessageService::send(&pool, &bus, input("m1", "c1", "plain text")).await?;

    let history = MessageService::list_for_conversation(&pool, "c1").await?;
    assert!(history[0].media.is_none());
    assert!(history[0].media_type.is_none());
    Ok(())
}

#[sqlx::test(migrations = "../../../migrations")]
async fn history_is_scoped_to_the_requested_conversation(
    pool: PgPool,
) -> Result<(), MessageFeatureError> {
    let bus = MessageBus::default();

    MessageService::send(&pool, &bus, input("m1", "c1", "one")).await?;
    MessageService::send(&pool, &bus, input("m2", "c2", "other")).await?;
    MessageService::send(&pool, &bus, input("m3", "c1", "two")).await?;

    let history = MessageService::list_for_conversation(&pool, "c1").await?;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, "m1");
    assert_eq!(history[1].id, "m3");
    Ok(())
}
