pub mod auth;
pub mod config;
pub mod schema;

use async_graphql::Schema;
use message_feature::MessageBus;
use schema::{MutationRoot, QueryRoot, SubscriptionRoot};
use sqlx::PgPool;

/// The GraphQL schema type
pub type AppSchema = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

/// Build the GraphQL schema with the given database pool and event bus
pub fn build_schema(pool: PgPool, bus: MessageBus) -> AppSchema {
    Schema::build(QueryRoot, MutationRoot, SubscriptionRoot)
        .data(pool)
        .data(bus)
        .finish()
}
