pub mod mutation;
pub mod query;
pub mod subscription;
pub mod types;

pub use mutation::MutationRoot;
pub use query::QueryRoot;
pub use subscription::SubscriptionRoot;
