pub mod error;
pub mod message;

pub use error::DomainError;
pub use message::{Message, MessageRepository};
