pub mod bus;
pub mod error;
pub mod service;

pub use bus::{BusEvent, MessageBus};
pub use error::MessageFeatureError;
pub use service::{MessageService, SendMessageInput};
