use thiserror::Error;

#[derive(Error, Debug)]
pub enum MessageFeatureError {
    #[error("Domain error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("Message already exists: {0}")]
    DuplicateMessage(String),
}
