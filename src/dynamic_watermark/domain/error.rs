use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum DomainError {
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),
}
