use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid priority: {0} (expected high, medium or low)")]
    InvalidPriority(String),

    #[error("Invalid status: {0} (expected todo, in-progress or completed)")]
    InvalidStatus(String),

    #[error("Invalid date format: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Required field missing: {0}")]
    MissingField(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
