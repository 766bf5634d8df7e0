use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Failed to read key {key}: {message}")]
    Read { key: String, message: String },

    #[error("Failed to write key {key}: {message}")]
    Write { key: String, message: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Whole-value key-value storage. Values are opaque strings and every
/// `set` replaces the previous value outright.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` when the key has never been written.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}
