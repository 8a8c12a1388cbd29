use rusqlite;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApizzaError {
    #[error("SQLite error: {0}")]
    RusqliteError(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Failed to open store: {0}")]
    StorageOpen(String),
    #[error("Failed to write to store: {0}")]
    StorageWrite(String),
    #[error("Store is closed")]
    StoreClosed,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Order not found: {0}")]
    OrderNotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    #[error("Unknown config field: {0}")]
    UnknownField(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Usage error: {0}")]
    UsageError(String),
    #[error("Ordering service error: {0}")]
    Service(String),
}

pub type Result<T> = std::result::Result<T, ApizzaError>;
