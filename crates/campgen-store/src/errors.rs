use thiserror::Error;

/// Errors raised by persistence sinks.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("schema creation failed: {0}")]
    Schema(String),
    #[error("writing {table} failed: {message}")]
    Write { table: &'static str, message: String },
    #[error("{table} id {id} does not fit the INTEGER column")]
    IdOutOfRange { table: &'static str, id: u32 },
    #[error("unsupported instance: {0}")]
    UnsupportedInstance(String),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
