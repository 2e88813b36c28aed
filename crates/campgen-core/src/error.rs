use thiserror::Error;

/// Core error type shared across campgen crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The dataset violates one of its structural invariants.
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),
    /// A column value is outside its vocabulary.
    #[error("unknown {kind} '{value}'")]
    UnknownValue { kind: &'static str, value: String },
}

/// Convenience alias for results returned by campgen crates.
pub type Result<T> = std::result::Result<T, Error>;
