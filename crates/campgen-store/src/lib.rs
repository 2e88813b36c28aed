//! Persistence sinks for generated campaign datasets.

pub mod errors;
pub mod options;
pub mod postgres;
pub mod sink;

pub use errors::{Result, StoreError};
pub use options::StoreOptions;
pub use postgres::PostgresSink;
pub use sink::{PersistReport, Sink, connect_sink};
