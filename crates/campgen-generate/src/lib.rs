//! Deterministic campaign workload generation for campgen.
//!
//! A single seeded random sequence drives the attribute catalog, the
//! constant and predicate pools and the conjunct/campaign builders. The same
//! plan always reproduces the same dataset, row for row.

pub mod campaign;
pub mod catalog;
pub mod conjunct;
pub mod context;
pub mod engine;
pub mod errors;
pub mod model;
pub mod output;
pub mod pools;
pub mod random;

pub use catalog::AttributeCatalog;
pub use context::GenerationContext;
pub use engine::{GeneratedDataset, GenerationEngine, GenerationResult};
pub use errors::GenerationError;
pub use model::{GenerateOptions, GenerationIssue, GenerationReport, TableReport};
pub use pools::{ConstantPool, PredicatePool};
pub use random::RandomSequence;
