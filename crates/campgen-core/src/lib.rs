//! Core contracts for campgen.
//!
//! This crate defines the entity rows of a campaign benchmark dataset, the
//! vocabularies their columns draw from, and the invariant checks shared by
//! the generator, the persistence sink and the report renderer.

pub mod error;
pub mod model;
pub mod types;
pub mod validation;

pub use error::{Error, Result};
pub use model::{
    Campaign, Conjunct, ConjunctPredicate, Constant, Dataset, Metric, Predicate, Row, WtAttribute,
};
pub use types::{
    AggregationFn, DataType, FiringInterval, FiringStartCondition, Operator, WindowSize,
    WindowType,
};
pub use validation::validate_dataset;

/// Current contract version for dataset artifacts.
pub const DATASET_VERSION: &str = "0.1";

/// 2012-01-01T00:00:00Z in epoch milliseconds; campaign windows start on or
/// after it.
pub const EPOCH_MILLIS: i64 = 1_325_376_000_000;
pub const DAY_MILLIS: i64 = 86_400_000;
/// Shortest campaign validity window in days.
pub const MIN_WINDOW_DAYS: u32 = 7;
/// Longest campaign validity window in days; windows also end within this
/// many days of the epoch anchor.
pub const MAX_WINDOW_DAYS: u32 = 31;

/// Entity tables in creation (and foreign-key) order.
pub const TABLE_ORDER: [&str; 7] = [
    "metric",
    "wt_attribute",
    "constant",
    "predicate",
    "campaign",
    "conjunct",
    "conjunct_predicate",
];
