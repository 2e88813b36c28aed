use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Value type of a metric, an aggregated attribute or a constant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Double,
    Uint,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Double => "double",
            DataType::Uint => "uint",
        }
    }

    /// Storage width of one aggregated value, in bytes.
    pub fn width_bytes(self) -> u32 {
        match self {
            DataType::Double => 8,
            DataType::Uint => 4,
        }
    }

    /// Render an integral value the way constants of this type are stored.
    pub fn format_value(self, value: u32) -> String {
        match self {
            DataType::Double => format!("{value}.0"),
            DataType::Uint => value.to_string(),
        }
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "double" => Ok(DataType::Double),
            "uint" => Ok(DataType::Uint),
            other => Err(unknown("data type", other)),
        }
    }
}

/// Window kind of a windowed attribute. Only tumbling windows are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum WindowType {
    #[serde(rename = "tumb")]
    Tumbling,
}

impl WindowType {
    pub fn as_str(self) -> &'static str {
        match self {
            WindowType::Tumbling => "tumb",
        }
    }
}

impl FromStr for WindowType {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "tumb" => Ok(WindowType::Tumbling),
            other => Err(unknown("window type", other)),
        }
    }
}

/// Window length of a windowed attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum WindowSize {
    #[serde(rename = "d")]
    Day,
    #[serde(rename = "w")]
    Week,
}

impl WindowSize {
    pub fn as_str(self) -> &'static str {
        match self {
            WindowSize::Day => "d",
            WindowSize::Week => "w",
        }
    }
}

impl FromStr for WindowSize {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "d" => Ok(WindowSize::Day),
            "w" => Ok(WindowSize::Week),
            other => Err(unknown("window size", other)),
        }
    }
}

/// Aggregation applied over a window. `avg` is deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AggregationFn {
    Sum,
    Min,
    Max,
}

impl AggregationFn {
    pub fn as_str(self) -> &'static str {
        match self {
            AggregationFn::Sum => "sum",
            AggregationFn::Min => "min",
            AggregationFn::Max => "max",
        }
    }
}

impl FromStr for AggregationFn {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "sum" => Ok(AggregationFn::Sum),
            "min" => Ok(AggregationFn::Min),
            "max" => Ok(AggregationFn::Max),
            other => Err(unknown("aggregation function", other)),
        }
    }
}

/// Comparison operator of a predicate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Greater than.
    Gr,
    /// Less than.
    Lt,
    /// Greater than or equal.
    Gre,
    /// Less than or equal.
    Lte,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Gr => "gr",
            Operator::Lt => "lt",
            Operator::Gre => "gre",
            Operator::Lte => "lte",
        }
    }

    /// Short symbol used by rendered reports (also a valid HTML entity name).
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Gr => "gt",
            Operator::Lt => "lt",
            Operator::Gre => "ge",
            Operator::Lte => "le",
        }
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "gr" => Ok(Operator::Gr),
            "lt" => Ok(Operator::Lt),
            "gre" => Ok(Operator::Gre),
            "lte" => Ok(Operator::Lte),
            other => Err(unknown("operator", other)),
        }
    }
}

/// How often a campaign may fire once its condition holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum FiringInterval {
    #[serde(rename = "0")]
    Always,
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "2d")]
    EveryTwoDays,
    #[serde(rename = "w")]
    Weekly,
}

impl FiringInterval {
    pub fn as_str(self) -> &'static str {
        match self {
            FiringInterval::Always => "0",
            FiringInterval::Daily => "1d",
            FiringInterval::EveryTwoDays => "2d",
            FiringInterval::Weekly => "w",
        }
    }
}

impl FromStr for FiringInterval {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "0" => Ok(FiringInterval::Always),
            "1d" => Ok(FiringInterval::Daily),
            "2d" => Ok(FiringInterval::EveryTwoDays),
            "w" => Ok(FiringInterval::Weekly),
            other => Err(unknown("firing interval", other)),
        }
    }
}

/// Whether the firing interval is anchored at a fixed point or slides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FiringStartCondition {
    Fixed,
    Sliding,
}

impl FiringStartCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            FiringStartCondition::Fixed => "fixed",
            FiringStartCondition::Sliding => "sliding",
        }
    }
}

impl FromStr for FiringStartCondition {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "fixed" => Ok(FiringStartCondition::Fixed),
            "sliding" => Ok(FiringStartCondition::Sliding),
            other => Err(unknown("firing start condition", other)),
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

display_as_str!(
    DataType,
    WindowType,
    WindowSize,
    AggregationFn,
    Operator,
    FiringInterval,
    FiringStartCondition,
);

fn unknown(kind: &'static str, value: &str) -> Error {
    Error::UnknownValue {
        kind,
        value: value.to_string(),
    }
}
