use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{
    AggregationFn, DataType, FiringInterval, FiringStartCondition, Operator, WindowSize,
    WindowType,
};

/// A relational row with a fixed table name and column order.
///
/// The column order is shared by the CSV writer, the CSV loader and the
/// database sink, so values must always be produced in `COLUMNS` order.
pub trait Row: Sized {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    /// Column values rendered as text, in `COLUMNS` order.
    fn values(&self) -> Vec<String>;

    /// Parse a row from text values in `COLUMNS` order.
    fn from_values(values: &[&str]) -> Result<Self>;
}

/// A raw measurement every windowed attribute aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub id: u32,
    pub name: String,
    pub data_type: DataType,
}

/// A windowed, aggregated view over one metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WtAttribute {
    pub id: u32,
    pub metric_id: u32,
    pub is_pivot: bool,
    pub window_type: WindowType,
    pub window_size: WindowSize,
    pub aggregation_fn: AggregationFn,
    pub aggregation_data_type: DataType,
}

/// A literal compared against by predicates; `value` is already formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constant {
    pub id: u32,
    pub value: String,
    pub data_type: DataType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    pub id: u32,
    pub wt_attribute_id: u32,
    pub operator: Operator,
    pub constant_id: u32,
}

/// A time-bounded campaign; `valid_from`/`valid_to` are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: u32,
    pub valid_from: i64,
    pub valid_to: i64,
    pub firing_interval: FiringInterval,
    pub firing_start_condition: FiringStartCondition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conjunct {
    pub id: u32,
    pub campaign_id: u32,
}

/// Membership of a predicate in a conjunct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConjunctPredicate {
    pub predicate_id: u32,
    pub conjunct_id: u32,
}

/// The complete entity set of one generation run, each table in id order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub metrics: Vec<Metric>,
    pub wt_attributes: Vec<WtAttribute>,
    pub constants: Vec<Constant>,
    pub predicates: Vec<Predicate>,
    pub campaigns: Vec<Campaign>,
    pub conjuncts: Vec<Conjunct>,
    pub conjunct_predicates: Vec<ConjunctPredicate>,
}

impl Dataset {
    /// Row counts per table, in `TABLE_ORDER`.
    pub fn table_counts(&self) -> [(&'static str, usize); 7] {
        [
            (Metric::TABLE, self.metrics.len()),
            (WtAttribute::TABLE, self.wt_attributes.len()),
            (Constant::TABLE, self.constants.len()),
            (Predicate::TABLE, self.predicates.len()),
            (Campaign::TABLE, self.campaigns.len()),
            (Conjunct::TABLE, self.conjuncts.len()),
            (ConjunctPredicate::TABLE, self.conjunct_predicates.len()),
        ]
    }

    /// Conjuncts owned by a campaign, in id order.
    pub fn conjuncts_of(&self, campaign_id: u32) -> impl Iterator<Item = &Conjunct> {
        self.conjuncts
            .iter()
            .filter(move |conjunct| conjunct.campaign_id == campaign_id)
    }

    /// Predicate ids linked to a conjunct, ascending.
    pub fn predicate_ids_of(&self, conjunct_id: u32) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .conjunct_predicates
            .iter()
            .filter(|link| link.conjunct_id == conjunct_id)
            .map(|link| link.predicate_id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

impl Row for Metric {
    const TABLE: &'static str = "metric";
    const COLUMNS: &'static [&'static str] = &["id", "name", "data_type"];

    fn values(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.data_type.as_str().to_string(),
        ]
    }

    fn from_values(values: &[&str]) -> Result<Self> {
        let [id, name, data_type] = fields::<3>(Self::TABLE, values)?;
        Ok(Self {
            id: parse_id(Self::TABLE, "id", id)?,
            name: name.to_string(),
            data_type: data_type.parse()?,
        })
    }
}

impl Row for WtAttribute {
    const TABLE: &'static str = "wt_attribute";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "metric",
        "is_pivot",
        "window_type",
        "window_size",
        "aggr_fun",
        "aggr_data_type",
    ];

    fn values(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.metric_id.to_string(),
            if self.is_pivot { "1" } else { "0" }.to_string(),
            self.window_type.as_str().to_string(),
            self.window_size.as_str().to_string(),
            self.aggregation_fn.as_str().to_string(),
            self.aggregation_data_type.as_str().to_string(),
        ]
    }

    fn from_values(values: &[&str]) -> Result<Self> {
        let [id, metric, is_pivot, window_type, window_size, aggr_fun, aggr_data_type] =
            fields::<7>(Self::TABLE, values)?;
        let is_pivot = match is_pivot {
            "1" => true,
            "0" => false,
            other => {
                return Err(Error::InvalidDataset(format!(
                    "wt_attribute.is_pivot must be 0 or 1, got '{other}'"
                )));
            }
        };
        Ok(Self {
            id: parse_id(Self::TABLE, "id", id)?,
            metric_id: parse_id(Self::TABLE, "metric", metric)?,
            is_pivot,
            window_type: window_type.parse()?,
            window_size: window_size.parse()?,
            aggregation_fn: aggr_fun.parse()?,
            aggregation_data_type: aggr_data_type.parse()?,
        })
    }
}

impl Row for Constant {
    const TABLE: &'static str = "constant";
    const COLUMNS: &'static [&'static str] = &["id", "value", "data_type"];

    fn values(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.value.clone(),
            self.data_type.as_str().to_string(),
        ]
    }

    fn from_values(values: &[&str]) -> Result<Self> {
        let [id, value, data_type] = fields::<3>(Self::TABLE, values)?;
        Ok(Self {
            id: parse_id(Self::TABLE, "id", id)?,
            value: value.to_string(),
            data_type: data_type.parse()?,
        })
    }
}

impl Row for Predicate {
    const TABLE: &'static str = "predicate";
    const COLUMNS: &'static [&'static str] = &["id", "wt_attribute", "operator", "constant"];

    fn values(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.wt_attribute_id.to_string(),
            self.operator.as_str().to_string(),
            self.constant_id.to_string(),
        ]
    }

    fn from_values(values: &[&str]) -> Result<Self> {
        let [id, wt_attribute, operator, constant] = fields::<4>(Self::TABLE, values)?;
        Ok(Self {
            id: parse_id(Self::TABLE, "id", id)?,
            wt_attribute_id: parse_id(Self::TABLE, "wt_attribute", wt_attribute)?,
            operator: operator.parse()?,
            constant_id: parse_id(Self::TABLE, "constant", constant)?,
        })
    }
}

impl Row for Campaign {
    const TABLE: &'static str = "campaign";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "valid_from",
        "valid_to",
        "firing_interval",
        "firing_start_condition",
    ];

    fn values(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.valid_from.to_string(),
            self.valid_to.to_string(),
            self.firing_interval.as_str().to_string(),
            self.firing_start_condition.as_str().to_string(),
        ]
    }

    fn from_values(values: &[&str]) -> Result<Self> {
        let [id, valid_from, valid_to, firing_interval, firing_start_condition] =
            fields::<5>(Self::TABLE, values)?;
        Ok(Self {
            id: parse_id(Self::TABLE, "id", id)?,
            valid_from: parse_millis(Self::TABLE, "valid_from", valid_from)?,
            valid_to: parse_millis(Self::TABLE, "valid_to", valid_to)?,
            firing_interval: firing_interval.parse()?,
            firing_start_condition: firing_start_condition.parse()?,
        })
    }
}

impl Row for Conjunct {
    const TABLE: &'static str = "conjunct";
    const COLUMNS: &'static [&'static str] = &["id", "campaign"];

    fn values(&self) -> Vec<String> {
        vec![self.id.to_string(), self.campaign_id.to_string()]
    }

    fn from_values(values: &[&str]) -> Result<Self> {
        let [id, campaign] = fields::<2>(Self::TABLE, values)?;
        Ok(Self {
            id: parse_id(Self::TABLE, "id", id)?,
            campaign_id: parse_id(Self::TABLE, "campaign", campaign)?,
        })
    }
}

impl Row for ConjunctPredicate {
    const TABLE: &'static str = "conjunct_predicate";
    const COLUMNS: &'static [&'static str] = &["predicate", "conjunct"];

    fn values(&self) -> Vec<String> {
        vec![self.predicate_id.to_string(), self.conjunct_id.to_string()]
    }

    fn from_values(values: &[&str]) -> Result<Self> {
        let [predicate, conjunct] = fields::<2>(Self::TABLE, values)?;
        Ok(Self {
            predicate_id: parse_id(Self::TABLE, "predicate", predicate)?,
            conjunct_id: parse_id(Self::TABLE, "conjunct", conjunct)?,
        })
    }
}

fn fields<'a, const N: usize>(table: &str, values: &[&'a str]) -> Result<[&'a str; N]> {
    <[&str; N]>::try_from(values).map_err(|_| {
        Error::InvalidDataset(format!(
            "{table}: expected {N} columns, got {}",
            values.len()
        ))
    })
}

fn parse_id(table: &str, column: &str, raw: &str) -> Result<u32> {
    raw.parse::<u32>().map_err(|_| {
        Error::InvalidDataset(format!("{table}.{column}: '{raw}' is not a valid id"))
    })
}

fn parse_millis(table: &str, column: &str, raw: &str) -> Result<i64> {
    raw.parse::<i64>().map_err(|_| {
        Error::InvalidDataset(format!("{table}.{column}: '{raw}' is not a timestamp"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wt_attribute_values_follow_column_order() {
        let attribute = WtAttribute {
            id: 3,
            metric_id: 1,
            is_pivot: true,
            window_type: WindowType::Tumbling,
            window_size: WindowSize::Week,
            aggregation_fn: AggregationFn::Max,
            aggregation_data_type: DataType::Double,
        };

        assert_eq!(
            attribute.values(),
            vec!["3", "1", "1", "tumb", "w", "max", "double"]
        );
    }

    #[test]
    fn rejects_rows_with_wrong_arity() {
        let result = Conjunct::from_values(&["1"]);
        assert!(matches!(result, Err(Error::InvalidDataset(_))));
    }

    #[test]
    fn predicate_ids_of_conjunct_are_sorted() {
        let dataset = Dataset {
            conjunct_predicates: vec![
                ConjunctPredicate {
                    predicate_id: 9,
                    conjunct_id: 1,
                },
                ConjunctPredicate {
                    predicate_id: 2,
                    conjunct_id: 1,
                },
                ConjunctPredicate {
                    predicate_id: 4,
                    conjunct_id: 2,
                },
            ],
            ..Dataset::default()
        };

        assert_eq!(dataset.predicate_ids_of(1), vec![2, 9]);
    }
}
