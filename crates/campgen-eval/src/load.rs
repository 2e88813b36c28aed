use std::path::Path;

use campgen_core::{
    Campaign, Conjunct, ConjunctPredicate, Constant, Dataset, Metric, Predicate, Row, WtAttribute,
};

use crate::errors::EvalError;

/// Load the seven entity tables written by a generation run.
///
/// Each `<table>.csv` must carry a header row matching the table's column
/// order. Rows keep file order; no referential checks are made here.
pub fn load_dataset_csv(dir: &Path) -> Result<Dataset, EvalError> {
    Ok(Dataset {
        metrics: load_table_csv::<Metric>(dir)?,
        wt_attributes: load_table_csv::<WtAttribute>(dir)?,
        constants: load_table_csv::<Constant>(dir)?,
        predicates: load_table_csv::<Predicate>(dir)?,
        campaigns: load_table_csv::<Campaign>(dir)?,
        conjuncts: load_table_csv::<Conjunct>(dir)?,
        conjunct_predicates: load_table_csv::<ConjunctPredicate>(dir)?,
    })
}

fn load_table_csv<R: Row>(dir: &Path) -> Result<Vec<R>, EvalError> {
    let path = dir.join(format!("{}.csv", R::TABLE));
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(&path)?;

    let headers = reader
        .headers()?
        .iter()
        .map(|header| header.to_lowercase())
        .collect::<Vec<_>>();
    if headers != R::COLUMNS {
        return Err(EvalError::UnexpectedColumns {
            table: R::TABLE,
            expected: R::COLUMNS.iter().map(|column| column.to_string()).collect(),
            found: headers,
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        let values: Vec<&str> = record.iter().collect();
        let row = R::from_values(&values).map_err(|source| EvalError::Row {
            table: R::TABLE,
            line,
            source,
        })?;
        rows.push(row);
    }
    Ok(rows)
}
