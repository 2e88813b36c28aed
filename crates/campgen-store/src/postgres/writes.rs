use sqlx::query_builder::Separated;
use sqlx::{PgConnection, Postgres, QueryBuilder};

use campgen_core::{
    Campaign, Conjunct, ConjunctPredicate, Constant, Metric, Predicate, Row, WtAttribute,
};

use crate::errors::{Result, StoreError};

/// Rows per multi-row insert; keeps every statement far below the bind limit.
const CHUNK_ROWS: usize = 1000;

/// Convert an entity id to the INTEGER column type.
pub fn pg_id(table: &'static str, id: u32) -> Result<i32> {
    i32::try_from(id).map_err(|_| StoreError::IdOutOfRange { table, id })
}

async fn insert_values<'args, T, F>(
    conn: &mut PgConnection,
    table: &'static str,
    columns: &[&str],
    tuples: Vec<T>,
    mut push_tuple: F,
) -> Result<u64>
where
    T: Send + 'args,
    F: FnMut(Separated<'_, 'args, Postgres, &'static str>, T) + Send,
{
    let header = format!("insert into {table} ({}) ", columns.join(", "));
    let mut written = 0_u64;
    let mut tuples = tuples.into_iter().peekable();

    while tuples.peek().is_some() {
        let chunk: Vec<T> = tuples.by_ref().take(CHUNK_ROWS).collect();
        let mut builder: QueryBuilder<'args, Postgres> = QueryBuilder::new(&header);
        builder.push_values(chunk, &mut push_tuple);
        let result = builder
            .build()
            .execute(&mut *conn)
            .await
            .map_err(|err| StoreError::Write {
                table,
                message: err.to_string(),
            })?;
        written += result.rows_affected();
    }

    Ok(written)
}

pub async fn insert_metrics(conn: &mut PgConnection, rows: &[Metric]) -> Result<u64> {
    let tuples = rows
        .iter()
        .map(|row| Ok((pg_id(Metric::TABLE, row.id)?, row)))
        .collect::<Result<Vec<_>>>()?;
    insert_values(conn, Metric::TABLE, Metric::COLUMNS, tuples, |mut b, (id, row)| {
        b.push_bind(id)
            .push_bind(row.name.as_str())
            .push_bind(row.data_type.as_str());
    })
    .await
}

pub async fn insert_wt_attributes(conn: &mut PgConnection, rows: &[WtAttribute]) -> Result<u64> {
    let tuples = rows
        .iter()
        .map(|row| {
            Ok((
                pg_id(WtAttribute::TABLE, row.id)?,
                pg_id(Metric::TABLE, row.metric_id)?,
                row,
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    insert_values(
        conn,
        WtAttribute::TABLE,
        WtAttribute::COLUMNS,
        tuples,
        |mut b, (id, metric_id, row)| {
            b.push_bind(id)
                .push_bind(metric_id)
                .push_bind(row.is_pivot)
                .push_bind(row.window_type.as_str())
                .push_bind(row.window_size.as_str())
                .push_bind(row.aggregation_fn.as_str())
                .push_bind(row.aggregation_data_type.as_str());
        },
    )
    .await
}

pub async fn insert_constants(conn: &mut PgConnection, rows: &[Constant]) -> Result<u64> {
    let tuples = rows
        .iter()
        .map(|row| Ok((pg_id(Constant::TABLE, row.id)?, row)))
        .collect::<Result<Vec<_>>>()?;
    insert_values(conn, Constant::TABLE, Constant::COLUMNS, tuples, |mut b, (id, row)| {
        b.push_bind(id)
            .push_bind(row.value.as_str())
            .push_bind(row.data_type.as_str());
    })
    .await
}

pub async fn insert_predicates(conn: &mut PgConnection, rows: &[Predicate]) -> Result<u64> {
    let tuples = rows
        .iter()
        .map(|row| {
            Ok((
                pg_id(Predicate::TABLE, row.id)?,
                pg_id(WtAttribute::TABLE, row.wt_attribute_id)?,
                row.operator.as_str(),
                pg_id(Constant::TABLE, row.constant_id)?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    insert_values(
        conn,
        Predicate::TABLE,
        Predicate::COLUMNS,
        tuples,
        |mut b, (id, attribute_id, operator, constant_id)| {
            b.push_bind(id)
                .push_bind(attribute_id)
                .push_bind(operator)
                .push_bind(constant_id);
        },
    )
    .await
}

pub async fn insert_campaign(conn: &mut PgConnection, row: &Campaign) -> Result<u64> {
    let tuples = vec![(pg_id(Campaign::TABLE, row.id)?, row)];
    insert_values(conn, Campaign::TABLE, Campaign::COLUMNS, tuples, |mut b, (id, row)| {
        b.push_bind(id)
            .push_bind(row.valid_from)
            .push_bind(row.valid_to)
            .push_bind(row.firing_interval.as_str())
            .push_bind(row.firing_start_condition.as_str());
    })
    .await
}

pub async fn insert_conjuncts(conn: &mut PgConnection, rows: &[&Conjunct]) -> Result<u64> {
    let tuples = rows
        .iter()
        .map(|row| {
            Ok((
                pg_id(Conjunct::TABLE, row.id)?,
                pg_id(Campaign::TABLE, row.campaign_id)?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    insert_values(
        conn,
        Conjunct::TABLE,
        Conjunct::COLUMNS,
        tuples,
        |mut b, (id, campaign_id)| {
            b.push_bind(id).push_bind(campaign_id);
        },
    )
    .await
}

pub async fn insert_links(conn: &mut PgConnection, rows: &[&ConjunctPredicate]) -> Result<u64> {
    let tuples = rows
        .iter()
        .map(|row| {
            Ok((
                pg_id(Predicate::TABLE, row.predicate_id)?,
                pg_id(Conjunct::TABLE, row.conjunct_id)?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    insert_values(
        conn,
        ConjunctPredicate::TABLE,
        ConjunctPredicate::COLUMNS,
        tuples,
        |mut b, (predicate_id, conjunct_id)| {
            b.push_bind(predicate_id).push_bind(conjunct_id);
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_beyond_integer_range_are_rejected() {
        assert_eq!(pg_id("campaign", 300).ok(), Some(300));
        assert_eq!(pg_id("campaign", i32::MAX as u32).ok(), Some(i32::MAX));

        let err = pg_id("campaign", u32::MAX).expect_err("out of range");
        assert!(matches!(
            err,
            StoreError::IdOutOfRange {
                table: "campaign",
                id: u32::MAX
            }
        ));
    }
}
