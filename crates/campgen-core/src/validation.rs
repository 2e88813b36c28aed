use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::error::{Error, Result};
use crate::model::{Campaign, Dataset};
use crate::types::{DataType, Operator};
use crate::{DAY_MILLIS, EPOCH_MILLIS, MAX_WINDOW_DAYS, MIN_WINDOW_DAYS};

/// Validate internal consistency of a generated dataset.
///
/// This checks:
/// - ids are dense and 1-based within every table
/// - every foreign reference resolves
/// - constants and predicates are deduplicated on their identity keys
/// - predicate constants match the aggregation type of their attribute
/// - campaign windows last 7 to 31 days inside the month after the epoch anchor
/// - conjunct/predicate links are unique
pub fn validate_dataset(dataset: &Dataset) -> Result<()> {
    check_dense("metric", dataset.metrics.iter().map(|row| row.id))?;
    check_dense("wt_attribute", dataset.wt_attributes.iter().map(|row| row.id))?;
    check_dense("constant", dataset.constants.iter().map(|row| row.id))?;
    check_dense("predicate", dataset.predicates.iter().map(|row| row.id))?;
    check_dense("campaign", dataset.campaigns.iter().map(|row| row.id))?;
    check_dense("conjunct", dataset.conjuncts.iter().map(|row| row.id))?;

    let metric_ids: BTreeSet<u32> = dataset.metrics.iter().map(|row| row.id).collect();
    let mut attribute_types: BTreeMap<u32, DataType> = BTreeMap::new();
    for attribute in &dataset.wt_attributes {
        if !metric_ids.contains(&attribute.metric_id) {
            return Err(Error::InvalidDataset(format!(
                "wt_attribute {} references missing metric {}",
                attribute.id, attribute.metric_id
            )));
        }
        attribute_types.insert(attribute.id, attribute.aggregation_data_type);
    }

    let mut constant_types: BTreeMap<u32, DataType> = BTreeMap::new();
    let mut constant_keys: HashSet<(DataType, &str)> = HashSet::new();
    for constant in &dataset.constants {
        if !constant_keys.insert((constant.data_type, constant.value.as_str())) {
            return Err(Error::InvalidDataset(format!(
                "constant {} duplicates ({}, {})",
                constant.id, constant.data_type, constant.value
            )));
        }
        constant_types.insert(constant.id, constant.data_type);
    }

    let mut predicate_keys: HashSet<(u32, Operator, u32)> = HashSet::new();
    for predicate in &dataset.predicates {
        let attribute_type = attribute_types
            .get(&predicate.wt_attribute_id)
            .ok_or_else(|| {
                Error::InvalidDataset(format!(
                    "predicate {} references missing wt_attribute {}",
                    predicate.id, predicate.wt_attribute_id
                ))
            })?;
        let constant_type = constant_types.get(&predicate.constant_id).ok_or_else(|| {
            Error::InvalidDataset(format!(
                "predicate {} references missing constant {}",
                predicate.id, predicate.constant_id
            ))
        })?;
        if attribute_type != constant_type {
            return Err(Error::InvalidDataset(format!(
                "predicate {} compares a {} attribute with a {} constant",
                predicate.id, attribute_type, constant_type
            )));
        }
        if !predicate_keys.insert((
            predicate.wt_attribute_id,
            predicate.operator,
            predicate.constant_id,
        )) {
            return Err(Error::InvalidDataset(format!(
                "predicate {} duplicates ({}, {}, {})",
                predicate.id, predicate.wt_attribute_id, predicate.operator, predicate.constant_id
            )));
        }
    }

    let campaign_ids: BTreeSet<u32> = dataset.campaigns.iter().map(|row| row.id).collect();
    for campaign in &dataset.campaigns {
        check_window(campaign)?;
    }

    let conjunct_ids: BTreeSet<u32> = dataset.conjuncts.iter().map(|row| row.id).collect();
    for conjunct in &dataset.conjuncts {
        if !campaign_ids.contains(&conjunct.campaign_id) {
            return Err(Error::InvalidDataset(format!(
                "conjunct {} references missing campaign {}",
                conjunct.id, conjunct.campaign_id
            )));
        }
    }

    let predicate_count = dataset.predicates.len();
    let mut links: HashSet<(u32, u32)> = HashSet::new();
    for link in &dataset.conjunct_predicates {
        if link.predicate_id == 0 || link.predicate_id as usize > predicate_count {
            return Err(Error::InvalidDataset(format!(
                "conjunct_predicate references missing predicate {}",
                link.predicate_id
            )));
        }
        if !conjunct_ids.contains(&link.conjunct_id) {
            return Err(Error::InvalidDataset(format!(
                "conjunct_predicate references missing conjunct {}",
                link.conjunct_id
            )));
        }
        if !links.insert((link.predicate_id, link.conjunct_id)) {
            return Err(Error::InvalidDataset(format!(
                "duplicate conjunct_predicate ({}, {})",
                link.predicate_id, link.conjunct_id
            )));
        }
    }

    Ok(())
}

fn check_window(campaign: &Campaign) -> Result<()> {
    if campaign.valid_from >= campaign.valid_to {
        return Err(Error::InvalidDataset(format!(
            "campaign {} has an empty validity window",
            campaign.id
        )));
    }
    let span = campaign.valid_to - campaign.valid_from;
    let min_span = i64::from(MIN_WINDOW_DAYS) * DAY_MILLIS;
    let max_span = i64::from(MAX_WINDOW_DAYS) * DAY_MILLIS;
    if span < min_span || span > max_span {
        return Err(Error::InvalidDataset(format!(
            "campaign {} window spans {span} ms, outside {MIN_WINDOW_DAYS}..={MAX_WINDOW_DAYS} days",
            campaign.id
        )));
    }
    if campaign.valid_from < EPOCH_MILLIS || campaign.valid_to > EPOCH_MILLIS + max_span {
        return Err(Error::InvalidDataset(format!(
            "campaign {} window [{}, {}] leaves the generation epoch",
            campaign.id, campaign.valid_from, campaign.valid_to
        )));
    }
    Ok(())
}

fn check_dense(table: &str, ids: impl Iterator<Item = u32>) -> Result<()> {
    for (index, id) in ids.enumerate() {
        let expected = index as u32 + 1;
        if id != expected {
            return Err(Error::InvalidDataset(format!(
                "{table} id {id} found where {expected} was expected"
            )));
        }
    }
    Ok(())
}
