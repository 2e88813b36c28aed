use std::collections::HashMap;
use std::num::NonZeroU32;

use campgen_core::{Constant, DataType, Operator, Predicate};
use tracing::debug;

use crate::catalog::AttributeCatalog;
use crate::errors::GenerationError;
use crate::random::RandomSequence;

/// Smallest constant value.
pub const CONSTANT_MIN: u32 = 11;
/// Number of distinct constant values per data type (`11..=100`).
pub const CONSTANT_SPAN: NonZeroU32 = NonZeroU32::new(90).unwrap();

/// Append-only pool canonicalizing `(data_type, value)` to a constant id.
#[derive(Debug, Default)]
pub struct ConstantPool {
    index: HashMap<(DataType, u32), u32>,
    rows: Vec<Constant>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw a value of `data_type` and return the id of its constant,
    /// creating the constant on first sight.
    pub fn get_or_create(&mut self, rng: &mut RandomSequence, data_type: DataType) -> u32 {
        let value = CONSTANT_MIN + rng.next_below(CONSTANT_SPAN);
        if let Some(&id) = self.index.get(&(data_type, value)) {
            return id;
        }

        let id = self.rows.len() as u32 + 1;
        self.rows.push(Constant {
            id,
            value: data_type.format_value(value),
            data_type,
        });
        self.index.insert((data_type, value), id);
        id
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Constant] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Constant> {
        self.rows
    }
}

/// Append-only pool canonicalizing `(attribute, operator, constant)` to a
/// predicate id.
#[derive(Debug, Default)]
pub struct PredicatePool {
    index: HashMap<(u32, Operator, u32), u32>,
    rows: Vec<Predicate>,
}

impl PredicatePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw a predicate over a pivot (or non-pivot) attribute and return its
    /// id. Draw order: attribute, operator, then the constant value.
    pub fn get_or_create(
        &mut self,
        rng: &mut RandomSequence,
        catalog: &AttributeCatalog,
        constants: &mut ConstantPool,
        is_pivot: bool,
    ) -> Result<u32, GenerationError> {
        let wt_attribute_id = if is_pivot {
            rng.next_below(catalog.pivot_count()) + 1
        } else {
            catalog.pivot_count().get() + rng.next_below(catalog.non_pivot_count()) + 1
        };
        let operator = pick_operator(rng.next_f64());
        let data_type = catalog
            .aggregation_data_type(wt_attribute_id)
            .ok_or(GenerationError::UnknownAttribute(wt_attribute_id))?;
        let constant_id = constants.get_or_create(rng, data_type);

        let key = (wt_attribute_id, operator, constant_id);
        if let Some(&id) = self.index.get(&key) {
            return Ok(id);
        }

        let id = self.rows.len() as u32 + 1;
        self.rows.push(Predicate {
            id,
            wt_attribute_id,
            operator,
            constant_id,
        });
        self.index.insert(key, id);
        debug!(
            predicate_id = id,
            wt_attribute_id,
            operator = %operator,
            constant_id,
            "predicate created"
        );
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Predicate] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Predicate> {
        self.rows
    }
}

/// Map a uniform draw to an operator: 40% `gr`, 10% `lt`, 40% `gre`, 10% `lte`.
pub fn pick_operator(draw: f64) -> Operator {
    if draw <= 0.4 {
        Operator::Gr
    } else if draw <= 0.5 {
        Operator::Lt
    } else if draw <= 0.9 {
        Operator::Gre
    } else {
        Operator::Lte
    }
}
