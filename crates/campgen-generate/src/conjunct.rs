use std::collections::BTreeSet;

use campgen_core::{Conjunct, ConjunctPredicate};

use crate::context::GenerationContext;
use crate::errors::GenerationError;

/// Probability that a conjunct is anchored on a pivot attribute.
pub const PIVOT_ANCHOR_PROBABILITY: f64 = 0.9;

/// Build one conjunct for `campaign_id` and return its id.
///
/// Draw order: predicate count, pivot decision, then each predicate. On
/// failure the conjunct id is released and neither the conjunct nor its links
/// are recorded; constants and predicates already pooled stay, since later
/// conjuncts may reuse them.
pub fn build_conjunct(
    ctx: &mut GenerationContext,
    campaign_id: u32,
) -> Result<u32, GenerationError> {
    ctx.conjunct_counter += 1;
    let id = ctx.conjunct_counter;

    match draw_predicates(ctx) {
        Ok(predicate_ids) => {
            ctx.conjuncts.push(Conjunct { id, campaign_id });
            let mut linked = BTreeSet::new();
            for predicate_id in predicate_ids {
                if linked.insert(predicate_id) {
                    ctx.links.push(ConjunctPredicate {
                        predicate_id,
                        conjunct_id: id,
                    });
                } else {
                    ctx.collapsed_links += 1;
                }
            }
            Ok(id)
        }
        Err(err) => {
            ctx.conjunct_counter -= 1;
            Err(err)
        }
    }
}

fn draw_predicates(ctx: &mut GenerationContext) -> Result<Vec<u32>, GenerationError> {
    let count = ctx.rng.next_below(ctx.max_predicates) + 1;
    let anchor_is_pivot = ctx.rng.next_f64() <= PIVOT_ANCHOR_PROBABILITY;

    let mut ids = Vec::with_capacity(count as usize);
    for index in 0..count {
        let is_pivot = index == 0 && anchor_is_pivot;
        let id = ctx.predicates.get_or_create(
            &mut ctx.rng,
            &ctx.catalog,
            &mut ctx.constants,
            is_pivot,
        )?;
        ids.push(id);
    }
    Ok(ids)
}
