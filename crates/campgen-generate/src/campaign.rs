use std::num::NonZeroU32;

use campgen_core::{Campaign, FiringInterval, FiringStartCondition};
pub use campgen_core::{DAY_MILLIS, EPOCH_MILLIS, MAX_WINDOW_DAYS, MIN_WINDOW_DAYS};
use tracing::warn;

use crate::conjunct::build_conjunct;
use crate::context::GenerationContext;
use crate::model::GenerationIssue;

const WINDOW_SPAN: NonZeroU32 = NonZeroU32::new(MAX_WINDOW_DAYS - MIN_WINDOW_DAYS + 1).unwrap();

/// Conjunct tally of one built campaign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CampaignOutcome {
    pub conjuncts_built: u32,
    pub conjuncts_failed: u32,
}

impl CampaignOutcome {
    pub fn is_complete(&self) -> bool {
        self.conjuncts_failed == 0
    }
}

/// Build campaign `campaign_id` and its conjuncts.
///
/// Draw order: window length, start offset, firing interval, start
/// condition, conjunct count, then each conjunct. A conjunct that cannot be
/// built is logged and recorded as an issue; the campaign keeps the others.
pub fn build_campaign(ctx: &mut GenerationContext, campaign_id: u32) -> CampaignOutcome {
    let duration_days = MIN_WINDOW_DAYS + ctx.rng.next_below(WINDOW_SPAN);
    let start_bound = NonZeroU32::MIN.saturating_add(MAX_WINDOW_DAYS - duration_days);
    let start_day = ctx.rng.next_below(start_bound);

    let valid_from = EPOCH_MILLIS + i64::from(start_day) * DAY_MILLIS;
    let valid_to = valid_from + i64::from(duration_days) * DAY_MILLIS;
    let firing_interval = pick_firing_interval(ctx.rng.next_f64());
    let firing_start_condition = pick_start_condition(ctx.rng.next_f64());

    ctx.campaigns.push(Campaign {
        id: campaign_id,
        valid_from,
        valid_to,
        firing_interval,
        firing_start_condition,
    });

    let conjunct_count = ctx.rng.next_below(ctx.max_conjuncts) + 1;
    let mut outcome = CampaignOutcome::default();
    for _ in 0..conjunct_count {
        match build_conjunct(ctx, campaign_id) {
            Ok(_) => outcome.conjuncts_built += 1,
            Err(err) => {
                let conjunct_id = ctx.conjunct_counter + 1;
                warn!(
                    campaign_id,
                    conjunct_id,
                    error = %err,
                    "conjunct abandoned"
                );
                ctx.issues.push(
                    GenerationIssue::warning("conjunct_failed", err.to_string())
                        .for_conjunct(campaign_id, conjunct_id),
                );
                outcome.conjuncts_failed += 1;
            }
        }
    }
    outcome
}

/// Map a uniform draw to a firing interval: 20% each for `0`, `1d` and `2d`,
/// the rest weekly.
pub fn pick_firing_interval(draw: f64) -> FiringInterval {
    if draw <= 0.2 {
        FiringInterval::Always
    } else if draw <= 0.4 {
        FiringInterval::Daily
    } else if draw <= 0.6 {
        FiringInterval::EveryTwoDays
    } else {
        FiringInterval::Weekly
    }
}

pub fn pick_start_condition(draw: f64) -> FiringStartCondition {
    if draw <= 0.9 {
        FiringStartCondition::Fixed
    } else {
        FiringStartCondition::Sliding
    }
}
