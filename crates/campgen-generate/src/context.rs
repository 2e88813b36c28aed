use std::num::NonZeroU32;

use campgen_core::{Campaign, Conjunct, ConjunctPredicate, Dataset};
use campgen_plan::WorkloadPlan;

use crate::catalog::AttributeCatalog;
use crate::errors::GenerationError;
use crate::model::GenerationIssue;
use crate::pools::{ConstantPool, PredicatePool};
use crate::random::RandomSequence;

/// All mutable state of one generation run.
///
/// A context is created per run and consumed by [`GenerationContext::into_dataset`];
/// pools and counters are never carried over to another run.
#[derive(Debug)]
pub struct GenerationContext {
    pub(crate) rng: RandomSequence,
    pub(crate) catalog: AttributeCatalog,
    pub(crate) constants: ConstantPool,
    pub(crate) predicates: PredicatePool,
    pub(crate) campaigns: Vec<Campaign>,
    pub(crate) conjuncts: Vec<Conjunct>,
    pub(crate) links: Vec<ConjunctPredicate>,
    pub(crate) conjunct_counter: u32,
    pub(crate) max_conjuncts: NonZeroU32,
    pub(crate) max_predicates: NonZeroU32,
    pub(crate) collapsed_links: u64,
    pub(crate) issues: Vec<GenerationIssue>,
}

impl GenerationContext {
    /// Seed the random sequence and build the attribute catalog.
    pub fn new(plan: &WorkloadPlan) -> Result<Self, GenerationError> {
        let max_conjuncts = NonZeroU32::new(plan.limits.max_conjuncts_per_campaign)
            .ok_or_else(|| {
                GenerationError::InvalidPlan(
                    "max_conjuncts_per_campaign must be at least 1".to_string(),
                )
            })?;
        let max_predicates = NonZeroU32::new(plan.limits.max_predicates_per_conjunct)
            .ok_or_else(|| {
                GenerationError::InvalidPlan(
                    "max_predicates_per_conjunct must be at least 1".to_string(),
                )
            })?;

        Ok(Self {
            rng: RandomSequence::new(plan.seed),
            catalog: AttributeCatalog::build(plan)?,
            constants: ConstantPool::new(),
            predicates: PredicatePool::new(),
            campaigns: Vec::new(),
            conjuncts: Vec::new(),
            links: Vec::new(),
            conjunct_counter: 0,
            max_conjuncts,
            max_predicates,
            collapsed_links: 0,
            issues: Vec::new(),
        })
    }

    pub fn catalog(&self) -> &AttributeCatalog {
        &self.catalog
    }

    pub fn constants(&self) -> &ConstantPool {
        &self.constants
    }

    pub fn predicates(&self) -> &PredicatePool {
        &self.predicates
    }

    pub fn campaigns(&self) -> &[Campaign] {
        &self.campaigns
    }

    pub fn conjuncts(&self) -> &[Conjunct] {
        &self.conjuncts
    }

    pub fn links(&self) -> &[ConjunctPredicate] {
        &self.links
    }

    /// Values drawn from the random sequence so far.
    pub fn random_draws(&self) -> u64 {
        self.rng.draws()
    }

    /// Predicates drawn twice into the same conjunct and linked once.
    pub fn collapsed_links(&self) -> u64 {
        self.collapsed_links
    }

    pub fn issues(&self) -> &[GenerationIssue] {
        &self.issues
    }

    pub fn into_dataset(self) -> Dataset {
        let (metrics, wt_attributes) = self.catalog.into_parts();
        Dataset {
            metrics,
            wt_attributes,
            constants: self.constants.into_rows(),
            predicates: self.predicates.into_rows(),
            campaigns: self.campaigns,
            conjuncts: self.conjuncts,
            conjunct_predicates: self.links,
        }
    }
}
