//! Ordered chain of candidate filters.
//!
//! The recommender builds one pipeline at startup and shares it across
//! requests; stages are fixed once built.

use crate::traits::Filter;
use anyhow::{Context, Result};
use sources::{Candidate, UserContext};
use tracing::debug;

/// Filters applied one after another to a candidate list.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(AlreadyLikedFilter)
///     .add_filter(MinimumScoreFilter::new(2));
/// let kept = pipeline.apply(candidates, &context)?;
/// ```
#[derive(Default)]
pub struct FilterPipeline {
    stages: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage. Stages run in the order they were added.
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.stages.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names in application order.
    pub fn filter_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Run every stage in order.
    ///
    /// ## Algorithm
    /// 1. Hand the full candidate list to the first stage
    /// 2. Feed each stage's survivors to the next one, logging kept/total
    /// 3. Stop at the first stage that errors, naming it and the user
    ///
    /// # Arguments
    /// * `candidates` - Output of a candidate source
    /// * `context` - The target user's liked genres
    ///
    /// # Returns
    /// * `Ok(Vec<Candidate>)` - What survived every stage, still unranked
    /// * `Err` - The first stage failure, with the stage name as context
    pub fn apply(&self, candidates: Vec<Candidate>, context: &UserContext) -> Result<Vec<Candidate>> {
        self.stages.iter().try_fold(candidates, |remaining, stage| {
            let before = remaining.len();
            let kept = stage
                .apply(remaining, context)
                .with_context(|| format!("filter '{}' failed for '{}'", stage.name(), context.user_name))?;
            debug!("{}: kept {} of {} candidates", stage.name(), kept.len(), before);
            Ok(kept)
        })
    }
}
