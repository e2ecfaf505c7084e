//! Service configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Hard cap on the size of a recommendation result
pub const MAX_RECOMMENDATIONS: usize = 5;

/// Which candidate source answers `recommend`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Live traversal over LIKES edges, conditioned on the target user
    #[default]
    Traversal,
    /// Precomputed SIMILAR weights (global similarity)
    SimilarEdges,
}

/// Tunables for [`GenreRecommender`](crate::GenreRecommender).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Number of recommended genres returned (at most 5)
    pub recommendation_limit: usize,
    /// Number of candidates pulled from a source before filtering
    pub candidate_pool: usize,
    /// Minimum co-occurrence score a recommendation needs
    pub min_score: u32,
    /// Upper bound on a single store call
    pub store_timeout: Duration,
    pub strategy: Strategy,
    /// Trim and lower-case genre names before they reach the store
    pub normalize_genres: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            recommendation_limit: MAX_RECOMMENDATIONS,
            candidate_pool: 50,
            min_score: 1,
            store_timeout: Duration::from_secs(5),
            strategy: Strategy::Traversal,
            normalize_genres: false,
        }
    }
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the result size, clamped to `1..=MAX_RECOMMENDATIONS` (default: 5)
    pub fn with_recommendation_limit(mut self, limit: usize) -> Self {
        self.recommendation_limit = limit.clamp(1, MAX_RECOMMENDATIONS);
        self
    }

    /// Configure the candidate pool size (default: 50)
    pub fn with_candidate_pool(mut self, pool: usize) -> Self {
        self.candidate_pool = pool.max(MAX_RECOMMENDATIONS);
        self
    }

    /// Configure the minimum recommendation score (default: 1)
    pub fn with_min_score(mut self, score: u32) -> Self {
        self.min_score = score.max(1);
        self
    }

    /// Configure the per-call store timeout (default: 5s)
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_normalize_genres(mut self, normalize: bool) -> Self {
        self.normalize_genres = normalize;
        self
    }
}
