//! Filter to drop weakly supported genres.

use crate::traits::Filter;
use anyhow::Result;
use sources::{Candidate, UserContext};

/// Keeps candidates whose co-occurrence score is at least `min_score`.
///
/// With `min_score` of 1 (the service default) nothing is removed, since
/// every candidate comes from at least one co-like.
pub struct MinimumScoreFilter {
    min_score: u32,
}

impl MinimumScoreFilter {
    pub fn new(min_score: u32) -> Self {
        Self { min_score }
    }
}

impl Filter for MinimumScoreFilter {
    fn name(&self) -> &'static str {
        "minimum_score"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        _context: &UserContext,
    ) -> Result<Vec<Candidate>> {
        Ok(candidates
            .into_iter()
            .filter(|candidate| candidate.score >= self.min_score)
            .collect())
    }
}
