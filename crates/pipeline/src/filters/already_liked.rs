//! Filter to remove genres the target user already likes.
//!
//! Both candidate sources already skip liked genres; this filter is the
//! last guard before anything reaches the caller.

use crate::traits::Filter;
use anyhow::Result;
use sources::{Candidate, UserContext};

/// Removes candidates for genres in the user's liked set.
pub struct AlreadyLikedFilter;

impl Filter for AlreadyLikedFilter {
    fn name(&self) -> &'static str {
        "already_liked"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &UserContext,
    ) -> Result<Vec<Candidate>> {
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| !context.likes(&candidate.genre))
            .collect();
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sources::CandidateSource;

    #[test]
    fn test_already_liked_filter() {
        let context = UserContext::new("ana")
            .with_genres(vec!["rock".to_string(), "pop".to_string()]);

        let candidates = vec![
            Candidate::new("rock", CandidateSource::Traversal, 4),
            Candidate::new("jazz", CandidateSource::Traversal, 3),
            Candidate::new("pop", CandidateSource::SimilarEdges, 2),
            Candidate::new("blues", CandidateSource::SimilarEdges, 1),
        ];

        let filtered = AlreadyLikedFilter.apply(candidates, &context).unwrap();

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].genre, "jazz");
        assert_eq!(filtered[1].genre, "blues");
    }
}
