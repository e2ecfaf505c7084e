//! Final ranking of filtered candidates.

use serde::{Deserialize, Serialize};
use sources::Candidate;
use std::collections::HashSet;

/// A recommended genre with its score, as returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredGenre {
    pub genre: String,
    pub score: u32,
}

impl From<Candidate> for ScoredGenre {
    fn from(candidate: Candidate) -> Self {
        Self {
            genre: candidate.genre,
            score: candidate.score,
        }
    }
}

/// Deduplicate by genre, rank (score desc, name asc) and keep the top `limit`.
///
/// When a genre appears more than once the highest score wins.
pub fn rank_candidates(candidates: Vec<Candidate>, limit: usize) -> Vec<ScoredGenre> {
    let mut candidates = candidates;
    candidates.sort_by(Candidate::ranking_order);

    let mut seen: HashSet<String> = HashSet::new();
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.genre.clone()))
        .take(limit)
        .map(ScoredGenre::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sources::CandidateSource;

    fn candidate(genre: &str, score: u32) -> Candidate {
        Candidate::new(genre, CandidateSource::Traversal, score)
    }

    #[test]
    fn test_rank_sorts_by_score_then_name() {
        let ranked = rank_candidates(
            vec![candidate("jazz", 1), candidate("pop", 4), candidate("blues", 1)],
            10,
        );
        let genres: Vec<&str> = ranked.iter().map(|g| g.genre.as_str()).collect();
        assert_eq!(genres, vec!["pop", "blues", "jazz"]);
    }

    #[test]
    fn test_rank_truncates_to_limit() {
        let candidates = (0..8).map(|i| candidate(&format!("g{i}"), i)).collect();
        let ranked = rank_candidates(candidates, 5);

        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0], ScoredGenre { genre: "g7".into(), score: 7 });
    }

    #[test]
    fn test_rank_keeps_best_duplicate() {
        let ranked = rank_candidates(vec![candidate("jazz", 1), candidate("jazz", 3)], 5);
        assert_eq!(ranked, vec![ScoredGenre { genre: "jazz".into(), score: 3 }]);
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank_candidates(Vec::new(), 5).is_empty());
    }
}
