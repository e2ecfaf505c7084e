//! Similar-Edge Source - reads the precomputed SIMILAR graph
//!
//! Scores each genre outside the target's set by summing the SIMILAR
//! weights that connect it to the target's genres.
//!
//! ## Difference from the traversal source
//! SIMILAR weights count co-likes over *all* users, including users that
//! share nothing with the target, and are only as fresh as the last
//! rebuild. Rankings therefore reflect global genre similarity rather than
//! the target's own neighbourhood, and can differ from the traversal
//! source when users have overlapping but disjoint genre sets.

use crate::types::{Candidate, CandidateSource, UserContext};
use graph_store::{GraphStore, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Generates candidates from SIMILAR edge weights
#[derive(Clone)]
pub struct SimilarEdgeSource {
    store: Arc<dyn GraphStore>,

    /// Edges lighter than this are ignored
    min_edge_weight: u32,
}

impl SimilarEdgeSource {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            store,
            min_edge_weight: 1,
        }
    }

    /// Configure the minimum SIMILAR weight to follow (default: 1)
    pub fn with_min_edge_weight(mut self, weight: u32) -> Self {
        self.min_edge_weight = weight.max(1);
        self
    }

    /// Generate ranked candidates for the user in `user_context`.
    #[instrument(skip(self, user_context), fields(user = %user_context.user_name))]
    pub fn get_candidates(&self, user_context: &UserContext, limit: usize) -> Result<Vec<Candidate>> {
        let mut all_candidates: HashMap<String, Candidate> = HashMap::new();

        for genre in &user_context.liked_genres {
            for (other, weight) in self.store.similar_to(genre)? {
                if weight < self.min_edge_weight || user_context.likes(&other) {
                    continue;
                }
                let candidate = all_candidates
                    .entry(other.clone())
                    .or_insert_with(|| Candidate::new(other, CandidateSource::SimilarEdges, 0));
                candidate.score += weight;
                candidate.metadata.via_genres.push(genre.clone());
            }
        }

        let mut candidates: Vec<Candidate> = all_candidates.into_values().collect();
        candidates.sort_by(Candidate::ranking_order);
        candidates.truncate(limit);

        debug!("Generated {} similar-edge candidates", candidates.len());
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user_context::build_user_context;
    use graph_store::{InMemoryStore, SimilarEdge};

    fn genres(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    // rock=0 pop=1 jazz=2 blues=3
    fn create_test_store() -> Arc<InMemoryStore> {
        let store = InMemoryStore::new();
        store.create_user("ana", &genres(&["rock", "pop"])).unwrap();
        store.create_user("ben", &genres(&["rock", "jazz"])).unwrap();
        store.create_user("cid", &genres(&["rock", "blues", "jazz"])).unwrap();
        store
            .replace_similar_edges(vec![
                SimilarEdge::new(0, 1, 1),
                SimilarEdge::new(0, 2, 2),
                SimilarEdge::new(0, 3, 1),
                SimilarEdge::new(2, 3, 1),
            ])
            .unwrap();
        Arc::new(store)
    }

    #[test]
    fn test_get_candidates_sums_weights() {
        let store = create_test_store();
        let source = SimilarEdgeSource::new(store.clone());
        let context = build_user_context(&*store, "ana").unwrap();

        let candidates = source.get_candidates(&context, 10).unwrap();
        let ranked: Vec<(&str, u32)> = candidates
            .iter()
            .map(|c| (c.genre.as_str(), c.score))
            .collect();

        assert_eq!(ranked, vec![("jazz", 2), ("blues", 1)]);
        assert_eq!(candidates[0].metadata.via_genres, vec!["rock"]);
        assert!(candidates.iter().all(|c| c.source == CandidateSource::SimilarEdges));
    }

    #[test]
    fn test_weights_add_up_across_target_genres() {
        let store = create_test_store();
        let source = SimilarEdgeSource::new(store.clone());
        let context = build_user_context(&*store, "ben").unwrap();

        // blues is SIMILAR to both rock (1) and jazz (1)
        let candidates = source.get_candidates(&context, 10).unwrap();
        assert_eq!(candidates[0].genre, "blues");
        assert_eq!(candidates[0].score, 2);
        assert_eq!(candidates[1].genre, "pop");
    }

    #[test]
    fn test_min_edge_weight() {
        let store = create_test_store();
        let source = SimilarEdgeSource::new(store.clone()).with_min_edge_weight(2);
        let context = build_user_context(&*store, "ana").unwrap();

        let candidates = source.get_candidates(&context, 10).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].genre, "jazz");
    }

    #[test]
    fn test_no_edges_no_candidates() {
        let store = Arc::new(InMemoryStore::new());
        store.create_user("ana", &genres(&["rock"])).unwrap();
        let source = SimilarEdgeSource::new(store.clone());
        let context = build_user_context(&*store, "ana").unwrap();

        assert!(source.get_candidates(&context, 10).unwrap().is_empty());
    }
}
