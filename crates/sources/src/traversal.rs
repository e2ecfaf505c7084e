//! Traversal Source - live co-occurrence through similar users
//!
//! "Users who like a genre you like also like these genres"
//!
//! ## Algorithm
//! 1. Take the target's liked genres `T`
//! 2. Find every other user that likes at least one genre in `T`
//!    (the "similar users")
//! 3. Collect the genres those users like that are not in `T`
//! 4. Score each genre: every similar user that likes it adds the number of
//!    genres it shares with the target, so a user overlapping on two genres
//!    counts twice
//! 5. Rank by score, genre name breaking ties
//!
//! Reads only LIKES edges, so it never depends on the SIMILAR aggregate
//! being fresh.

use crate::types::{Candidate, CandidateSource, UserContext};
use graph_store::{GraphStore, Result, UserRecord};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// A similar user and how many genres it shares with the target
#[derive(Debug, Clone)]
pub struct SimilarUser {
    pub record: UserRecord,
    pub shared_genres: u32,
}

/// Generates candidates by walking LIKES edges at request time
#[derive(Clone)]
pub struct TraversalSource {
    store: Arc<dyn GraphStore>,

    /// Minimum number of shared genres to consider a user similar
    min_shared_genres: u32,
}

impl TraversalSource {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            store,
            min_shared_genres: 1,
        }
    }

    /// Configure minimum shared genres to consider users similar (default: 1)
    pub fn with_min_shared_genres(mut self, min: u32) -> Self {
        self.min_shared_genres = min.max(1);
        self
    }

    /// Generate ranked candidates for the user in `user_context`.
    #[instrument(skip(self, user_context), fields(user = %user_context.user_name))]
    pub fn get_candidates(&self, user_context: &UserContext, limit: usize) -> Result<Vec<Candidate>> {
        if !user_context.has_genres() {
            debug!("Target likes no genres, skipping traversal");
            return Ok(Vec::new());
        }

        // Step 1: Find similar users
        let similar_users = self.find_similar_users(user_context)?;
        debug!("Found {} similar users", similar_users.len());

        // Step 2: Score the genres they like
        let scores = self.get_candidate_scores(&similar_users, user_context);

        // Step 3: Convert to candidates and rank
        let mut candidates: Vec<Candidate> = scores
            .into_iter()
            .map(|(genre, (score, users))| {
                let mut candidate = Candidate::new(genre, CandidateSource::Traversal, score);
                candidate.metadata.similar_users_count = Some(users);
                candidate
            })
            .collect();

        candidates.sort_by(Candidate::ranking_order);
        candidates.truncate(limit);

        debug!("Generated {} traversal candidates", candidates.len());
        Ok(candidates)
    }

    /// Users other than the target sharing at least `min_shared_genres` genres.
    pub fn find_similar_users(&self, user_context: &UserContext) -> Result<Vec<SimilarUser>> {
        let others = self
            .store
            .users_sharing_genres(&user_context.liked_genres, &user_context.user_name)?;

        Ok(others
            .into_iter()
            .filter_map(|record| {
                let shared_genres = record
                    .genres
                    .iter()
                    .filter(|genre| user_context.likes(genre))
                    .count() as u32;
                (shared_genres >= self.min_shared_genres).then_some(SimilarUser {
                    record,
                    shared_genres,
                })
            })
            .collect())
    }

    /// genre -> (score, distinct similar users liking it)
    fn get_candidate_scores(
        &self,
        similar_users: &[SimilarUser],
        user_context: &UserContext,
    ) -> HashMap<String, (u32, u32)> {
        similar_users
            .par_iter()
            .fold(
                HashMap::new,
                |mut local_scores: HashMap<String, (u32, u32)>, similar| {
                    for genre in &similar.record.genres {
                        if !user_context.likes(genre) {
                            let entry = local_scores.entry(genre.clone()).or_insert((0, 0));
                            entry.0 += similar.shared_genres;
                            entry.1 += 1;
                        }
                    }
                    local_scores
                },
            )
            .reduce(HashMap::new, |mut acc, local_scores| {
                for (genre, (score, users)) in local_scores {
                    let entry = acc.entry(genre).or_insert((0, 0));
                    entry.0 += score;
                    entry.1 += users;
                }
                acc
            })
    }
}
