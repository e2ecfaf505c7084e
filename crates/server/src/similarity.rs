//! Similarity Recomputation Engine - rebuilds SIMILAR edges from LIKES.
//!
//! A full rebuild rather than an incremental update: group LIKES by user,
//! emit every unordered pair of genres each user likes, and count pairs
//! across users. Pairs are keyed in canonical `GenreId` order so (a, b) and
//! (b, a) land on the same edge.

use std::collections::HashMap;
use std::time::Instant;

use graph_store::{GenreId, GraphStore, Result, SimilarEdge};
use rayon::prelude::*;
use tracing::{debug, info, instrument};

pub struct SimilarityEngine;

impl SimilarityEngine {
    /// Count, for every pair of distinct genres, the users that like both.
    ///
    /// Only pairs with a count of at least 1 are returned, ordered by
    /// `(source, target)`.
    pub fn compute_weights(genre_sets: &[Vec<GenreId>]) -> Vec<SimilarEdge> {
        let weights: HashMap<(GenreId, GenreId), u32> = genre_sets
            .par_iter()
            .fold(HashMap::new, |mut local_weights, likes| {
                let mut likes = likes.clone();
                likes.sort_unstable();
                likes.dedup();
                for (i, &a) in likes.iter().enumerate() {
                    for &b in &likes[i + 1..] {
                        *local_weights.entry((a, b)).or_insert(0) += 1;
                    }
                }
                local_weights
            })
            .reduce(HashMap::new, |mut acc, local_weights| {
                for (pair, count) in local_weights {
                    *acc.entry(pair).or_insert(0) += count;
                }
                acc
            });

        let mut edges: Vec<SimilarEdge> = weights
            .into_iter()
            .map(|((a, b), weight)| SimilarEdge::new(a, b, weight))
            .collect();
        edges.sort_unstable_by_key(|edge| (edge.source, edge.target));
        edges
    }

    /// Rebuild every SIMILAR edge in `store` from its current LIKES edges.
    ///
    /// When the computed edges equal the stored ones nothing is written.
    ///
    /// # Returns
    /// The number of SIMILAR edges in the store afterwards.
    #[instrument(skip(store))]
    pub fn recompute(store: &dyn GraphStore) -> Result<usize> {
        let start = Instant::now();
        let genre_sets = store.genre_sets()?;
        let edges = Self::compute_weights(&genre_sets);
        let count = edges.len();

        if store.similar_edges()? == edges {
            debug!("SIMILAR edges unchanged ({} edges), skipping write", count);
            return Ok(count);
        }
        store.replace_similar_edges(edges)?;
        info!(
            "Rebuilt {} SIMILAR edges from {} users in {:.2?}",
            count,
            genre_sets.len(),
            start.elapsed()
        );
        Ok(count)
    }
}
