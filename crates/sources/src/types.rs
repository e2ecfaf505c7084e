//! Shared types for candidate generation.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Which strategy produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateSource {
    /// Live traversal through users that share a genre with the target
    Traversal,
    /// Precomputed SIMILAR edge weights
    SimilarEdges,
}

/// Extra detail about how a candidate was found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateMetadata {
    /// Distinct similar users that like the genre (traversal only)
    pub similar_users_count: Option<u32>,
    /// Target genres the candidate is SIMILAR to (similar-edges only)
    pub via_genres: Vec<String>,
}

/// A genre that could be recommended, with its co-occurrence score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub genre: String,
    pub source: CandidateSource,
    pub score: u32,
    pub metadata: CandidateMetadata,
}

impl Candidate {
    pub fn new(genre: impl Into<String>, source: CandidateSource, score: u32) -> Self {
        Self {
            genre: genre.into(),
            source,
            score,
            metadata: CandidateMetadata::default(),
        }
    }

    /// Ranking order: higher score first, then genre name ascending.
    ///
    /// Total over distinct genres, so a fixed graph always ranks the same way.
    pub fn ranking_order(a: &Candidate, b: &Candidate) -> Ordering {
        b.score.cmp(&a.score).then_with(|| a.genre.cmp(&b.genre))
    }
}

/// Everything candidate generation needs to know about the target user.
#[derive(Debug, Clone, Default)]
pub struct UserContext {
    pub user_name: String,
    /// Liked genres in the order the store returned them
    pub liked_genres: Vec<String>,
    liked: HashSet<String>,
}

impl UserContext {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            ..Self::default()
        }
    }

    pub fn with_genres(mut self, genres: impl IntoIterator<Item = String>) -> Self {
        for genre in genres {
            self.add_genre(genre);
        }
        self
    }

    pub fn add_genre(&mut self, genre: String) {
        if self.liked.insert(genre.clone()) {
            self.liked_genres.push(genre);
        }
    }

    pub fn likes(&self, genre: &str) -> bool {
        self.liked.contains(genre)
    }

    pub fn has_genres(&self) -> bool {
        !self.liked_genres.is_empty()
    }
}
