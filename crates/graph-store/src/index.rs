//! Building a PreferenceGraph from seed data and checking its integrity.

use crate::error::{Result, StoreError};
use crate::parser;
use crate::types::*;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

impl PreferenceGraph {
    /// Load a graph from a seed file.
    ///
    /// SIMILAR edges are not part of the seed; they are derived later by a
    /// similarity rebuild.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading seed users from {:?}", path);
        let users = parser::parse_seed_users(path)?;
        let graph = Self::from_records(users)?;

        let (users, genres, likes, _) = graph.counts();
        info!("Loaded {} users, {} genres, {} likes", users, genres, likes);
        Ok(graph)
    }

    /// Build a graph by inserting each record in order.
    pub fn from_records(records: impl IntoIterator<Item = UserRecord>) -> Result<Self> {
        let mut graph = PreferenceGraph::new();
        for record in records {
            graph.insert_user(&record.name, &record.genres)?;
        }
        graph.validate()?;
        Ok(graph)
    }

    /// Validate graph integrity.
    ///
    /// Checks that:
    /// - every genre has a non-empty name and a consistent id
    /// - every LIKES edge points at an existing genre, at most once per user
    /// - the reverse index agrees with the user table
    /// - no SIMILAR edge is a self-loop or carries a zero weight
    pub fn validate(&self) -> Result<()> {
        for (idx, genre) in self.genres.iter().enumerate() {
            if genre.name.is_empty() {
                return Err(StoreError::Validation(format!("genre {} has an empty name", idx)));
            }
            if genre.id as usize != idx || self.genre_ids.get(&genre.name) != Some(&genre.id) {
                return Err(StoreError::Validation(format!(
                    "genre '{}' has an inconsistent id",
                    genre.name
                )));
            }
        }

        for (name, user) in &self.users {
            let mut seen = BTreeSet::new();
            for &genre in &user.likes {
                if self.get_genre(genre).is_none() {
                    return Err(StoreError::Validation(format!(
                        "user '{}' likes unknown genre {}",
                        name, genre
                    )));
                }
                if !seen.insert(genre) {
                    return Err(StoreError::Validation(format!(
                        "user '{}' likes genre {} twice",
                        name, genre
                    )));
                }
                let indexed = self
                    .liked_by
                    .get(&genre)
                    .is_some_and(|names| names.contains(name));
                if !indexed {
                    return Err(StoreError::Validation(format!(
                        "reverse index is missing '{}' -> {}",
                        name, genre
                    )));
                }
            }
        }

        let indexed_likes: usize = self.liked_by.values().map(BTreeSet::len).sum();
        let (_, _, likes, _) = self.counts();
        if indexed_likes != likes {
            return Err(StoreError::Validation(format!(
                "reverse index holds {} likes, user table holds {}",
                indexed_likes, likes
            )));
        }

        for (&(source, target), &weight) in &self.similar {
            if source >= target {
                return Err(StoreError::Validation(format!(
                    "similar edge ({}, {}) is not canonical",
                    source, target
                )));
            }
            if weight == 0 {
                return Err(StoreError::Validation(format!(
                    "similar edge ({}, {}) has zero weight",
                    source, target
                )));
            }
        }
        Ok(())
    }
}
