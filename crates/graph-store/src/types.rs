//! Core domain types for the preference graph.
//!
//! The graph is bipartite: User nodes point at Genre nodes through LIKES
//! edges. SIMILAR edges between genres are a derived aggregate and are only
//! ever written wholesale through [`PreferenceGraph::set_similar_edges`].

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

// =============================================================================
// Identifiers
// =============================================================================

/// Internal identity of a genre, assigned in creation order.
///
/// Also the canonical ordering for SIMILAR pairs: an edge is always stored
/// with `source < target`.
pub type GenreId = u32;

// =============================================================================
// Nodes
// =============================================================================

/// A genre node. Created on first like, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

/// A user node together with its outgoing LIKES edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub name: String,
    /// Liked genres in first-encountered order, no duplicates
    pub likes: Vec<GenreId>,
}

/// Plain-data view of a user: the name and the names of the liked genres.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub name: String,
    pub genres: Vec<String>,
}

impl UserRecord {
    pub fn new(name: impl Into<String>, genres: Vec<String>) -> Self {
        Self {
            name: name.into(),
            genres,
        }
    }
}

// =============================================================================
// SIMILAR edges
// =============================================================================

/// Undirected, weighted genre-to-genre edge.
///
/// `weight` is the number of users that like both endpoints at the time of
/// the last rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimilarEdge {
    pub source: GenreId,
    pub target: GenreId,
    pub weight: u32,
}

impl SimilarEdge {
    /// Build an edge with its endpoints in canonical (`source < target`) order.
    pub fn new(a: GenreId, b: GenreId, weight: u32) -> Self {
        let (source, target) = if a <= b { (a, b) } else { (b, a) };
        Self {
            source,
            target,
            weight,
        }
    }

    /// The endpoint opposite to `genre`, if `genre` is one of the two.
    pub fn other(&self, genre: GenreId) -> Option<GenreId> {
        if self.source == genre {
            Some(self.target)
        } else if self.target == genre {
            Some(self.source)
        } else {
            None
        }
    }
}

/// SIMILAR edge resolved to genre names, for callers outside the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenrePair {
    pub first: String,
    pub second: String,
    pub weight: u32,
}

// =============================================================================
// PreferenceGraph - the in-memory graph
// =============================================================================

/// All nodes and edges of the preference graph plus its secondary index.
///
/// Users live in a `BTreeMap` so listing them is already ordered by name.
/// `liked_by` is the reverse LIKES index (genre -> user names) used by the
/// similar-user traversal.
#[derive(Debug, Default)]
pub struct PreferenceGraph {
    pub(crate) users: BTreeMap<String, User>,
    pub(crate) genres: Vec<Genre>,
    pub(crate) genre_ids: HashMap<String, GenreId>,
    pub(crate) liked_by: HashMap<GenreId, BTreeSet<String>>,
    pub(crate) similar: BTreeMap<(GenreId, GenreId), u32>,
}

impl PreferenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_user(&self, name: &str) -> Option<&User> {
        self.users.get(name)
    }

    pub fn contains_user(&self, name: &str) -> bool {
        self.users.contains_key(name)
    }

    pub fn get_genre(&self, id: GenreId) -> Option<&Genre> {
        self.genres.get(id as usize)
    }

    pub fn genre_id(&self, name: &str) -> Option<GenreId> {
        self.genre_ids.get(name).copied()
    }

    /// Names of the users that like `genre`, ascending.
    pub fn users_liking(&self, genre: GenreId) -> impl Iterator<Item = &str> {
        self.liked_by
            .get(&genre)
            .into_iter()
            .flat_map(|names| names.iter().map(String::as_str))
    }

    /// Resolve a user to its plain-data record.
    pub fn user_record(&self, name: &str) -> Option<UserRecord> {
        self.users.get(name).map(|user| self.record_for(user))
    }

    pub(crate) fn record_for(&self, user: &User) -> UserRecord {
        let genres = user
            .likes
            .iter()
            .filter_map(|&id| self.get_genre(id))
            .map(|genre| genre.name.clone())
            .collect();
        UserRecord::new(user.name.clone(), genres)
    }

    /// All users ordered by name.
    pub fn records(&self) -> Vec<UserRecord> {
        self.users.values().map(|user| self.record_for(user)).collect()
    }

    /// All genres ordered by name, orphans included.
    pub fn sorted_genres(&self) -> Vec<&Genre> {
        let mut genres: Vec<&Genre> = self.genres.iter().collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        genres
    }

    // Mutators

    /// Get-or-create a genre node by name.
    pub fn upsert_genre(&mut self, name: &str) -> Result<GenreId> {
        if name.is_empty() {
            return Err(StoreError::InvalidValue {
                field: "genre".to_string(),
                value: name.to_string(),
            });
        }
        if let Some(id) = self.genre_ids.get(name) {
            return Ok(*id);
        }
        let id = self.genres.len() as GenreId;
        self.genres.push(Genre {
            id,
            name: name.to_string(),
        });
        self.genre_ids.insert(name.to_string(), id);
        Ok(id)
    }

    /// Create a user and one LIKES edge per distinct genre.
    ///
    /// Fails with `UserExists` before touching anything when the name is
    /// taken, and with `InvalidValue` when a name is empty. Duplicate genre
    /// names collapse to a single edge.
    pub fn insert_user<S: AsRef<str>>(&mut self, name: &str, genres: &[S]) -> Result<UserRecord> {
        if name.is_empty() {
            return Err(StoreError::InvalidValue {
                field: "name".to_string(),
                value: name.to_string(),
            });
        }
        if self.contains_user(name) {
            return Err(StoreError::UserExists {
                name: name.to_string(),
            });
        }
        if let Some(empty) = genres.iter().find(|g| g.as_ref().is_empty()) {
            return Err(StoreError::InvalidValue {
                field: "genre".to_string(),
                value: empty.as_ref().to_string(),
            });
        }

        let mut likes: Vec<GenreId> = Vec::with_capacity(genres.len());
        for genre in genres {
            let id = self.upsert_genre(genre.as_ref())?;
            if !likes.contains(&id) {
                likes.push(id);
            }
        }
        for &id in &likes {
            self.liked_by
                .entry(id)
                .or_default()
                .insert(name.to_string());
        }

        let user = User {
            name: name.to_string(),
            likes,
        };
        let record = self.record_for(&user);
        self.users.insert(name.to_string(), user);
        Ok(record)
    }

    /// Detach-delete a user, returning what it liked just before removal.
    ///
    /// Genre nodes survive even when they end up orphaned.
    pub fn remove_user(&mut self, name: &str) -> Result<UserRecord> {
        let user = self.users.remove(name).ok_or_else(|| StoreError::UserNotFound {
            name: name.to_string(),
        })?;
        for id in &user.likes {
            if let Some(names) = self.liked_by.get_mut(id) {
                names.remove(name);
                if names.is_empty() {
                    self.liked_by.remove(id);
                }
            }
        }
        Ok(self.record_for(&user))
    }

    /// Replace every SIMILAR edge with `edges`.
    ///
    /// The new set is checked in full before the old one is dropped, so a
    /// rejected rebuild leaves the previous edges in place.
    pub fn set_similar_edges(&mut self, edges: impl IntoIterator<Item = SimilarEdge>) -> Result<()> {
        let mut rebuilt = BTreeMap::new();
        for edge in edges {
            let edge = SimilarEdge::new(edge.source, edge.target, edge.weight);
            if edge.source == edge.target {
                return Err(StoreError::InvalidValue {
                    field: "similar".to_string(),
                    value: format!("self-loop on genre {}", edge.source),
                });
            }
            if edge.weight == 0 {
                return Err(StoreError::InvalidValue {
                    field: "weight".to_string(),
                    value: format!("0 for ({}, {})", edge.source, edge.target),
                });
            }
            if self.get_genre(edge.target).is_none() {
                return Err(StoreError::InvalidValue {
                    field: "similar".to_string(),
                    value: format!("unknown genre {}", edge.target),
                });
            }
            rebuilt.insert((edge.source, edge.target), edge.weight);
        }
        self.similar = rebuilt;
        Ok(())
    }

    pub fn similar_edges(&self) -> Vec<SimilarEdge> {
        self.similar
            .iter()
            .map(|(&(source, target), &weight)| SimilarEdge {
                source,
                target,
                weight,
            })
            .collect()
    }

    /// Weight of the SIMILAR edge between two genres, 0 when there is none.
    #[cfg(test)]
    pub(crate) fn similar_weight(&self, a: GenreId, b: GenreId) -> u32 {
        let edge = SimilarEdge::new(a, b, 0);
        self.similar
            .get(&(edge.source, edge.target))
            .copied()
            .unwrap_or(0)
    }

    /// Every `(neighbour, weight)` reachable from `genre` over one SIMILAR edge.
    pub fn similar_neighbours(&self, genre: GenreId) -> Vec<(GenreId, u32)> {
        self.similar
            .iter()
            .filter_map(|(&(source, target), &weight)| {
                SimilarEdge {
                    source,
                    target,
                    weight,
                }
                .other(genre)
                .map(|other| (other, weight))
            })
            .collect()
    }

    /// (users, genres, likes, similar edges), for logging and tests
    pub fn counts(&self) -> (usize, usize, usize, usize) {
        let likes = self.users.values().map(|u| u.likes.len()).sum();
        (self.users.len(), self.genres.len(), likes, self.similar.len())
    }
}
