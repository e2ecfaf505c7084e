//! The store surface the core talks to.
//!
//! [`GraphStore`] is the declarative collaborator: match users and genres,
//! upsert, detach-delete, group LIKES per user, and read or replace SIMILAR
//! edges. Each call is one consistent unit; nothing is shared between calls.
//!
//! [`InMemoryStore`] is the default implementation, a [`PreferenceGraph`]
//! behind a read/write lock.

use crate::error::{Result, StoreError};
use crate::types::*;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Operations the recommendation core needs from a graph store.
///
/// `Send + Sync` so a store can be shared between request handlers and
/// moved onto blocking worker threads.
pub trait GraphStore: Send + Sync {
    /// Cheap connectivity check.
    fn ping(&self) -> Result<()>;

    /// Create a user and its LIKES edges, upserting genres.
    ///
    /// Uniqueness of the user name is enforced here, atomically with the
    /// insert: `UserExists` means nothing was written.
    fn create_user(&self, name: &str, genres: &[String]) -> Result<UserRecord>;

    /// Match a user by name.
    fn get_user(&self, name: &str) -> Result<Option<UserRecord>>;

    /// Detach-delete a user, returning the record as it was just before.
    fn delete_user(&self, name: &str) -> Result<UserRecord>;

    /// All users with their genres, ordered by name.
    fn list_users(&self) -> Result<Vec<UserRecord>>;

    /// All genre nodes ordered by name, including orphans.
    fn list_genres(&self) -> Result<Vec<Genre>>;

    /// Every user other than `excluding` that likes at least one of `genres`.
    fn users_sharing_genres(&self, genres: &[String], excluding: &str) -> Result<Vec<UserRecord>>;

    /// The set of liked genre ids of every user that likes anything.
    fn genre_sets(&self) -> Result<Vec<Vec<GenreId>>>;

    /// Delete all SIMILAR edges and write `edges` in their place.
    fn replace_similar_edges(&self, edges: Vec<SimilarEdge>) -> Result<()>;

    /// All SIMILAR edges in canonical order.
    fn similar_edges(&self) -> Result<Vec<SimilarEdge>>;

    /// All SIMILAR edges resolved to genre names, heaviest first.
    fn similar_pairs(&self) -> Result<Vec<GenrePair>>;

    /// `(genre name, weight)` for each SIMILAR neighbour of `genre`.
    fn similar_to(&self, genre: &str) -> Result<Vec<(String, u32)>>;

    /// Release the store. Later calls fail with `Closed`.
    fn close(&self) -> Result<()>;
}

/// Thread-safe, in-memory graph store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    graph: RwLock<PreferenceGraph>,
    closed: AtomicBool,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing graph.
    pub fn from_graph(graph: PreferenceGraph) -> Self {
        Self {
            graph: RwLock::new(graph),
            closed: AtomicBool::new(false),
        }
    }

    /// Open a store pre-populated from a seed file.
    pub fn open_seeded(path: &Path) -> Result<Self> {
        let graph = PreferenceGraph::load_from_file(path)?;
        Ok(Self::from_graph(graph))
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

impl GraphStore for InMemoryStore {
    fn ping(&self) -> Result<()> {
        self.ensure_open()
    }

    fn create_user(&self, name: &str, genres: &[String]) -> Result<UserRecord> {
        self.ensure_open()?;
        let record = self.graph.write().insert_user(name, genres)?;
        debug!("Created user '{}' with {} genres", record.name, record.genres.len());
        Ok(record)
    }

    fn get_user(&self, name: &str) -> Result<Option<UserRecord>> {
        self.ensure_open()?;
        Ok(self.graph.read().user_record(name))
    }

    fn delete_user(&self, name: &str) -> Result<UserRecord> {
        self.ensure_open()?;
        let record = self.graph.write().remove_user(name)?;
        debug!("Detach-deleted user '{}'", record.name);
        Ok(record)
    }

    fn list_users(&self) -> Result<Vec<UserRecord>> {
        self.ensure_open()?;
        Ok(self.graph.read().records())
    }

    fn list_genres(&self) -> Result<Vec<Genre>> {
        self.ensure_open()?;
        let graph = self.graph.read();
        Ok(graph.sorted_genres().into_iter().cloned().collect())
    }

    fn users_sharing_genres(&self, genres: &[String], excluding: &str) -> Result<Vec<UserRecord>> {
        self.ensure_open()?;
        let graph = self.graph.read();

        let mut names: HashSet<&str> = HashSet::new();
        for genre in genres {
            if let Some(id) = graph.genre_id(genre) {
                names.extend(graph.users_liking(id).filter(|&name| name != excluding));
            }
        }

        let mut names: Vec<&str> = names.into_iter().collect();
        names.sort_unstable();
        Ok(names
            .into_iter()
            .filter_map(|name| graph.user_record(name))
            .collect())
    }

    fn genre_sets(&self) -> Result<Vec<Vec<GenreId>>> {
        self.ensure_open()?;
        let graph = self.graph.read();
        Ok(graph
            .users
            .values()
            .filter(|user| !user.likes.is_empty())
            .map(|user| user.likes.clone())
            .collect())
    }

    fn replace_similar_edges(&self, edges: Vec<SimilarEdge>) -> Result<()> {
        self.ensure_open()?;
        let count = edges.len();
        self.graph.write().set_similar_edges(edges)?;
        debug!("Replaced SIMILAR edges ({} edges)", count);
        Ok(())
    }

    fn similar_edges(&self) -> Result<Vec<SimilarEdge>> {
        self.ensure_open()?;
        Ok(self.graph.read().similar_edges())
    }

    fn similar_pairs(&self) -> Result<Vec<GenrePair>> {
        self.ensure_open()?;
        let graph = self.graph.read();
        let mut pairs: Vec<GenrePair> = graph
            .similar_edges()
            .into_iter()
            .filter_map(|edge| {
                let first = graph.get_genre(edge.source)?;
                let second = graph.get_genre(edge.target)?;
                Some(GenrePair {
                    first: first.name.clone(),
                    second: second.name.clone(),
                    weight: edge.weight,
                })
            })
            .collect();
        pairs.sort_by(|a, b| {
            b.weight
                .cmp(&a.weight)
                .then_with(|| a.first.cmp(&b.first))
                .then_with(|| a.second.cmp(&b.second))
        });
        Ok(pairs)
    }

    fn similar_to(&self, genre: &str) -> Result<Vec<(String, u32)>> {
        self.ensure_open()?;
        let graph = self.graph.read();
        let Some(id) = graph.genre_id(genre) else {
            return Ok(Vec::new());
        };
        Ok(graph
            .similar_neighbours(id)
            .into_iter()
            .filter_map(|(other, weight)| {
                graph
                    .get_genre(other)
                    .map(|genre| (genre.name.clone(), weight))
            })
            .collect())
    }

    fn close(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!("In-memory graph store closed");
        }
        Ok(())
    }
}
