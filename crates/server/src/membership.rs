//! Membership Engine - adds and removes users from the preference graph.
//!
//! Validation happens here, before anything is sent to the store, so an
//! `InvalidInput` never leaves a partial write behind. Duplicate detection
//! is left to the store's atomic create, which rejects an existing name
//! without writing.

use graph_store::{GraphStore, UserRecord};
use tracing::{info, instrument};

use crate::error::{Result, ServiceError};

#[derive(Debug, Clone, Default)]
pub struct MembershipEngine {
    normalize_genres: bool,
}

impl MembershipEngine {
    pub fn new(normalize_genres: bool) -> Self {
        Self { normalize_genres }
    }

    /// Check a new user's input and return the genre list to store.
    ///
    /// The returned list is deduplicated, keeping first-seen order.
    pub fn prepare_genres(&self, name: &str, genres: &[String]) -> Result<Vec<String>> {
        if name.trim().is_empty() {
            return Err(ServiceError::InvalidInput("user name is required".to_string()));
        }
        if genres.is_empty() {
            return Err(ServiceError::InvalidInput(
                "at least one genre is required".to_string(),
            ));
        }

        let mut prepared: Vec<String> = Vec::with_capacity(genres.len());
        for genre in genres {
            let genre = self.normalize(genre);
            if genre.trim().is_empty() {
                return Err(ServiceError::InvalidInput(
                    "genre names must not be empty".to_string(),
                ));
            }
            if !prepared.contains(&genre) {
                prepared.push(genre);
            }
        }
        Ok(prepared)
    }

    /// Apply the configured genre normalisation (trim + lower-case when on).
    pub fn normalize(&self, genre: &str) -> String {
        if self.normalize_genres {
            genre.trim().to_lowercase()
        } else {
            genre.to_string()
        }
    }

    /// Create a user with its LIKES edges.
    #[instrument(skip(self, store, genres), fields(genre_count = genres.len()))]
    pub fn add_user(&self, store: &dyn GraphStore, name: &str, genres: &[String]) -> Result<UserRecord> {
        let genres = self.prepare_genres(name, genres)?;
        let record = store.create_user(name, &genres)?;
        info!("Added user '{}' liking {:?}", record.name, record.genres);
        Ok(record)
    }

    /// Detach-delete a user and echo back what it liked.
    #[instrument(skip(self, store))]
    pub fn remove_user(&self, store: &dyn GraphStore, name: &str) -> Result<UserRecord> {
        let mut record = store.delete_user(name)?;
        record.genres.retain(|genre| !genre.is_empty());
        info!("Removed user '{}' (liked {:?})", record.name, record.genres);
        Ok(record)
    }

    /// All users with their genres, ordered by name.
    pub fn list_users(&self, store: &dyn GraphStore) -> Result<Vec<UserRecord>> {
        Ok(store.list_users()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph_store::InMemoryStore;

    fn genres(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_add_user_deduplicates() {
        let store = InMemoryStore::new();
        let engine = MembershipEngine::default();

        let record = engine
            .add_user(&store, "ana", &genres(&["rock", "pop", "rock"]))
            .unwrap();
        assert_eq!(record.genres, vec!["rock", "pop"]);
    }

    #[test]
    fn test_invalid_input_writes_nothing() {
        let store = InMemoryStore::new();
        let engine = MembershipEngine::default();

        for (name, liked) in [("", vec!["rock"]), ("ana", vec![]), ("ana", vec!["rock", " "])] {
            let err = engine.add_user(&store, name, &genres(&liked)).unwrap_err();
            assert!(matches!(err, ServiceError::InvalidInput(_)));
        }
        assert!(store.list_users().unwrap().is_empty());
        assert!(store.list_genres().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_user_is_conflict() {
        let store = InMemoryStore::new();
        let engine = MembershipEngine::default();
        engine.add_user(&store, "ana", &genres(&["rock"])).unwrap();

        let err = engine.add_user(&store, "ana", &genres(&["jazz"])).unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(name) if name == "ana"));
        assert_eq!(store.list_genres().unwrap().len(), 1);
    }

    #[test]
    fn test_genre_names_kept_verbatim_by_default() {
        let engine = MembershipEngine::default();
        let prepared = engine.prepare_genres("ana", &genres(&["Rock", "rock"])).unwrap();
        assert_eq!(prepared, vec!["Rock", "rock"]);
    }

    #[test]
    fn test_normalized_genres() {
        let engine = MembershipEngine::new(true);
        let prepared = engine
            .prepare_genres("ana", &genres(&[" Rock ", "rock", "Hip Hop"]))
            .unwrap();
        assert_eq!(prepared, vec!["rock", "hip hop"]);
    }

    #[test]
    fn test_remove_user() {
        let store = InMemoryStore::new();
        let engine = MembershipEngine::default();
        engine.add_user(&store, "ana", &genres(&["rock", "pop"])).unwrap();

        let removed = engine.remove_user(&store, "ana").unwrap();
        assert_eq!(removed.genres, vec!["rock", "pop"]);
        assert!(engine.list_users(&store).unwrap().is_empty());

        let err = engine.remove_user(&store, "ana").unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
