//! # Sources Crate
//!
//! Candidate generation for genre recommendations.
//!
//! ## Components
//!
//! ### Traversal Source (primary)
//! Live co-occurrence over LIKES edges:
//! - "Users who like a genre you like also like..."
//! - Conditioned on the target's own neighbourhood
//!
//! ### Similar-Edge Source (alternative)
//! Reads precomputed SIMILAR weights between the target's genres and
//! everything else. Global similarity, only as fresh as the last rebuild.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{TraversalSource, user_context::build_user_context};
//! use graph_store::{GraphStore, InMemoryStore};
//! use std::sync::Arc;
//!
//! let store: Arc<dyn GraphStore> = Arc::new(InMemoryStore::new());
//! let context = build_user_context(store.as_ref(), "ana")?;
//! let candidates = TraversalSource::new(store.clone()).get_candidates(&context, 5)?;
//! ```

// Public modules
pub mod types;
pub mod user_context;
pub mod traversal;
pub mod similar_edges;

// Re-export commonly used types
pub use types::{Candidate, CandidateMetadata, CandidateSource, UserContext};
pub use traversal::{SimilarUser, TraversalSource};
pub use similar_edges::SimilarEdgeSource;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_creation() {
        let candidate = Candidate::new("jazz", CandidateSource::Traversal, 3);
        assert_eq!(candidate.genre, "jazz");
        assert_eq!(candidate.source, CandidateSource::Traversal);
        assert_eq!(candidate.score, 3);
        assert_eq!(candidate.metadata.similar_users_count, None);
    }
}
