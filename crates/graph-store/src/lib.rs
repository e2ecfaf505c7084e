//! # Graph Store Crate
//!
//! Holds the bipartite preference graph: User and Genre nodes, LIKES edges
//! from users to genres, and derived, weighted SIMILAR edges between genres.
//!
//! ## Main Components
//!
//! - **types**: Domain types and the in-memory `PreferenceGraph`
//! - **store**: The `GraphStore` trait the core talks to, and `InMemoryStore`
//! - **parser**: Seed-file parsing
//! - **index**: Loading and integrity checks
//! - **error**: Error types for store operations
//!
//! ## Example Usage
//!
//! ```ignore
//! use graph_store::{GraphStore, InMemoryStore};
//!
//! let store = InMemoryStore::new();
//! store.create_user("ana", &["rock".into(), "pop".into()])?;
//! let users = store.list_users()?;
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;
pub mod store;

pub use error::{Result, StoreError};
pub use store::{GraphStore, InMemoryStore};
pub use types::{
    // Identifiers
    GenreId,
    // Nodes and edges
    Genre,
    GenrePair,
    PreferenceGraph,
    SimilarEdge,
    User,
    UserRecord,
};
