//! Server crate for the genre recommendation service.
//!
//! This crate owns the store connection and coordinates membership changes,
//! similarity rebuilds and recommendation requests.

pub mod config;
pub mod error;
pub mod membership;
pub mod orchestrator;
pub mod session;
pub mod similarity;

pub use config::{ServiceConfig, Strategy, MAX_RECOMMENDATIONS};
pub use error::{ErrorKind, Result, ServiceError};
pub use membership::MembershipEngine;
pub use orchestrator::{GenreRecommender, Recommendation};
pub use session::StoreSession;
pub use similarity::SimilarityEngine;
