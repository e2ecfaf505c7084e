//! Filter implementations for the candidate pipeline.

pub mod already_liked;
pub mod minimum_score;

// Re-export for convenience
pub use already_liked::AlreadyLikedFilter;
pub use minimum_score::MinimumScoreFilter;
