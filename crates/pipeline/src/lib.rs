//! Post-processing for genre candidates.
//!
//! This crate provides:
//! - Filter trait and implementations for candidate filtering
//! - FilterPipeline for composing filters
//! - Deterministic ranking and truncation
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FilterPipeline, rank_candidates};
//! use pipeline::filters::AlreadyLikedFilter;
//!
//! let pipeline = FilterPipeline::new().add_filter(AlreadyLikedFilter);
//! let filtered = pipeline.apply(candidates, &context)?;
//! let top = rank_candidates(filtered, 5);
//! ```

pub mod traits;
pub mod filters;
pub mod filter_pipeline;
pub mod ranking;

// Re-export main types
pub use traits::Filter;
pub use filter_pipeline::FilterPipeline;
pub use ranking::{rank_candidates, ScoredGenre};
