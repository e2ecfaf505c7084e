//! Filter stage abstraction.
//!
//! Every post-processing step between candidate generation and ranking is a
//! [`Filter`]. Stages are boxed and chained by
//! [`FilterPipeline`](crate::FilterPipeline).

use anyhow::Result;
use sources::{Candidate, UserContext};

/// One stage of candidate post-processing.
///
/// ## Contract
/// - Stages take the candidate list by value and return the survivors, so a
///   chain of stages never copies the list
/// - A stage may drop candidates and may reorder them; ranking happens
///   afterwards, so order on the way out carries no meaning
/// - `Send + Sync` lets one pipeline be shared by concurrent requests
pub trait Filter: Send + Sync {
    /// Short snake_case label used in logs and errors
    fn name(&self) -> &'static str;

    /// Keep the candidates this stage accepts for `context`.
    ///
    /// # Arguments
    /// * `candidates` - Genres proposed for the target user (ownership taken)
    /// * `context` - The target user and the genres it already likes
    ///
    /// # Returns
    /// * `Ok(Vec<Candidate>)` - The candidates that passed
    /// * `Err` - The stage could not decide; the whole request fails
    fn apply(&self, candidates: Vec<Candidate>, context: &UserContext) -> Result<Vec<Candidate>>;
}
