//! # Genre Recommender
//!
//! Coordinates the core operations against the connected graph store:
//! 1. Membership changes (add / remove user), each followed by a SIMILAR
//!    rebuild before the call returns
//! 2. Standalone similarity rebuilds
//! 3. Recommendations through the configured candidate source, the filter
//!    pipeline and deterministic ranking
//!
//! Mutations hold the graph lock for writing for the whole
//! mutate-then-rebuild unit, so two adds never interleave and readers never
//! see LIKES edges whose SIMILAR aggregate is mid-rebuild. Reads hold it for
//! reading. Guards are moved into the blocking task that does the store
//! work, so a call abandoned on timeout keeps the lock until its work is
//! done. Waiting for the lock is bounded by `store_timeout`.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use graph_store::{GenrePair, GraphStore, StoreError, UserRecord};
use pipeline::filters::{AlreadyLikedFilter, MinimumScoreFilter};
use pipeline::{rank_candidates, FilterPipeline, ScoredGenre};
use serde::{Deserialize, Serialize};
use sources::user_context::build_user_context;
use sources::{Candidate, SimilarEdgeSource, TraversalSource, UserContext};
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};
use tokio::time::timeout;
use tracing::{info, instrument, warn};

use crate::config::{ServiceConfig, Strategy};
use crate::error::{Result, ServiceError};
use crate::membership::MembershipEngine;
use crate::session::StoreSession;
use crate::similarity::SimilarityEngine;

/// Recommendation result returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub user: String,
    pub user_genres: Vec<String>,
    pub recommended_genres: Vec<ScoredGenre>,
    pub strategy: Strategy,
    /// Why the list is empty, when it is
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Main entry point of the recommendation core
pub struct GenreRecommender {
    session: StoreSession,
    membership: MembershipEngine,
    filter_pipeline: Arc<FilterPipeline>,
    graph_lock: Arc<RwLock<()>>,
    config: ServiceConfig,
}

impl GenreRecommender {
    /// Create a recommender with no store connected yet.
    pub fn new(config: ServiceConfig) -> Self {
        let filter_pipeline = Arc::new(
            FilterPipeline::new()
                .add_filter(AlreadyLikedFilter)
                .add_filter(MinimumScoreFilter::new(config.min_score)),
        );
        Self {
            session: StoreSession::new(config.store_timeout),
            membership: MembershipEngine::new(config.normalize_genres),
            filter_pipeline,
            graph_lock: Arc::new(RwLock::new(())),
            config,
        }
    }

    /// Create a recommender and connect it to `store`.
    pub async fn connected(config: ServiceConfig, store: Arc<dyn GraphStore>) -> Result<Self> {
        let recommender = Self::new(config);
        recommender.connect(store).await?;
        Ok(recommender)
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Connect to a store, closing any previous one.
    ///
    /// Waits for work abandoned by timed-out calls to finish first.
    pub async fn connect(&self, store: Arc<dyn GraphStore>) -> Result<()> {
        let _guard = self.graph_lock.write().await;
        self.session.connect(store).await
    }

    /// Close the active store once in-flight mutations have finished.
    pub async fn disconnect(&self) -> Result<bool> {
        let _guard = self.graph_lock.write().await;
        self.session.disconnect().await
    }

    pub async fn is_connected(&self) -> bool {
        self.session.is_connected().await
    }

    // =========================================================================
    // Graph lock
    // =========================================================================

    /// Exclusive access, waiting at most `store_timeout`.
    async fn write_guard(&self, operation: &'static str) -> Result<OwnedRwLockWriteGuard<()>> {
        let after = self.session.timeout();
        timeout(after, self.graph_lock.clone().write_owned())
            .await
            .map_err(|_| {
                warn!(operation, "Graph lock still held by earlier work");
                ServiceError::Store(StoreError::Timeout { operation, after })
            })
    }

    /// Shared access, waiting at most `store_timeout`.
    async fn read_guard(&self, operation: &'static str) -> Result<OwnedRwLockReadGuard<()>> {
        let after = self.session.timeout();
        timeout(after, self.graph_lock.clone().read_owned())
            .await
            .map_err(|_| {
                warn!(operation, "Graph lock still held by earlier work");
                ServiceError::Store(StoreError::Timeout { operation, after })
            })
    }

    // =========================================================================
    // Membership
    // =========================================================================

    /// Add a user liking `genres`, then rebuild similarity.
    #[instrument(skip(self, genres))]
    pub async fn add_user(&self, name: &str, genres: Vec<String>) -> Result<UserRecord> {
        let membership = self.membership.clone();
        self.mutate("add_user", name, move |store, user| {
            membership.add_user(store, user, &genres)
        })
        .await
    }

    /// Remove a user and its likes, then rebuild similarity.
    #[instrument(skip(self))]
    pub async fn remove_user(&self, name: &str) -> Result<UserRecord> {
        let membership = self.membership.clone();
        self.mutate("remove_user", name, move |store, user| {
            membership.remove_user(store, user)
        })
        .await
    }

    /// Run a membership change and its SIMILAR rebuild as one blocking unit.
    ///
    /// The write guard travels into the blocking task, so the unit keeps the
    /// graph locked until it has really finished, even after the caller gave
    /// up waiting on it.
    ///
    /// # Returns
    /// * `SimilarityStale` - the change committed but the rebuild failed
    /// * `Unconfirmed` - the unit timed out and may still commit, rebuild included
    async fn mutate<F>(&self, operation: &'static str, name: &str, change: F) -> Result<UserRecord>
    where
        F: FnOnce(&dyn GraphStore, &str) -> Result<UserRecord> + Send + 'static,
    {
        let guard = self.write_guard(operation).await?;
        let user = name.to_string();
        let result = self
            .session
            .run_guarded(operation, guard, move |store| {
                let record = change(store.as_ref(), &user)?;
                match SimilarityEngine::recompute(store.as_ref()) {
                    Ok(_) => Ok(record),
                    Err(source) => Err(ServiceError::SimilarityStale {
                        operation,
                        user: record.name,
                        source,
                    }),
                }
            })
            .await;

        match result {
            Err(ServiceError::Store(source @ StoreError::Timeout { .. })) => {
                Err(ServiceError::Unconfirmed {
                    operation,
                    user: name.to_string(),
                    source,
                })
            }
            other => other,
        }
    }

    /// All users ordered by name.
    pub async fn list_users(&self) -> Result<Vec<UserRecord>> {
        let guard = self.read_guard("list_users").await?;
        let membership = self.membership.clone();
        self.session
            .run_guarded("list_users", guard, move |store| {
                membership.list_users(store.as_ref())
            })
            .await
    }

    /// Every genre name, orphans included, ordered by name.
    pub async fn list_genres(&self) -> Result<Vec<String>> {
        let guard = self.read_guard("list_genres").await?;
        self.session
            .run_guarded("list_genres", guard, |store| {
                Ok(store
                    .list_genres()?
                    .into_iter()
                    .map(|genre| genre.name)
                    .collect())
            })
            .await
    }

    // =========================================================================
    // Similarity
    // =========================================================================

    /// Rebuild all SIMILAR edges. Returns the number of edges written.
    pub async fn recompute_similarity(&self) -> Result<usize> {
        let guard = self.write_guard("recompute_similarity").await?;
        self.session
            .run_guarded("recompute_similarity", guard, |store| {
                Ok(SimilarityEngine::recompute(store.as_ref())?)
            })
            .await
    }

    /// Current SIMILAR edges, heaviest first.
    pub async fn similarity_pairs(&self) -> Result<Vec<GenrePair>> {
        let guard = self.read_guard("similarity_pairs").await?;
        self.session
            .run_guarded("similarity_pairs", guard, |store| Ok(store.similar_pairs()?))
            .await
    }

    // =========================================================================
    // Recommendations
    // =========================================================================

    /// Recommend up to `recommendation_limit` genres for `name`.
    ///
    /// A user with no genres, or with no neighbours, gets an empty list and a
    /// message rather than an error. An unknown user is `NotFound`.
    #[instrument(skip(self))]
    pub async fn recommend(&self, name: &str) -> Result<Recommendation> {
        let start_time = Instant::now();
        let guard = self.read_guard("recommend").await?;

        let strategy = self.config.strategy;
        let pool = self.config.candidate_pool;
        let user = name.to_string();
        let (context, candidates) = self
            .session
            .run_guarded("recommend", guard, move |store| {
                let context = build_user_context(store.as_ref(), &user)?;
                let candidates = Self::generate_candidates(store, strategy, &context, pool)?;
                Ok((context, candidates))
            })
            .await?;

        let filtered = self
            .filter_pipeline
            .apply(candidates, &context)
            .context("Failed to apply filters")?;
        let recommended = rank_candidates(filtered, self.config.recommendation_limit);

        let message = if !context.has_genres() {
            Some(format!("User '{}' does not like any genre yet", context.user_name))
        } else if recommended.is_empty() {
            Some(match strategy {
                Strategy::Traversal => format!(
                    "No new genres found among users sharing a genre with '{}'",
                    context.user_name
                ),
                Strategy::SimilarEdges => format!(
                    "No genre is similar to the genres '{}' likes",
                    context.user_name
                ),
            })
        } else {
            None
        };

        info!(
            "Recommended {} genres for '{}' in {:.2?}",
            recommended.len(),
            context.user_name,
            start_time.elapsed()
        );

        Ok(Recommendation {
            user: context.user_name,
            user_genres: context.liked_genres,
            recommended_genres: recommended,
            strategy,
            message,
        })
    }

    fn generate_candidates(
        store: Arc<dyn GraphStore>,
        strategy: Strategy,
        context: &UserContext,
        pool: usize,
    ) -> Result<Vec<Candidate>> {
        if !context.has_genres() {
            return Ok(Vec::new());
        }
        let candidates = match strategy {
            Strategy::Traversal => TraversalSource::new(store).get_candidates(context, pool)?,
            Strategy::SimilarEdges => SimilarEdgeSource::new(store).get_candidates(context, pool)?,
        };
        Ok(candidates)
    }
}
