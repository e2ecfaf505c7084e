//! Demo harness for the genre recommender.
//!
//! Builds a small in-memory preference graph, asks both strategies for
//! recommendations and disconnects.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use graph_store::InMemoryStore;
use server::{GenreRecommender, ServiceConfig, Strategy};

const SAMPLE_USERS: &[(&str, &[&str])] = &[
    ("alice", &["rock", "jazz"]),
    ("bob", &["rock", "metal"]),
    ("carol", &["jazz", "blues"]),
    ("dave", &["rock", "jazz", "funk"]),
    ("erin", &["pop"]),
];

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,sources=debug,pipeline=debug")),
        )
        .init();

    info!("Starting genre recommender demo");

    for strategy in [Strategy::Traversal, Strategy::SimilarEdges] {
        let config = ServiceConfig::default().with_strategy(strategy);
        let recommender = GenreRecommender::connected(config, Arc::new(InMemoryStore::new())).await?;

        for (name, genres) in SAMPLE_USERS {
            let genres = genres.iter().map(|g| g.to_string()).collect();
            recommender.add_user(name, genres).await?;
        }

        for (name, _) in SAMPLE_USERS {
            let recommendation = recommender.recommend(name).await?;
            info!(
                "[{:?}] {} likes {}",
                strategy,
                recommendation.user,
                recommendation.user_genres.join(", ")
            );
            for (i, genre) in recommendation.recommended_genres.iter().enumerate() {
                info!("   {}. {} (score {})", i + 1, genre.genre, genre.score);
            }
            if let Some(message) = &recommendation.message {
                info!("   {}", message);
            }
        }

        recommender.disconnect().await?;
    }

    Ok(())
}
