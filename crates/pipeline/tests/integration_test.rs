//! Integration tests for the pipeline.
//!
//! Candidates come from the real sources over a small store, then go
//! through filtering and ranking the way the service runs them.

use graph_store::{GraphStore, InMemoryStore, SimilarEdge};
use pipeline::filters::*;
use pipeline::{rank_candidates, FilterPipeline};
use sources::{user_context::build_user_context, SimilarEdgeSource, TraversalSource};
use std::sync::Arc;

fn genres(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn create_test_store() -> Arc<InMemoryStore> {
    let store = InMemoryStore::new();
    store.create_user("target", &genres(&["rock"])).unwrap();
    for (i, liked) in [
        &["rock", "jazz"][..],
        &["rock", "blues"],
        &["rock", "jazz", "soul"],
        &["rock", "funk"],
        &["rock", "disco"],
        &["rock", "metal"],
        &["rock", "jazz", "metal"],
        &["polka", "ska"],
    ]
    .iter()
    .enumerate()
    {
        store.create_user(&format!("user-{i}"), &genres(liked)).unwrap();
    }
    Arc::new(store)
}

#[test]
fn test_traversal_through_pipeline() {
    let store = create_test_store();
    let context = build_user_context(&*store, "target").unwrap();

    let candidates = TraversalSource::new(store.clone())
        .get_candidates(&context, 50)
        .unwrap();

    let pipeline = FilterPipeline::new().add_filter(AlreadyLikedFilter);
    let filtered = pipeline.apply(candidates, &context).unwrap();
    let ranked = rank_candidates(filtered, 5);

    assert_eq!(ranked.len(), 5, "Result is capped at the limit");
    assert_eq!(ranked[0].genre, "jazz");
    assert_eq!(ranked[0].score, 3);
    assert_eq!(ranked[1].genre, "metal");
    assert_eq!(ranked[1].score, 2);
    // the remaining genres all score 1 and come out alphabetically
    let tail: Vec<&str> = ranked[2..].iter().map(|g| g.genre.as_str()).collect();
    assert_eq!(tail, vec!["blues", "disco", "funk"]);
    assert!(ranked.iter().all(|g| g.genre != "rock"));
    assert!(ranked.iter().all(|g| g.genre != "polka" && g.genre != "ska"));
}

#[test]
fn test_similar_edges_through_pipeline() {
    let store = create_test_store();
    let rock = 0;
    let jazz = store
        .list_genres()
        .unwrap()
        .into_iter()
        .find(|g| g.name == "jazz")
        .unwrap()
        .id;
    store
        .replace_similar_edges(vec![SimilarEdge::new(rock, jazz, 3)])
        .unwrap();

    let context = build_user_context(&*store, "target").unwrap();
    let candidates = SimilarEdgeSource::new(store.clone())
        .get_candidates(&context, 50)
        .unwrap();

    let pipeline = FilterPipeline::new()
        .add_filter(AlreadyLikedFilter)
        .add_filter(MinimumScoreFilter::new(1));
    let ranked = rank_candidates(pipeline.apply(candidates, &context).unwrap(), 5);

    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].genre, "jazz");
    assert_eq!(ranked[0].score, 3);
}
