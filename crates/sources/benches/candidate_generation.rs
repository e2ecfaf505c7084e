//! Benchmarks for candidate generation
//!
//! Run with: cargo bench --package sources
//!
//! Uses a synthetic graph: every user likes a sliding window of genres, so
//! neighbouring users overlap heavily.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use graph_store::{GraphStore, InMemoryStore, SimilarEdge};
use sources::{user_context::build_user_context, SimilarEdgeSource, TraversalSource};
use std::collections::HashMap;
use std::sync::Arc;

const USERS: usize = 2_000;
const GENRES: usize = 60;
const LIKES_PER_USER: usize = 6;

fn build_test_store() -> Arc<InMemoryStore> {
    let store = InMemoryStore::new();
    for user in 0..USERS {
        let genres: Vec<String> = (0..LIKES_PER_USER)
            .map(|offset| format!("genre-{}", (user * 7 + offset * 3) % GENRES))
            .collect();
        store
            .create_user(&format!("user-{user}"), &genres)
            .expect("Failed to create user");
    }

    let mut weights: HashMap<(u32, u32), u32> = HashMap::new();
    for likes in store.genre_sets().expect("Failed to read genre sets") {
        for (i, &a) in likes.iter().enumerate() {
            for &b in &likes[i + 1..] {
                let edge = SimilarEdge::new(a, b, 0);
                *weights.entry((edge.source, edge.target)).or_insert(0) += 1;
            }
        }
    }
    let edges = weights
        .into_iter()
        .map(|((a, b), weight)| SimilarEdge::new(a, b, weight))
        .collect();
    store
        .replace_similar_edges(edges)
        .expect("Failed to write similar edges");

    Arc::new(store)
}

fn bench_traversal_candidates(c: &mut Criterion) {
    let store = build_test_store();
    let traversal = TraversalSource::new(store.clone());
    let context = build_user_context(&*store, "user-1").expect("Failed to build user context");

    c.bench_function("traversal_get_candidates", |b| {
        b.iter(|| {
            let candidates = traversal.get_candidates(black_box(&context), black_box(5));
            black_box(candidates)
        })
    });
}

fn bench_similar_edge_candidates(c: &mut Criterion) {
    let store = build_test_store();
    let source = SimilarEdgeSource::new(store.clone());
    let context = build_user_context(&*store, "user-1").expect("Failed to build user context");

    c.bench_function("similar_edges_get_candidates", |b| {
        b.iter(|| {
            let candidates = source.get_candidates(black_box(&context), black_box(5));
            black_box(candidates)
        })
    });
}

fn bench_build_user_context(c: &mut Criterion) {
    let store = build_test_store();

    c.bench_function("build_user_context", |b| {
        b.iter(|| {
            let context = build_user_context(&*store, black_box("user-1")).unwrap();
            black_box(context)
        })
    });
}

criterion_group!(
    benches,
    bench_traversal_candidates,
    bench_similar_edge_candidates,
    bench_build_user_context
);
criterion_main!(benches);
