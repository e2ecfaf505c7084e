use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use graph_store::{GenrePair, GraphStore, InMemoryStore, UserRecord};
use rand::Rng;
use serde::Serialize;
use server::{GenreRecommender, Recommendation, ServiceConfig, ServiceError, Strategy};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Semaphore;
use tracing::info;

/// genre-recs - Genre recommendations from shared user preferences
#[derive(Parser)]
#[command(name = "genre-recs")]
#[command(about = "Genre recommendations over a user/genre preference graph", long_about = None)]
struct Cli {
    /// Seed file with one `name::genre|genre` user per line
    #[arg(short, long)]
    seed: Option<std::path::PathBuf>,

    /// How recommendations are computed
    #[arg(long, value_enum, default_value = "traversal")]
    strategy: StrategyArg,

    /// Number of genres to recommend (at most 5)
    #[arg(long, default_value = "5")]
    limit: usize,

    /// Timeout for each store call, in milliseconds
    #[arg(long, default_value = "5000")]
    timeout_ms: u64,

    /// Trim and lower-case genre names before storing them
    #[arg(long)]
    normalize_genres: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    /// Live traversal through users sharing a genre
    Traversal,
    /// Precomputed SIMILAR edge weights
    SimilarEdges,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Traversal => Strategy::Traversal,
            StrategyArg::SimilarEdges => Strategy::SimilarEdges,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Add a user with the genres it likes
    AddUser {
        #[arg(long)]
        name: String,

        /// Comma-separated genre names
        #[arg(long, value_delimiter = ',', required = true)]
        genres: Vec<String>,
    },

    /// Remove a user and its likes
    RemoveUser {
        #[arg(long)]
        name: String,
    },

    /// List users with their genres
    Users,

    /// List every genre, including ones nobody likes anymore
    Genres,

    /// Show SIMILAR edges, heaviest first
    Similar,

    /// Rebuild SIMILAR edges from the current likes
    Recompute,

    /// Recommend genres for a user
    Recommend {
        #[arg(long)]
        name: String,
    },

    /// Read commands from stdin until EOF, `quit` or Ctrl-C
    Shell,

    /// Run recommendations against a random synthetic graph
    Benchmark {
        /// Number of synthetic users
        #[arg(long, default_value = "1000")]
        users: usize,

        /// Number of distinct genres
        #[arg(long, default_value = "40")]
        genres: usize,

        /// Maximum genres liked per user
        #[arg(long, default_value = "4")]
        likes: usize,

        /// Number of recommend requests to make
        #[arg(long, default_value = "200")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

/// One line typed into the shell
#[derive(Parser)]
#[command(name = "genre-recs", no_binary_name = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy)]
struct Output {
    json: bool,
}

impl Output {
    /// Print `value` as JSON, or through `human` otherwise.
    fn print<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human(value);
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Cli {
        seed,
        strategy,
        limit,
        timeout_ms,
        normalize_genres,
        json,
        command,
    } = Cli::parse();

    let config = ServiceConfig::default()
        .with_strategy(strategy.into())
        .with_recommendation_limit(limit)
        .with_store_timeout(Duration::from_millis(timeout_ms))
        .with_normalize_genres(normalize_genres);

    let store = open_store(seed.as_deref())?;
    let recommender = Arc::new(
        GenreRecommender::connected(config, store)
            .await
            .context("Failed to connect to the graph store")?,
    );
    let output = Output { json };

    let outcome = run(&recommender, seed.is_some(), command, output).await;

    // The store is closed whether or not the command succeeded
    let closed = recommender.disconnect().await;
    outcome?;
    closed.context("Failed to close the graph store")?;
    Ok(())
}

fn open_store(seed: Option<&Path>) -> Result<Arc<dyn GraphStore>> {
    let Some(path) = seed else {
        return Ok(Arc::new(InMemoryStore::new()));
    };

    info!("Loading seed file {}...", path.display());
    let start = Instant::now();
    let store = InMemoryStore::open_seeded(path)
        .with_context(|| format!("Failed to load seed file {}", path.display()))?;
    info!("Loaded seed file in {:?}", start.elapsed());
    Ok(Arc::new(store))
}

async fn run(
    recommender: &Arc<GenreRecommender>,
    seeded: bool,
    command: Commands,
    output: Output,
) -> Result<()> {
    if seeded {
        let edges = recommender.recompute_similarity().await?;
        info!("Built {} SIMILAR edges from seed", edges);
    }

    match command {
        Commands::Shell => run_shell(recommender, output).await,
        Commands::Benchmark {
            users,
            genres,
            likes,
            requests,
            concurrent,
        } => {
            let shape = BenchmarkShape {
                users,
                genres,
                likes,
                requests,
                concurrent,
            };
            run_benchmark(recommender, shape, output).await
        }
        other => execute(recommender, other, output).await,
    }
}

/// Run one data command against the recommender
async fn execute(recommender: &GenreRecommender, command: Commands, output: Output) -> Result<()> {
    match command {
        Commands::AddUser { name, genres } => {
            let record = recommender.add_user(&name, genres).await?;
            output.print(&record, |r| {
                println!("{} Added {} ({})", "✓".green(), r.name.bold(), r.genres.join(", "));
            })
        }
        Commands::RemoveUser { name } => {
            let record = recommender.remove_user(&name).await?;
            output.print(&record, |r| {
                println!(
                    "{} Removed {} (liked {})",
                    "✓".green(),
                    r.name.bold(),
                    r.genres.join(", ")
                );
            })
        }
        Commands::Users => {
            let users = recommender.list_users().await?;
            output.print(&users, |users| print_users(users))
        }
        Commands::Genres => {
            let genres = recommender.list_genres().await?;
            output.print(&genres, |genres| {
                println!("{}", "Genres:".bold().blue());
                for genre in genres {
                    println!("  • {}", genre);
                }
            })
        }
        Commands::Similar => {
            let pairs = recommender.similarity_pairs().await?;
            output.print(&pairs, |pairs| print_pairs(pairs))
        }
        Commands::Recompute => {
            let edges = recommender.recompute_similarity().await?;
            output.print(&serde_json::json!({ "similarEdges": edges }), |_| {
                println!("{} Rebuilt {} SIMILAR edges", "✓".green(), edges);
            })
        }
        Commands::Recommend { name } => {
            let recommendation = recommender.recommend(&name).await?;
            output.print(&recommendation, print_recommendation)
        }
        Commands::Shell | Commands::Benchmark { .. } => {
            bail!("this command cannot be nested inside another one")
        }
    }
}

/// Handle the 'shell' command
async fn run_shell(recommender: &GenreRecommender, output: Output) -> Result<()> {
    println!(
        "{}",
        "genre-recs shell. Type 'help' for commands, 'quit' to exit.".bold().blue()
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, closing the graph store");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if matches!(line, "quit" | "exit") {
                    break;
                }

                match ShellLine::try_parse_from(line.split_whitespace()) {
                    Ok(ShellLine { command }) => {
                        if let Err(err) = execute(recommender, command, output).await {
                            report_error(&err);
                        }
                    }
                    Err(err) => {
                        let _ = err.print();
                    }
                }
            }
        }
    }
    Ok(())
}

fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<ServiceError>() {
        Some(service) => {
            let hint = if service.is_retryable() { " (retryable)" } else { "" };
            eprintln!("{} [{:?}] {}{}", "error".red().bold(), service.kind(), service, hint);
        }
        None => eprintln!("{} {:#}", "error".red().bold(), err),
    }
}

// =============================================================================
// Benchmark
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct BenchmarkShape {
    users: usize,
    genres: usize,
    likes: usize,
    requests: usize,
    concurrent: usize,
}

impl BenchmarkShape {
    fn validate(&self) -> Result<()> {
        if self.users < 2 {
            bail!("--users must be at least 2");
        }
        if self.genres == 0 || self.likes == 0 || self.likes > self.genres {
            bail!("--likes must be between 1 and --genres");
        }
        if self.requests == 0 || self.concurrent == 0 {
            bail!("--requests and --concurrent must be positive");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BenchmarkReport {
    requests: usize,
    similar_edges: usize,
    total_ms: f64,
    average_ms: f64,
    p50_ms: f64,
    p95_ms: f64,
    p99_ms: f64,
    throughput: f64,
}

fn user_name(index: usize) -> String {
    format!("user-{:05}", index)
}

/// Random users, each liking between 1 and `likes` distinct genres
fn build_synthetic_store(shape: &BenchmarkShape) -> Result<InMemoryStore> {
    let mut rng = rand::rng();
    let genre_names: Vec<String> = (0..shape.genres).map(|i| format!("genre-{:03}", i)).collect();

    let store = InMemoryStore::new();
    for index in 0..shape.users {
        let count = rng.random_range(1..=shape.likes);
        let liked: Vec<String> = rand::seq::index::sample(&mut rng, shape.genres, count)
            .into_iter()
            .map(|i| genre_names[i].clone())
            .collect();
        store.create_user(&user_name(index), &liked)?;
    }
    Ok(store)
}

fn pick_targets(shape: &BenchmarkShape) -> Vec<String> {
    let mut rng = rand::rng();
    (0..shape.requests)
        .map(|_| user_name(rng.random_range(0..shape.users)))
        .collect()
}

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let rank = ((sorted.len() - 1) as f64 * p).round() as usize;
    sorted[rank.min(sorted.len() - 1)]
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Handle the 'benchmark' command
async fn run_benchmark(
    recommender: &Arc<GenreRecommender>,
    shape: BenchmarkShape,
    output: Output,
) -> Result<()> {
    shape.validate()?;

    info!(
        "Building synthetic graph: {} users, {} genres, up to {} likes each",
        shape.users, shape.genres, shape.likes
    );
    let store = build_synthetic_store(&shape)?;
    recommender.connect(Arc::new(store)).await?;
    let similar_edges = recommender.recompute_similarity().await?;

    let semaphore = Arc::new(Semaphore::new(shape.concurrent));
    let started = Instant::now();
    let mut handles = Vec::with_capacity(shape.requests);
    for user in pick_targets(&shape) {
        let recommender = recommender.clone();
        let semaphore = semaphore.clone();
        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let start = Instant::now();
            recommender.recommend(&user).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    let mut timings = Vec::with_capacity(handles.len());
    for handle in handles {
        timings.push(handle.await??);
    }
    let total = started.elapsed();
    timings.sort();

    let report = BenchmarkReport {
        requests: timings.len(),
        similar_edges,
        total_ms: millis(total),
        average_ms: millis(timings.iter().sum::<Duration>()) / timings.len() as f64,
        p50_ms: millis(percentile(&timings, 0.50)),
        p95_ms: millis(percentile(&timings, 0.95)),
        p99_ms: millis(percentile(&timings, 0.99)),
        throughput: timings.len() as f64 / total.as_secs_f64(),
    };

    output.print(&report, |r| {
        println!("{}", "Benchmark results:".bold().blue());
        println!("Requests: {}", r.requests);
        println!("SIMILAR edges: {}", r.similar_edges);
        println!("Total time: {:.2} ms", r.total_ms);
        println!("Average latency: {:.3} ms", r.average_ms);
        println!("P50 latency: {:.3} ms", r.p50_ms);
        println!("P95 latency: {:.3} ms", r.p95_ms);
        println!("P99 latency: {:.3} ms", r.p99_ms);
        println!("Throughput: {:.2} requests/second", r.throughput);
    })
}

// =============================================================================
// Formatting
// =============================================================================

fn print_users(users: &Vec<UserRecord>) {
    println!("{}", "Users:".bold().blue());
    if users.is_empty() {
        println!("  (none)");
    }
    for user in users {
        let genres = if user.genres.is_empty() {
            "(no genres)".dimmed().to_string()
        } else {
            user.genres.join(", ")
        };
        println!("{}{}: {}", "• ".green(), user.name, genres);
    }
}

fn print_pairs(pairs: &Vec<GenrePair>) {
    println!("{}", "Similar genres:".bold().blue());
    if pairs.is_empty() {
        println!("  (none)");
    }
    for pair in pairs {
        println!(
            "{}{} <-> {} (weight {})",
            "• ".cyan(),
            pair.first,
            pair.second,
            pair.weight
        );
    }
}

fn print_recommendation(recommendation: &Recommendation) {
    println!(
        "{}",
        format!("Recommendations for {}:", recommendation.user).bold().blue()
    );
    println!("Likes: {}", recommendation.user_genres.join(", "));
    for (i, genre) in recommendation.recommended_genres.iter().enumerate() {
        println!(
            "{}. {} - Score: {}",
            (i + 1).to_string().green(),
            genre.genre,
            genre.score
        );
    }
    if let Some(message) = &recommendation.message {
        println!("{}", message.yellow());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_line_parses_genre_list() {
        let line = ShellLine::try_parse_from("add-user --name ana --genres rock,pop".split_whitespace())
            .unwrap();
        match line.command {
            Commands::AddUser { name, genres } => {
                assert_eq!(name, "ana");
                assert_eq!(genres, vec!["rock", "pop"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_shell_line_requires_genres() {
        assert!(ShellLine::try_parse_from("add-user --name ana".split_whitespace()).is_err());
    }

    #[test]
    fn test_strategy_flag_maps_onto_service_strategy() {
        let cli = Cli::try_parse_from(["genre-recs", "--strategy", "similar-edges", "users"]).unwrap();
        assert_eq!(Strategy::from(cli.strategy), Strategy::SimilarEdges);
        assert_eq!(Strategy::from(StrategyArg::Traversal), Strategy::Traversal);
    }

    #[test]
    fn test_percentile_bounds() {
        let timings: Vec<Duration> = (1..=100).map(Duration::from_millis).collect();
        assert_eq!(percentile(&timings, 0.0), Duration::from_millis(1));
        assert_eq!(percentile(&timings, 0.5), Duration::from_millis(51));
        assert_eq!(percentile(&timings, 1.0), Duration::from_millis(100));
        assert_eq!(percentile(&[], 0.5), Duration::ZERO);
    }

    #[test]
    fn test_synthetic_store_respects_shape() {
        let shape = BenchmarkShape {
            users: 50,
            genres: 6,
            likes: 3,
            requests: 10,
            concurrent: 2,
        };
        let store = build_synthetic_store(&shape).unwrap();
        let users = store.list_users().unwrap();
        assert_eq!(users.len(), 50);
        assert!(users
            .iter()
            .all(|u| !u.genres.is_empty() && u.genres.len() <= 3));
        assert_eq!(pick_targets(&shape).len(), 10);
    }

    #[test]
    fn test_benchmark_shape_validation() {
        let shape = BenchmarkShape {
            users: 10,
            genres: 2,
            likes: 3,
            requests: 1,
            concurrent: 1,
        };
        assert!(shape.validate().is_err());
    }
}
