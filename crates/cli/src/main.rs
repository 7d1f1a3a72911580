use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use colored::Colorize;
use pipeline::RecommendationConfig;
use recommender::{Origin, RecommendationEngine, UserListItem};
use serde::Serialize;
use social_graph::{SocialGraph, UserId};
use sources::GraphStore;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Who to Follow - account recommendations over a social graph
#[derive(Parser)]
#[command(name = "who-to-follow")]
#[command(about = "Suggests accounts to follow from friends, interests and interactions", long_about = None)]
struct Cli {
    /// Path to the JSON graph snapshot
    #[arg(short, long, default_value = "data/demo-graph.json")]
    graph: PathBuf,

    /// Path to a TOML engine config (falls back to $WHO_TO_FOLLOW_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get "Who to Follow" recommendations
    Recommend {
        /// Viewer to recommend for; omit for an anonymous request
        #[arg(long)]
        user_id: Option<UserId>,

        /// Number of recommendations to return
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Print rows as JSON
        #[arg(long)]
        json: bool,

        /// Show the source and score behind each recommendation
        #[arg(long)]
        explain: bool,
    },

    /// Show a user's profile card
    Profile {
        /// User ID to display
        #[arg(long)]
        user_id: UserId,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Recommendations per request
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

/// A hydrated row plus why it was recommended
#[derive(Serialize)]
struct ExplainedItem<'a> {
    #[serde(flatten)]
    item: &'a UserListItem,
    score: Option<f32>,
    origin: Option<Origin>,
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

    let cli = Cli::parse();

    let config = RecommendationConfig::load(cli.config.as_deref())
        .context("Failed to load engine config")?;

    eprintln!("Loading social graph from {}...", cli.graph.display());
    let start = Instant::now();
    let graph = Arc::new(
        SocialGraph::load_from_file(&cli.graph).context("Failed to load social graph")?,
    );
    let (users, follows, tweets) = graph.counts();
    eprintln!(
        "{} Loaded {} users, {} follows, {} tweets in {:?}",
        "✓".green(),
        users,
        follows,
        tweets,
        start.elapsed()
    );

    let store = GraphStore::new(Arc::clone(&graph));
    let engine = RecommendationEngine::new(Arc::new(store), config);

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            user_id,
            limit,
            json,
            explain,
        } => handle_recommend(&engine, user_id, limit, json, explain).await?,
        Commands::Profile { user_id } => handle_profile(&graph, user_id)?,
        Commands::Benchmark { requests, limit } => {
            handle_benchmark(&engine, &graph, requests, limit).await?
        }
    }

    Ok(())
}

/// Handle the 'recommend' command
async fn handle_recommend(
    engine: &RecommendationEngine,
    user_id: Option<UserId>,
    limit: usize,
    json: bool,
    explain: bool,
) -> Result<()> {
    let set = engine
        .recommend(user_id, limit)
        .await
        .with_context(|| match user_id {
            Some(id) => format!("Failed to recommend for user {}", id),
            None => "Failed to recommend for anonymous viewer".to_string(),
        })?;
    let items = engine.hydrate(&set, user_id).await?;

    let reasons: HashMap<UserId, (Option<f32>, Origin)> = set
        .entries
        .iter()
        .map(|e| (e.user_id, (e.score, e.origin)))
        .collect();

    if json {
        let output = if explain {
            let explained: Vec<ExplainedItem> = items
                .iter()
                .map(|item| {
                    let reason = reasons.get(&item.id);
                    ExplainedItem {
                        item,
                        score: reason.and_then(|(score, _)| *score),
                        origin: reason.map(|(_, origin)| *origin),
                    }
                })
                .collect();
            serde_json::to_string_pretty(&explained)?
        } else {
            serde_json::to_string_pretty(&items)?
        };
        println!("{}", output);
        return Ok(());
    }

    print_recommendations(&items, explain.then_some(&reasons));

    if explain {
        if let Some(stats) = &set.stats {
            println!();
            println!("{}", "Blend:".bold());
            for source in &stats.sources {
                println!(
                    "  {:<24} quota {:>3}  available {:>3}  selected {:>3}  duplicates {:>3}",
                    source.source.to_string(),
                    source.quota,
                    source.available,
                    source.selected,
                    source.duplicates
                );
            }
            println!(
                "  backfilled {}, truncated {}, popular {}",
                stats.backfilled,
                stats.truncated,
                set.backfilled()
            );
        }
    }
    Ok(())
}

/// Handle the 'profile' command
fn handle_profile(graph: &SocialGraph, user_id: UserId) -> Result<()> {
    let profile = graph
        .profile(user_id)
        .ok_or_else(|| anyhow!("User {} not found", user_id))?;

    let badge = if profile.verified { " ✔".cyan().to_string() } else { String::new() };
    println!(
        "{}{} {}",
        profile.name.bold().blue(),
        badge,
        format!("@{}", profile.username).dimmed()
    );
    println!("{}User ID: {}", "• ".green(), profile.id);
    if let Some(avatar) = &profile.avatar_url {
        println!("{}Avatar: {}", "• ".green(), avatar);
    }
    println!("{}Followers: {}", "• ".cyan(), profile.follower_count);
    println!("{}Following: {}", "• ".cyan(), profile.following_count);

    let interests = graph.interests_of(user_id);
    if !interests.is_empty() {
        println!("Interests:");
        let mut interests = interests.to_vec();
        interests.sort_by(|a, b| b.score.total_cmp(&a.score));
        for interest in interests {
            println!("  - category {} ({:.0})", interest.category_id, interest.score);
        }
    }

    let blocked = graph.block_relations(user_id).len();
    if blocked > 0 {
        println!("{}Block relations: {}", "• ".yellow(), blocked);
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    engine: &RecommendationEngine,
    graph: &SocialGraph,
    requests: usize,
    limit: usize,
) -> Result<()> {
    let candidates: Vec<UserId> = graph
        .user_ids()
        .into_iter()
        .filter(|&id| graph.is_active(id))
        .collect();
    if candidates.is_empty() {
        return Err(anyhow!("Graph has no active users to benchmark with"));
    }
    if requests == 0 {
        return Err(anyhow!("--requests must be at least 1"));
    }

    // Sample requesters at random from the active users
    let user_ids: Vec<UserId> = (0..requests)
        .map(|_| candidates[rand::random_range(0..candidates.len())])
        .collect();

    let wall_clock = Instant::now();
    let mut handles = Vec::with_capacity(requests);
    for user in user_ids {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let start = Instant::now();
            engine.get_who_to_follow(Some(user), limit).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    let mut timings: Vec<Duration> = Vec::with_capacity(requests);
    for handle in handles {
        timings.push(handle.await??);
    }
    let total_time = wall_clock.elapsed();

    timings.sort();
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f32 / total_time.as_secs_f32();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} (limit {})", requests, limit);
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print recommendation rows
fn print_recommendations(
    items: &[UserListItem],
    reasons: Option<&HashMap<UserId, (Option<f32>, Origin)>>,
) {
    println!("{}", "Who to Follow:".bold().blue());
    if items.is_empty() {
        println!("  (no suggestions)");
        return;
    }

    for (index, item) in items.iter().enumerate() {
        let rank = index + 1;
        let verified = if item.verified { " ✔".cyan().to_string() } else { String::new() };
        let follows_you = if item.is_followed {
            " follows you".yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "{}. {}{} @{} - {} followers{}",
            rank.to_string().green(),
            item.name,
            verified,
            item.username,
            item.follower_count,
            follows_you
        );

        if let Some((score, origin)) = reasons.and_then(|r| r.get(&item.id)) {
            let explanation = match (origin, score) {
                (Origin::Personalized(source), Some(score)) => {
                    format!("{} (score {:.1})", source, score)
                }
                (Origin::Personalized(source), None) => source.to_string(),
                (Origin::Popular, _) => "popular".to_string(),
            };
            println!("   Source: {}", explanation.dimmed());
        }
    }
}
