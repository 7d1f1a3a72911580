//! Example: Generate candidates for a user
//!
//! Run with: cargo run --package sources --example generate_candidates -- [user_id]
//!
//! Loads the demo graph, then runs each of the five candidate queries and the
//! popularity query through the GraphStore.

use social_graph::SocialGraph;
use sources::{GraphStore, SocialStore, Source};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    println!("=== Who to Follow Candidate Generation Example ===\n");

    let user_id = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<social_graph::UserId>())
        .transpose()?
        .unwrap_or(1);

    let start = Instant::now();
    let graph = Arc::new(SocialGraph::load_from_file(Path::new("data/demo-graph.json"))?);
    let (users, follows, tweets) = graph.counts();
    println!(
        "Loaded {} users, {} follows, {} tweets in {:?}\n",
        users,
        follows,
        tweets,
        start.elapsed()
    );

    let store = GraphStore::new(graph);
    let context = store.viewer_context(user_id).await?;
    println!(
        "User {} follows {} accounts, {} block relations\n",
        user_id,
        context.following.len(),
        context.blocked.len()
    );

    for source in Source::PRIORITY {
        let start = Instant::now();
        let candidates = store.fetch_candidates(source, user_id, 10).await?;
        println!("{} ({} in {:?})", source, candidates.len(), start.elapsed());
        for candidate in &candidates {
            println!("  user {:>4}  {:?}", candidate.user_id, candidate.signal);
        }
    }

    let popular = store.popular_users(5).await?;
    println!("\npopular: {:?}", popular);
    Ok(())
}
