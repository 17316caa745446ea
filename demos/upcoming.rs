use std::time::Duration;

use hltv_scraper::{sort_by_schedule, HltvClient, ScraperConfig};

#[tokio::main]
async fn main() -> hltv_scraper::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("hltv_scraper=info")),
        )
        .init();

    let config = ScraperConfig::from_env()?;
    let client = HltvClient::with_config(config)?;

    let mut matches = client.get_matches(1, true).await;
    let preloaded = client.preload_datetimes(&matches, 5).await;
    println!("Resolved {preloaded} start times");

    matches = client.get_matches(1, true).await;
    sort_by_schedule(&mut matches);
    println!("{} important upcoming matches", matches.len());
    for m in &matches {
        println!("{}\n{}\n", "⭐".repeat(m.importance as usize), m);
    }

    let results = client.get_recent_results(Duration::from_secs(24 * 3600)).await;
    println!("{} recent results", results.len());
    for r in results.iter().take(5) {
        println!("{r}\n");
    }

    if let Some(team) = std::env::args().nth(1) {
        let found = client.search_team(&team).await;
        println!("{team}: {}", if found { "found" } else { "not found" });
    }

    Ok(())
}
